//! Post-processing applied to fetched page assets before display

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

/// Above this many inline data-URL images, small ones are stripped from SVG pages
pub const MAX_DATA_URLS: usize = 1000;

/// Inline images at or below this many bytes of data URL are the ones stripped
pub const MAX_STRIPPED_DATA_URL_BYTES: usize = 5120;

/// Text overlays with more text boxes than this are rendered empty
pub const MAX_TEXT_BOXES: usize = 256;

const DATA_URL_MARKER: &str = "xlink:href=\"data:image";

static DATA_URL_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<image[^>]*?xlink:href="data:image/([^"]*)"[^>]*>"#)
        .expect("Failed to compile data-url image regex")
});

static RELATIVE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"href="([^"#:]+)""##).expect("Failed to compile relative href regex")
});

static SVG_OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<svg[^>]*>").expect("Failed to compile svg tag regex"));

static TEXT_BOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<span\b").expect("Failed to compile text box regex"));

static FONT_FAMILY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"font-family:[\s"']*([\w-]+)\b"#).expect("Failed to compile font-family regex")
});

/// Inputs for SVG page processing
#[derive(Debug, Clone)]
pub struct SvgContext<'a> {
    /// Base asset URL that relative references resolve against
    pub base: &'a Url,
    /// Query string (with leading `?`) appended to rewritten references
    pub query: &'a str,
    /// Namespaced stylesheet inlined into the page
    pub stylesheet: &'a str,
}

/// Prepare fetched SVG text for display.
pub fn process_svg(text: &str, cx: &SvgContext<'_>) -> String {
    let mut text = if text.matches(DATA_URL_MARKER).count() > MAX_DATA_URLS {
        strip_small_data_urls(text)
    } else {
        text.to_string()
    };

    text = absolutize_hrefs(&text, cx.base, cx.query);

    if !cx.stylesheet.is_empty() {
        text = inline_stylesheet(&text, cx.stylesheet);
    }

    text
}

fn strip_small_data_urls(text: &str) -> String {
    DATA_URL_IMAGE
        .replace_all(text, |caps: &Captures<'_>| {
            let data_len = caps.get(1).map_or(0, |m| m.len());
            if data_len <= MAX_STRIPPED_DATA_URL_BYTES {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn absolutize_hrefs(text: &str, base: &Url, query: &str) -> String {
    // query strings land inside XML attributes
    let query = query.replace('&', "&#38;");
    RELATIVE_HREF
        .replace_all(text, |caps: &Captures<'_>| match base.join(&caps[1]) {
            Ok(absolute) => format!("href=\"{absolute}{query}\""),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

fn inline_stylesheet(text: &str, stylesheet: &str) -> String {
    let Some(open_tag) = SVG_OPEN_TAG.find(text) else {
        return text.to_string();
    };
    let mut out = String::with_capacity(text.len() + stylesheet.len() + 16);
    out.push_str(&text[..open_tag.end()]);
    out.push_str("<style>");
    out.push_str(stylesheet);
    out.push_str("</style>");
    out.push_str(&text[open_tag.end()..]);
    out
}

/// Number of text-box elements in a text overlay fragment
pub fn count_text_boxes(html: &str) -> usize {
    TEXT_BOX.find_iter(html).count()
}

/// Prepare a fetched text overlay; pathological pages come back empty.
pub fn process_text_layer(html: &str) -> String {
    if count_text_boxes(html) > MAX_TEXT_BOXES {
        return String::new();
    }
    html.to_string()
}

/// Suffix every font-family name so two viewers never share a font face
pub fn namespace_stylesheet(css: &str, namespace: &str) -> String {
    FONT_FAMILY
        .replace_all(css, |caps: &Captures<'_>| format!("{}-{namespace}", &caps[0]))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://cdn.example.com/docs/abc/").unwrap()
    }

    #[test]
    fn small_data_urls_survive_below_threshold() {
        let image = r#"<image width="1" xlink:href="data:image/png;base64,AAAA"/>"#;
        let svg = format!("<svg>{}</svg>", image.repeat(10));

        let out = process_svg(
            &svg,
            &SvgContext {
                base: &base(),
                query: "",
                stylesheet: "",
            },
        );

        assert_eq!(out.matches(DATA_URL_MARKER).count(), 10);
    }

    #[test]
    fn small_data_urls_stripped_above_threshold() {
        let small = r#"<image width="1" xlink:href="data:image/png;base64,AAAA"/>"#;
        let large = format!(
            r#"<image xlink:href="data:image/png;base64,{}"/>"#,
            "B".repeat(MAX_STRIPPED_DATA_URL_BYTES + 10)
        );
        let svg = format!("<svg>{}{large}</svg>", small.repeat(MAX_DATA_URLS + 1));

        let out = strip_small_data_urls(&svg);

        assert_eq!(out.matches(DATA_URL_MARKER).count(), 1);
        assert!(out.contains(&large));
    }

    #[test]
    fn relative_hrefs_become_absolute_with_query() {
        let svg = r##"<svg><use xlink:href="#glyph"/><image href="img/1.png"/><a href="https://x.org/"/></svg>"##;

        let out = absolutize_hrefs(svg, &base(), "?a=1&b=2");

        assert!(out.contains(r#"href="https://cdn.example.com/docs/abc/img/1.png?a=1&#38;b=2""#));
        assert!(out.contains(r##"xlink:href="#glyph""##));
        assert!(out.contains(r#"href="https://x.org/""#));
    }

    #[test]
    fn empty_hrefs_are_left_alone() {
        let svg = r#"<svg><a href=""/><image href="p.png"/></svg>"#;

        let out = absolutize_hrefs(svg, &base(), "");

        assert!(out.contains(r#"<a href=""/>"#));
        assert!(out.contains(r#"href="https://cdn.example.com/docs/abc/p.png""#));
    }

    #[test]
    fn stylesheet_inlined_after_svg_tag() {
        let out = process_svg(
            r#"<svg width="10"><g/></svg>"#,
            &SvgContext {
                base: &base(),
                query: "",
                stylesheet: ".a{}",
            },
        );

        assert_eq!(out, r#"<svg width="10"><style>.a{}</style><g/></svg>"#);
    }

    #[test]
    fn text_layer_emptied_when_overloaded() {
        let ok = "<div class=\"page-text\"><span>a</span></div>";
        let overloaded = format!(
            "<div class=\"page-text\">{}</div>",
            "<span>x</span>".repeat(MAX_TEXT_BOXES + 1)
        );

        assert_eq!(process_text_layer(ok), ok);
        assert_eq!(process_text_layer(&overloaded), "");
    }

    #[test]
    fn font_families_are_namespaced() {
        let css = "@font-face{font-family: \"g_font_1\";src:url(a.woff)} .t{font-family:g_font_1}";

        let out = namespace_stylesheet(css, "viewer-7");

        assert!(out.contains("font-family: \"g_font_1-viewer-7\""));
        assert!(out.contains("font-family:g_font_1-viewer-7}"));
    }
}
