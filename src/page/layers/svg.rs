use std::rc::Rc;

use url::Url;

use super::AssetFormat;
use crate::content::{SvgContext, process_svg};
use crate::fetch::AssetKind;
use crate::page::render::{Displayable, PageContent, Renderer};

/// Document-wide inputs to SVG processing, shared by every page
#[derive(Debug, Clone)]
pub struct SvgAssets {
    pub base: Url,
    pub query: String,
    /// Already namespaced for this viewer
    pub stylesheet: String,
}

#[derive(Debug, Clone)]
pub struct SvgFormat {
    assets: Rc<SvgAssets>,
}

impl SvgFormat {
    pub fn new(assets: Rc<SvgAssets>) -> Self {
        Self { assets }
    }
}

impl AssetFormat for SvgFormat {
    fn kind(&self) -> AssetKind {
        AssetKind::Svg
    }

    fn materialize(&self, page: usize, body: &[u8], renderer: &dyn Renderer) -> Displayable {
        let text = String::from_utf8_lossy(body);
        let svg = process_svg(
            &text,
            &SvgContext {
                base: &self.assets.base,
                query: &self.assets.query,
                stylesheet: &self.assets.stylesheet,
            },
        );
        renderer.render(page, PageContent::Svg(svg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::render::RetainedRenderer;

    #[test]
    fn svg_pages_get_the_stylesheet_and_absolute_hrefs() {
        let format = SvgFormat::new(Rc::new(SvgAssets {
            base: Url::parse("mem://doc/").unwrap(),
            query: String::new(),
            stylesheet: ".p{}".into(),
        }));

        let displayable = format.materialize(
            3,
            br#"<svg><image href="img/a.png"/></svg>"#,
            &RetainedRenderer,
        );

        assert_eq!(displayable.page, 3);
        let PageContent::Svg(svg) = displayable.content else {
            panic!("expected svg content");
        };
        assert!(svg.starts_with("<svg><style>.p{}</style>"));
        assert!(svg.contains(r#"href="mem://doc/img/a.png""#));
    }
}
