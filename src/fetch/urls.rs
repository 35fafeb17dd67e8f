//! Asset URL templates

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use super::task::AssetKind;
use crate::error::ConfigError;

const PAGE_PLACEHOLDER: &str = "{{page}}";

/// File names of the per-document and per-page assets.
///
/// `{{page}}` is replaced by the 1-indexed page number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetTemplates {
    pub metadata: String,
    pub stylesheet: String,
    pub svg: String,
    pub image: String,
    pub text: String,
}

impl Default for AssetTemplates {
    fn default() -> Self {
        Self {
            metadata: "info.json".to_string(),
            stylesheet: "stylesheet.css".to_string(),
            svg: "page-{{page}}.svg".to_string(),
            image: "page-{{page}}.png".to_string(),
            text: "text-{{page}}.html".to_string(),
        }
    }
}

impl AssetTemplates {
    pub fn template(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Metadata => &self.metadata,
            AssetKind::Stylesheet => &self.stylesheet,
            AssetKind::Svg => &self.svg,
            AssetKind::Image => &self.image,
            AssetKind::Text => &self.text,
        }
    }
}

/// Resolves asset URLs against the document base
#[derive(Debug, Clone)]
pub struct AssetUrls {
    base: Url,
    query: String,
    templates: AssetTemplates,
}

impl AssetUrls {
    /// `base` may be an absolute URL or a local directory path
    pub fn new(base: &str, query: String, templates: AssetTemplates) -> Result<Self, ConfigError> {
        let mut base = parse_base(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            query,
            templates,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Query string with its leading `?`, or empty
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn resolve(&self, kind: AssetKind, page: Option<usize>) -> String {
        let template = self.templates.template(kind);
        let name = match page {
            Some(page) => template.replace(PAGE_PLACEHOLDER, &page.to_string()),
            None => template.to_string(),
        };
        match self.base.join(&name) {
            Ok(url) => format!("{url}{}", self.query),
            Err(_) => format!("{}{name}{}", self.base, self.query),
        }
    }
}

fn parse_base(base: &str) -> Result<Url, ConfigError> {
    match Url::parse(base) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let invalid = |source| ConfigError::InvalidUrl {
                url: base.to_string(),
                source,
            };
            let path = std::path::absolute(Path::new(base))
                .map_err(|_| invalid(url::ParseError::RelativeUrlWithoutBase))?;
            Url::from_directory_path(&path)
                .map_err(|()| invalid(url::ParseError::RelativeUrlWithoutBase))
        }
        Err(source) => Err(ConfigError::InvalidUrl {
            url: base.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_templates_are_one_indexed_and_carry_query() {
        let urls = AssetUrls::new(
            "https://cdn.example.com/docs/abc",
            "?token=t".to_string(),
            AssetTemplates::default(),
        )
        .unwrap();

        assert_eq!(
            urls.resolve(AssetKind::Svg, Some(1)),
            "https://cdn.example.com/docs/abc/page-1.svg?token=t"
        );
        assert_eq!(
            urls.resolve(AssetKind::Text, Some(12)),
            "https://cdn.example.com/docs/abc/text-12.html?token=t"
        );
        assert_eq!(
            urls.resolve(AssetKind::Metadata, None),
            "https://cdn.example.com/docs/abc/info.json?token=t"
        );
    }

    #[test]
    fn custom_scheme_base_resolves() {
        let urls = AssetUrls::new("mem://doc/", String::new(), AssetTemplates::default()).unwrap();
        assert_eq!(urls.resolve(AssetKind::Image, Some(3)), "mem://doc/page-3.png");
    }

    #[test]
    fn directory_paths_become_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let urls = AssetUrls::new(
            dir.path().to_str().unwrap(),
            String::new(),
            AssetTemplates::default(),
        )
        .unwrap();

        assert_eq!(urls.base().scheme(), "file");
        assert!(urls.resolve(AssetKind::Stylesheet, None).ends_with("/stylesheet.css"));
    }

    #[test]
    fn malformed_url_is_a_config_error() {
        let result = AssetUrls::new("http://[::1", String::new(), AssetTemplates::default());
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }
}
