use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fetch::AssetTemplates;
use crate::layout::{LayoutMode, ZoomThresholds, ZoomValue};

pub const DEFAULT_ZOOM_LEVELS: [f64; 8] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 3.0];
pub const DEFAULT_RETRIES: u32 = 1;
pub const DEFAULT_CACHE_SIZE: usize = 64;

/// Viewer configuration.
///
/// Immutable once a `Viewer` has been built from it. Every component reads it
/// through the scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base URL of the pre-rendered assets (directory-like; a trailing slash is added)
    pub url: String,

    pub layout: LayoutMode,

    /// Initial zoom; a named mode keeps tracking the viewport on resize
    pub zoom: ZoomValue,

    /// Initial page (1-indexed)
    pub page: usize,

    pub enable_text_selection: bool,
    pub enable_links: bool,
    pub enable_dragging: bool,

    /// Appended to every asset request
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub query_params: BTreeMap<String, String>,

    /// Plugin name -> plugin options; each is created as component `plugin-<name>`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub plugins: BTreeMap<String, serde_json::Value>,

    pub use_window_as_viewport: bool,

    /// First page to show (1-indexed, inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_start: Option<usize>,

    /// Last page to show (1-indexed, inclusive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_end: Option<usize>,

    pub autoload_first_page: bool,

    pub zoom_levels: Vec<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,

    /// When false, pages start out converting and wait for `pageavailable`
    pub conversion_is_complete: bool,

    /// Fetch retries after the first attempt
    pub retries: u32,

    pub templates: AssetTemplates,

    pub zoom_thresholds: ZoomThresholds,

    /// Overrides the capability-derived unload policy when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_on_unload: Option<bool>,

    /// Completed asset bodies kept by the fetch pool
    pub cache_size: usize,

    /// Background fetch threads; 0 fetches inline on submit
    pub fetch_workers: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            layout: LayoutMode::default(),
            zoom: ZoomValue::default(),
            page: 1,
            enable_text_selection: true,
            enable_links: true,
            enable_dragging: false,
            query_params: BTreeMap::new(),
            plugins: BTreeMap::new(),
            use_window_as_viewport: false,
            page_start: None,
            page_end: None,
            autoload_first_page: true,
            zoom_levels: DEFAULT_ZOOM_LEVELS.to_vec(),
            min_zoom: None,
            max_zoom: None,
            conversion_is_complete: true,
            retries: DEFAULT_RETRIES,
            templates: AssetTemplates::default(),
            zoom_thresholds: ZoomThresholds::default(),
            remove_on_unload: None,
            cache_size: DEFAULT_CACHE_SIZE,
            fetch_workers: 0,
        }
    }
}

impl ViewerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        debug!("Loaded viewer config from {path:?}");
        Ok(config)
    }

    /// Reject configurations that can never produce a working viewer
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }

        if self.zoom_levels.is_empty()
            || self
                .zoom_levels
                .iter()
                .any(|level| !level.is_finite() || *level <= 0.0)
        {
            return Err(ConfigError::InvalidZoomLevels);
        }

        let (min, max) = (self.min_zoom_value(), self.max_zoom_value());
        if !min.is_finite() || !max.is_finite() || min <= 0.0 {
            return Err(ConfigError::InvalidZoomLevels);
        }
        if min > max {
            return Err(ConfigError::InvalidZoomBounds { min, max });
        }

        if let ZoomValue::Level(level) = self.zoom {
            if !level.is_finite() || level <= 0.0 {
                return Err(ConfigError::InvalidZoom(level.to_string()));
            }
        }

        let start = self.page_start.unwrap_or(1);
        if start == 0 {
            return Err(ConfigError::InvalidPageRange {
                start,
                end: self.page_end.unwrap_or(0),
            });
        }
        if let Some(end) = self.page_end {
            if end < start {
                return Err(ConfigError::InvalidPageRange { start, end });
            }
        }

        Ok(())
    }

    /// Configured zoom levels, sorted ascending
    pub fn sorted_zoom_levels(&self) -> Vec<f64> {
        let mut levels = self.zoom_levels.clone();
        levels.sort_by(f64::total_cmp);
        levels
    }

    pub fn min_zoom_value(&self) -> f64 {
        self.min_zoom.unwrap_or_else(|| {
            self.sorted_zoom_levels()
                .first()
                .copied()
                .unwrap_or(DEFAULT_ZOOM_LEVELS[0])
        })
    }

    pub fn max_zoom_value(&self) -> f64 {
        self.max_zoom.unwrap_or_else(|| {
            self.sorted_zoom_levels()
                .last()
                .copied()
                .unwrap_or(DEFAULT_ZOOM_LEVELS[DEFAULT_ZOOM_LEVELS.len() - 1])
        })
    }

    /// The 0-indexed inclusive range of pages to build for a document of
    /// `num_pages` pages, or `None` if the configured range selects nothing.
    pub fn page_range(&self, num_pages: usize) -> Option<(usize, usize)> {
        let start = self.page_start.unwrap_or(1).max(1);
        let end = self.page_end.unwrap_or(num_pages).min(num_pages);
        if num_pages == 0 || start > end {
            return None;
        }
        Some((start - 1, end - 1))
    }

    /// `?a=b&c=d`, or empty when there are no query params
    pub fn query_string(&self) -> String {
        if self.query_params.is_empty() {
            return String::new();
        }
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.query_params {
            serializer.append_pair(key, value);
        }
        format!("?{}", serializer.finish())
    }
}
