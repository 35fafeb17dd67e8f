//! Error types shared across the viewer

/// Construction-time misconfiguration.
///
/// These are programmer errors: they are returned synchronously from
/// `Viewer::new` / `ViewerConfig::validate` and never travel over the bus.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("viewer config is missing an asset url")]
    MissingUrl,

    #[error("invalid asset url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unknown layout mode {0:?}")]
    InvalidLayout(String),

    #[error("invalid zoom value {0:?}")]
    InvalidZoom(String),

    #[error("invalid scroll target {0:?}")]
    InvalidScrollTarget(String),

    #[error("invalid page range {start}..={end}")]
    InvalidPageRange { start: usize, end: usize },

    #[error("zoom levels must be positive, finite and non-empty")]
    InvalidZoomLevels,

    #[error("min zoom {min} exceeds max zoom {max}")]
    InvalidZoomBounds { min: f64, max: f64 },

    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A resource-level failure after the fetch collaborator gave up.
///
/// Carried by `asseterror`, `pagefail` and `fail` messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{resource}: {error}")]
pub struct AssetError {
    pub error: String,
    pub status: Option<u16>,
    pub resource: String,
}

impl AssetError {
    pub fn new(resource: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            resource: resource.into(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Errors from viewer commands
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("viewer has been destroyed")]
    Destroyed,
}
