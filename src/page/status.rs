//! Page lifecycle states

/// Where a page is in its lifecycle.
///
/// `Converting -> NotLoaded -> Loading -> Loaded | Error`, with
/// `Loaded -> NotLoaded` on unload. `Error` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    /// Assets do not exist server-side yet
    Converting,
    NotLoaded,
    Loading,
    Loaded,
    Error,
}

impl PageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Converting => "converting",
            Self::NotLoaded => "not-loaded",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for PageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a call to `PageController::load` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A load was initiated
    Started,
    AlreadyLoaded,
    /// A load is already running
    InFlight,
    /// The page cannot load (converting or failed)
    Skipped,
}

impl LoadOutcome {
    pub fn started(self) -> bool {
        self == Self::Started
    }
}
