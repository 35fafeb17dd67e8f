//! Host capability flags
//!
//! Capability detection itself belongs to the host; the viewer only consumes
//! the answers and derives its memory/latency trade-offs from them.

use std::time::Duration;

/// What the host can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Support {
    /// Vector page content can be displayed; otherwise the raster fallback is used
    pub svg: bool,
    /// Mobile or legacy engine with tight memory budgets
    pub constrained: bool,
}

impl Default for Support {
    fn default() -> Self {
        Self {
            svg: true,
            constrained: false,
        }
    }
}

impl Support {
    pub fn constrained() -> Self {
        Self {
            svg: true,
            constrained: true,
        }
    }

    /// Time between two page-load initiations
    pub fn page_load_interval(&self) -> Duration {
        if self.constrained {
            Duration::from_millis(100)
        } else {
            Duration::from_millis(50)
        }
    }

    /// Hard cap on the speculative load range around the current page
    pub fn max_page_load_range(&self) -> usize {
        if self.constrained { 8 } else { 32 }
    }

    /// Quiet period after the last scroll event before `scrollend`
    pub fn scroll_end_timeout(&self) -> Duration {
        if self.constrained {
            Duration::from_millis(500)
        } else {
            Duration::from_millis(250)
        }
    }

    /// Remove unloaded page nodes instead of hiding them
    pub fn remove_on_unload(&self) -> bool {
        self.constrained
    }
}
