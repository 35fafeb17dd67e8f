//! Headless core of a lazy-loading document viewer.
//!
//! Documents are pre-converted into per-page vector (or raster) assets, text
//! overlays, a stylesheet and an `info.json` metadata file. A `Viewer` lays
//! the pages out, tracks zoom and focus, and loads and unloads page assets
//! around the focused page while the host scrolls.

pub mod clock;
pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod metadata;
pub mod page;
pub mod panic_handler;
pub mod scope;
pub mod sensors;
pub mod support;
pub mod timing;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::ViewerConfig;
pub use error::{AssetError, ConfigError, ViewerError};
pub use layout::{LayoutMode, ScrollPosition, ScrollTarget, ViewportSize, ZoomMode, ZoomValue};
pub use page::{PageStatus, Renderer};
pub use scope::{LinkTarget, Message, MessageKind, PageAvailability, Registry};
pub use support::Support;
pub use viewer::{ListenerId, Viewer, ViewerState};
