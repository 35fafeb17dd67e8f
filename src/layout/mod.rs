//! Layout engine: page geometry, zoom and focus
//!
//! A `LayoutEngine` owns the shared `LayoutBase` state and delegates
//! geometry-dependent decisions to a `LayoutStrategy` picked by `LayoutMode`.

mod engine;
mod geometry;
mod horizontal;
mod presentation;
mod state;
mod strategy;
mod vertical;
mod zoom;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use engine::{LayoutEngine, ScrollTarget};
pub use geometry::{SlotRange, VisibilityIndex, constrain_range};
pub use horizontal::HorizontalLayout;
pub use presentation::PresentationLayout;
pub use state::{
    LayoutSnapshot, Padding, PageRange, PageState, ScrollPosition, ViewportSize, ZoomSnapshot,
    ZoomState,
};
pub use strategy::{LayoutBase, LayoutStrategy, PAGE_PADDING};
pub use vertical::VerticalLayout;
pub use zoom::{
    PresetValues, ZoomMode, ZoomThresholds, ZoomValue, build_zoom_levels, clamp_zoom,
    next_zoom_level,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    #[default]
    Vertical,
    VerticalSingleColumn,
    Horizontal,
    Presentation,
    PresentationTwoPage,
}

impl LayoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::VerticalSingleColumn => "vertical-single-column",
            Self::Horizontal => "horizontal",
            Self::Presentation => "presentation",
            Self::PresentationTwoPage => "presentation-two-page",
        }
    }

    pub fn strategy(self) -> Box<dyn LayoutStrategy> {
        match self {
            Self::Vertical => Box::new(VerticalLayout::new()),
            Self::VerticalSingleColumn => Box::new(VerticalLayout::single_column()),
            Self::Horizontal => Box::new(HorizontalLayout),
            Self::Presentation => Box::new(PresentationLayout::new()),
            Self::PresentationTwoPage => Box::new(PresentationLayout::two_page()),
        }
    }
}

impl FromStr for LayoutMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" => Ok(Self::Vertical),
            "vertical-single-column" => Ok(Self::VerticalSingleColumn),
            "horizontal" => Ok(Self::Horizontal),
            "presentation" => Ok(Self::Presentation),
            "presentation-two-page" => Ok(Self::PresentationTwoPage),
            _ => Err(ConfigError::InvalidLayout(s.to_string())),
        }
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_modes_parse_and_print() {
        for mode in [
            LayoutMode::Vertical,
            LayoutMode::VerticalSingleColumn,
            LayoutMode::Horizontal,
            LayoutMode::Presentation,
            LayoutMode::PresentationTwoPage,
        ] {
            assert_eq!(mode.as_str().parse::<LayoutMode>().unwrap(), mode);
            assert_eq!(mode.strategy().mode(), mode);
        }
        assert!(matches!(
            "diagonal".parse::<LayoutMode>(),
            Err(ConfigError::InvalidLayout(_))
        ));
    }
}
