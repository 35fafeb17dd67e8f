//! Zoom values, presets and the zoom-level ladder

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Named, viewport-relative zoom targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoomMode {
    Auto,
    FitWidth,
    FitHeight,
}

impl ZoomMode {
    pub const ALL: [ZoomMode; 3] = [ZoomMode::FitWidth, ZoomMode::FitHeight, ZoomMode::Auto];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::FitWidth => "fit-width",
            Self::FitHeight => "fit-height",
        }
    }
}

/// A requested zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomValue {
    Level(f64),
    Mode(ZoomMode),
    /// Next level up the ladder
    In,
    /// Next level down the ladder
    Out,
    /// Re-apply the current mode (or keep the current level)
    Continue,
}

impl Default for ZoomValue {
    fn default() -> Self {
        Self::Mode(ZoomMode::Auto)
    }
}

impl FromStr for ZoomValue {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Self::Mode(ZoomMode::Auto),
            "fitwidth" | "fit-width" => Self::Mode(ZoomMode::FitWidth),
            "fitheight" | "fit-height" => Self::Mode(ZoomMode::FitHeight),
            "in" => Self::In,
            "out" => Self::Out,
            "" | "continue" => Self::Continue,
            other => match other.parse::<f64>() {
                Ok(level) if level.is_finite() => Self::Level(level),
                _ => return Err(ConfigError::InvalidZoom(s.to_string())),
            },
        };
        Ok(value)
    }
}

impl std::fmt::Display for ZoomValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Level(level) => write!(f, "{level}"),
            Self::Mode(mode) => f.write_str(mode.as_str()),
            Self::In => f.write_str("in"),
            Self::Out => f.write_str("out"),
            Self::Continue => f.write_str("continue"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ZoomRepr {
    Level(f64),
    Named(String),
}

impl Serialize for ZoomValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Level(level) => serializer.serialize_f64(*level),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ZoomValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ZoomRepr::deserialize(deserializer)? {
            ZoomRepr::Level(level) => Ok(Self::Level(level)),
            ZoomRepr::Named(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Similarity thresholds for collapsing the zoom ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomThresholds {
    /// Configured levels this close to a preset are replaced by the preset
    pub preset: f64,
    /// Levels this close to the previous kept level are dropped
    pub level: f64,
}

impl Default for ZoomThresholds {
    fn default() -> Self {
        Self {
            preset: 0.01,
            level: 0.1,
        }
    }
}

/// Computed values of the named presets for the current geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetValues {
    pub fit_width: f64,
    pub fit_height: f64,
    pub auto: f64,
}

impl PresetValues {
    pub fn value(&self, mode: ZoomMode) -> f64 {
        match mode {
            ZoomMode::Auto => self.auto,
            ZoomMode::FitWidth => self.fit_width,
            ZoomMode::FitHeight => self.fit_height,
        }
    }

    /// The preset a numeric zoom coincides with, if any
    pub fn mode_for(&self, zoom: f64, threshold: f64) -> Option<ZoomMode> {
        ZoomMode::ALL
            .into_iter()
            .find(|mode| (self.value(*mode) - zoom).abs() <= threshold)
    }
}

#[derive(Debug, Clone, Copy)]
struct Level {
    value: f64,
    preset: bool,
}

/// Build the sorted zoom ladder.
///
/// Presets replace configured levels within `thresholds.preset` of them; auto
/// is only added when distinct from both fit presets. Arbitrary levels within
/// `thresholds.level` of the previous kept level are dropped. The result is
/// restricted to `[min, max]`.
pub fn build_zoom_levels(
    configured: &[f64],
    presets: &PresetValues,
    thresholds: ZoomThresholds,
    min: f64,
    max: f64,
) -> Vec<f64> {
    let mut preset_values = vec![presets.fit_width, presets.fit_height];
    if (presets.auto - presets.fit_width).abs() > thresholds.preset
        && (presets.auto - presets.fit_height).abs() > thresholds.preset
    {
        preset_values.push(presets.auto);
    }

    let mut levels: Vec<Level> = configured
        .iter()
        .filter(|value| {
            preset_values
                .iter()
                .all(|preset| (*preset - **value).abs() > thresholds.preset)
        })
        .map(|value| Level {
            value: *value,
            preset: false,
        })
        .collect();
    levels.extend(preset_values.iter().map(|value| Level {
        value: *value,
        preset: true,
    }));
    levels.sort_by(|a, b| a.value.total_cmp(&b.value));

    let mut collapsed: Vec<Level> = Vec::with_capacity(levels.len());
    for level in levels {
        match collapsed.last_mut() {
            Some(last) if (level.value - last.value).abs() <= thresholds.level => {
                if level.preset && !last.preset {
                    *last = level;
                } else if level.preset && (level.value - last.value).abs() > thresholds.preset {
                    collapsed.push(level);
                }
            }
            _ => collapsed.push(level),
        }
    }

    collapsed
        .into_iter()
        .map(|level| level.value)
        .filter(|value| *value >= min && *value <= max)
        .collect()
}

const STEP_EPSILON: f64 = 1e-9;

/// Next level strictly above (`zoom_in`) or below the current zoom
pub fn next_zoom_level(levels: &[f64], current: f64, zoom_in: bool) -> Option<f64> {
    if zoom_in {
        levels
            .iter()
            .copied()
            .find(|level| *level > current + STEP_EPSILON)
    } else {
        levels
            .iter()
            .rev()
            .copied()
            .find(|level| *level < current - STEP_EPSILON)
    }
}

pub fn clamp_zoom(zoom: f64, min: f64, max: f64) -> f64 {
    if zoom.is_nan() {
        return min;
    }
    zoom.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESETS: PresetValues = PresetValues {
        fit_width: 1.52,
        fit_height: 0.61,
        auto: 1.0,
    };

    #[test]
    fn parses_named_and_numeric_values() {
        assert_eq!("fitwidth".parse::<ZoomValue>().unwrap(), ZoomValue::Mode(ZoomMode::FitWidth));
        assert_eq!("fit-height".parse::<ZoomValue>().unwrap(), ZoomValue::Mode(ZoomMode::FitHeight));
        assert_eq!("IN".parse::<ZoomValue>().unwrap(), ZoomValue::In);
        assert_eq!("1.5".parse::<ZoomValue>().unwrap(), ZoomValue::Level(1.5));
        assert!(matches!(
            "huge".parse::<ZoomValue>(),
            Err(ConfigError::InvalidZoom(_))
        ));
    }

    #[test]
    fn deserializes_from_number_or_name() {
        let level: ZoomValue = serde_yaml::from_str("0.75").unwrap();
        let named: ZoomValue = serde_yaml::from_str("fit-width").unwrap();

        assert_eq!(level, ZoomValue::Level(0.75));
        assert_eq!(named, ZoomValue::Mode(ZoomMode::FitWidth));
    }

    #[test]
    fn presets_replace_near_levels() {
        let levels = build_zoom_levels(
            &[0.25, 0.5, 0.6, 1.0, 1.5, 2.0],
            &PRESETS,
            ZoomThresholds::default(),
            0.25,
            2.0,
        );

        // 1.0 equals auto, 0.6 collapses into fit-height, 1.5 into fit-width
        assert_eq!(levels, vec![0.25, 0.5, 0.61, 1.0, 1.52, 2.0]);
    }

    #[test]
    fn auto_is_omitted_when_it_matches_a_fit_preset() {
        let presets = PresetValues {
            fit_width: 0.8,
            fit_height: 0.4,
            auto: 0.8,
        };

        let levels = build_zoom_levels(&[1.0], &presets, ZoomThresholds::default(), 0.1, 3.0);

        assert_eq!(levels, vec![0.4, 0.8, 1.0]);
    }

    #[test]
    fn ladder_respects_bounds() {
        let levels = build_zoom_levels(
            &[0.25, 0.5, 3.0],
            &PRESETS,
            ZoomThresholds::default(),
            0.5,
            1.2,
        );

        assert_eq!(levels, vec![0.5, 0.61, 1.0]);
    }

    #[test]
    fn stepping_never_sticks() {
        let levels = [0.5, 1.0, 2.0];

        assert_eq!(next_zoom_level(&levels, 1.0, true), Some(2.0));
        assert_eq!(next_zoom_level(&levels, 1.0, false), Some(0.5));
        assert_eq!(next_zoom_level(&levels, 0.7, true), Some(1.0));
        assert_eq!(next_zoom_level(&levels, 2.0, true), None);
        assert_eq!(next_zoom_level(&levels, 0.5, false), None);
    }

    #[test]
    fn clamp_handles_extremes() {
        for z in [-10.0, 0.0, 1e9, f64::NAN, f64::INFINITY] {
            let clamped = clamp_zoom(z, 0.25, 3.0);
            assert!((0.25..=3.0).contains(&clamped), "{z} -> {clamped}");
        }
    }

    #[test]
    fn numeric_zoom_maps_back_to_preset() {
        assert_eq!(PRESETS.mode_for(1.52, 0.01), Some(ZoomMode::FitWidth));
        assert_eq!(PRESETS.mode_for(1.3, 0.01), None);
    }
}
