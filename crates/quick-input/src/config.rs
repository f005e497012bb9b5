//! Controller configuration loaded from `quick-input.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

pub(crate) const CONFIG_FILES: &[&str] = &["quick-input.toml", ".quick-input.toml"];

const DEFAULT_VALIDATION_DEBOUNCE_MS: u64 = 100;
const DEFAULT_PROGRESS_DELAY_MS: u64 = 800;
const DEFAULT_MAX_WIDTH: u32 = 600;
const DEFAULT_WIDTH_RATIO: f32 = 0.62;
const DEFAULT_LIST_HEIGHT_RATIO: f32 = 0.4;

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuickInputConfig {
    /// Config file path (if found).
    pub config_path: Option<PathBuf>,
    /// Debounce and busy-indicator delays.
    pub timing: TimingConfig,
    /// Widget sizing relative to the host container.
    pub layout: LayoutConfig,
    /// Session behavior toggles.
    pub behavior: BehaviorConfig,
}

impl QuickInputConfig {
    /// Load configuration from the first config file found under `root`.
    pub fn load(root: &Path) -> Self {
        let Some(path) = find_config_file(root) else {
            return QuickInputConfig::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            warn!("Failed to read quick-input config at {}", path.display());
            return QuickInputConfig {
                config_path: Some(path),
                ..QuickInputConfig::default()
            };
        };
        QuickInputConfig::from_contents(Some(path), &contents)
    }

    pub fn from_contents(config_path: Option<PathBuf>, contents: &str) -> Self {
        let parsed: ConfigFile = match toml::from_str(contents) {
            Ok(parsed) => parsed,
            Err(err) => {
                if let Some(path) = &config_path {
                    warn!(
                        "Failed to parse quick-input config at {}: {err}",
                        path.display()
                    );
                } else {
                    warn!("Failed to parse quick-input config: {err}");
                }
                return QuickInputConfig {
                    config_path,
                    ..QuickInputConfig::default()
                };
            }
        };

        QuickInputConfig {
            config_path,
            timing: parsed.timing.into(),
            layout: parsed.layout.into(),
            behavior: parsed.behavior.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Quiet interval before a typed value is validated.
    pub validation_debounce: Duration,
    /// Delay before the busy indicator appears for slow candidate loads.
    pub progress_delay: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            validation_debounce: Duration::from_millis(DEFAULT_VALIDATION_DEBOUNCE_MS),
            progress_delay: Duration::from_millis(DEFAULT_PROGRESS_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub max_width: u32,
    /// Fraction of the container width used by the widget.
    pub width_ratio: f32,
    /// Fraction of the container height available to the list.
    pub list_height_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            width_ratio: DEFAULT_WIDTH_RATIO,
            list_height_ratio: DEFAULT_LIST_HEIGHT_RATIO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorConfig {
    /// Close sessions when the widget loses focus (unless a session opts out).
    pub close_on_focus_lost: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            close_on_focus_lost: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    timing: TimingSection,
    #[serde(default)]
    layout: LayoutSection,
    #[serde(default)]
    behavior: BehaviorSection,
}

#[derive(Debug, Default, Deserialize)]
struct TimingSection {
    validation_debounce_ms: Option<u64>,
    progress_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutSection {
    max_width: Option<u32>,
    width_ratio: Option<f32>,
    list_height_ratio: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct BehaviorSection {
    close_on_focus_lost: Option<bool>,
}

impl From<TimingSection> for TimingConfig {
    fn from(section: TimingSection) -> Self {
        TimingConfig {
            validation_debounce: Duration::from_millis(
                section
                    .validation_debounce_ms
                    .unwrap_or(DEFAULT_VALIDATION_DEBOUNCE_MS),
            ),
            progress_delay: Duration::from_millis(
                section.progress_delay_ms.unwrap_or(DEFAULT_PROGRESS_DELAY_MS),
            ),
        }
    }
}

impl From<LayoutSection> for LayoutConfig {
    fn from(section: LayoutSection) -> Self {
        LayoutConfig {
            max_width: section.max_width.unwrap_or(DEFAULT_MAX_WIDTH),
            width_ratio: clamp_ratio(section.width_ratio, DEFAULT_WIDTH_RATIO),
            list_height_ratio: clamp_ratio(section.list_height_ratio, DEFAULT_LIST_HEIGHT_RATIO),
        }
    }
}

impl From<BehaviorSection> for BehaviorConfig {
    fn from(section: BehaviorSection) -> Self {
        BehaviorConfig {
            close_on_focus_lost: section.close_on_focus_lost.unwrap_or(true),
        }
    }
}

fn clamp_ratio(value: Option<f32>, default: f32) -> f32 {
    match value {
        Some(ratio) if ratio > 0.0 && ratio <= 1.0 => ratio,
        Some(ratio) => {
            warn!("ignoring out-of-range layout ratio {ratio}");
            default
        }
        None => default,
    }
}

pub(crate) fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}
