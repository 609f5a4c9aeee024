//! Browser configuration

use crate::BrowserError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main browser configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub paging: PagingConfig,
    pub zoom: ZoomConfig,
    pub gesture: GestureConfig,
    pub animation: AnimationConfig,
    pub loader: LoaderConfig,
}

/// Horizontal paging and recycling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Gap added on each side of a page
    pub page_padding: f32,
    /// Rubber-band distance past the first/last page that switches groups
    pub overscroll_slack: f32,
    /// Live tile budget once the pager has settled
    pub max_live_tiles: usize,
    pub indicator_style: IndicatorStyle,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_padding: 10.0,
            overscroll_slack: 65.0,
            max_live_tiles: 3,
            indicator_style: IndicatorStyle::Dots,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub max_zoom: f32,
    /// Zoom above `1.0 + dismiss_zoom_epsilon` disables the dismiss pan
    pub dismiss_zoom_epsilon: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            max_zoom: 3.0,
            dismiss_zoom_epsilon: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Vertical travel that dismisses on release
    pub dismiss_distance: f32,
    /// Vertical release velocity that dismisses regardless of travel
    pub dismiss_velocity: f32,
    /// Smallest scale the dragged image shrinks to
    pub min_drag_scale: f32,
    pub double_tap_interval_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            dismiss_distance: 100.0,
            dismiss_velocity: 500.0,
            min_drag_scale: 0.3,
            double_tap_interval_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub spring_duration_ms: u64,
    pub fade_duration_ms: u64,
    pub caption_reveal_ms: u64,
    pub caption_fade_ms: u64,
    pub caption_hide_delay_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            spring_duration_ms: 300,
            fade_duration_ms: 300,
            caption_reveal_ms: 100,
            caption_fade_ms: 1000,
            caption_hide_delay_ms: 5000,
        }
    }
}

impl AnimationConfig {
    pub fn spring(&self) -> Duration {
        Duration::from_millis(self.spring_duration_ms)
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    pub fn caption_reveal(&self) -> Duration {
        Duration::from_millis(self.caption_reveal_ms)
    }

    pub fn caption_fade(&self) -> Duration {
        Duration::from_millis(self.caption_fade_ms)
    }

    pub fn caption_hide_delay(&self) -> Duration {
        Duration::from_millis(self.caption_hide_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub memory_cache_entries: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            memory_cache_entries: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorStyle {
    #[serde(rename = "dots")]
    Dots,
    #[serde(rename = "numbered")]
    Numbered,
}

impl GestureConfig {
    pub fn double_tap_interval(&self) -> Duration {
        Duration::from_millis(self.double_tap_interval_ms)
    }
}

impl BrowserConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self, BrowserError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, falling back to defaults when absent
    pub fn load_from(path: &std::path::Path) -> Result<Self, BrowserError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), BrowserError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), BrowserError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "PhotoBrowser", "PhotoBrowser")
            .map(|dirs| dirs.config_dir().join("browser.toml"))
            .unwrap_or_else(|| PathBuf::from("./browser.toml"))
    }
}
