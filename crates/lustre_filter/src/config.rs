//! Filter system configuration
//!
//! Loaded from TOML (all keys optional):
//!
//! ```toml
//! padding_mode = "max"        # or "sum"
//! force_clear = false
//! default_resolution = 2.0
//! clip_to_destination = true
//! full_screen_textures = true
//! screen_rounding_epsilon = 0.001
//! ```
//!
//! Environment overrides, applied by [`FilterConfig::with_env_overrides`]:
//! - `LUSTRE_FILTER_FORCE_CLEAR=1`
//! - `LUSTRE_FILTER_PADDING_MODE=sum`
//! - `LUSTRE_FILTER_RESOLUTION=2`

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the paddings of a filter chain combine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingMode {
    /// The largest padding in the chain
    #[default]
    Max,
    /// Paddings add up, for chains whose filters each spread the image
    Sum,
}

impl PaddingMode {
    pub(crate) fn combine(self, acc: f64, padding: f64) -> f64 {
        match self {
            PaddingMode::Max => acc.max(padding),
            PaddingMode::Sum => acc + padding,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "max" => Some(PaddingMode::Max),
            "sum" => Some(PaddingMode::Sum),
            _ => None,
        }
    }
}

/// Tunables for a [`FilterSystem`](crate::FilterSystem)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub padding_mode: PaddingMode,
    /// Initial value of the system's force-clear override
    pub force_clear: bool,
    /// Resolution for filters that do not set one (renderer resolution if `None`)
    pub default_resolution: Option<f64>,
    /// Clip filter frames to the bound destination
    pub clip_to_destination: bool,
    /// Give exact screen-size requests their own pool bucket
    pub full_screen_textures: bool,
    /// Tolerance for pixel-grid rounding of filter frames
    pub screen_rounding_epsilon: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            padding_mode: PaddingMode::Max,
            force_clear: false,
            default_resolution: None,
            clip_to_destination: true,
            full_screen_textures: true,
            screen_rounding_epsilon: 0.001,
        }
    }
}

fn env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl FilterConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: FilterConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(resolution) = self.default_resolution {
            if !(resolution.is_finite() && resolution > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "default_resolution must be positive, got {}",
                    resolution
                )));
            }
        }
        if !(0.0..0.5).contains(&self.screen_rounding_epsilon) {
            return Err(ConfigError::Invalid(format!(
                "screen_rounding_epsilon must be in [0, 0.5), got {}",
                self.screen_rounding_epsilon
            )));
        }
        Ok(())
    }

    /// Apply `LUSTRE_FILTER_*` environment variables
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`; unparsable values are ignored
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("LUSTRE_FILTER_FORCE_CLEAR") {
            match env_bool(&raw) {
                Some(v) => self.force_clear = v,
                None => tracing::warn!("ignoring LUSTRE_FILTER_FORCE_CLEAR={:?}", raw),
            }
        }
        if let Some(raw) = lookup("LUSTRE_FILTER_PADDING_MODE") {
            match PaddingMode::parse(&raw) {
                Some(mode) => self.padding_mode = mode,
                None => tracing::warn!("ignoring LUSTRE_FILTER_PADDING_MODE={:?}", raw),
            }
        }
        if let Some(raw) = lookup("LUSTRE_FILTER_RESOLUTION") {
            match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => self.default_resolution = Some(v),
                _ => tracing::warn!("ignoring LUSTRE_FILTER_RESOLUTION={:?}", raw),
            }
        }
        self
    }
}
