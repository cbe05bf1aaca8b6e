//! Glide configuration system
//!
//! This crate provides centralized configuration for the motion engine,
//! loading defaults from `glide.toml` and allowing environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "glide.toml";

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid TOML for [`GlideConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure for the motion engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlideConfig {
    /// Scroll animator defaults
    pub scroll: ScrollConfig,
    /// Transition manager defaults
    pub transition: TransitionConfig,
    /// Parallax driver defaults
    pub parallax: ParallaxConfig,
    /// Scroll spy defaults
    pub spy: SpyConfig,
    /// Visibility trigger defaults
    pub trigger: TriggerConfig,
    /// Frame scheduler settings
    pub frame: FrameConfig,
}

/// What a scroll animator does with a request that arrives while it is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// Resolve the new request immediately without touching the running animation.
    #[default]
    Drop,
    /// Run the new request after the current one (and any queued before it) finishes.
    Queue,
    /// Refuse the new request with an error.
    Reject,
}

impl std::str::FromStr for BusyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "queue" => Ok(Self::Queue),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown busy policy: {other}")),
        }
    }
}

/// Axis along which a parallax element moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

impl std::str::FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" | "y" => Ok(Self::Vertical),
            "horizontal" | "x" => Ok(Self::Horizontal),
            other => Err(format!("unknown axis: {other}")),
        }
    }
}

/// Scroll animator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Default animation duration in milliseconds
    pub duration_ms: f64,
    /// Default easing curve name (e.g. "ease-out-quart")
    pub easing: String,
    /// Default offset added to every scroll target, in pixels
    pub offset: f64,
    /// Policy for requests arriving while an animation is running
    pub busy_policy: BusyPolicy,
}

/// Transition manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Default transition duration in milliseconds
    pub duration_ms: f64,
    /// Default timing function token (CSS syntax)
    pub easing: String,
    /// Default delay in milliseconds
    pub delay_ms: f64,
    /// Extra time the fallback timer waits past duration + delay
    pub fallback_grace_ms: f64,
}

/// Parallax driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Fraction of the scroll offset applied as movement
    pub speed: f64,
    /// Axis of movement
    pub direction: Axis,
}

/// Scroll spy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpyConfig {
    /// Class toggled on the active navigation item
    pub active_class: String,
    /// Pixels added to the scroll position before comparing section tops
    pub offset: f64,
}

/// Visibility trigger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Margin around the root used for intersection tests
    pub root_margin: String,
    /// Intersection ratio at which a change is reported
    pub threshold: f64,
}

/// Frame scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Interval between frames in milliseconds (default: 60 Hz)
    pub interval_ms: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            duration_ms: 500.0,
            easing: "ease-out-quart".to_string(),
            offset: 0.0,
            busy_policy: BusyPolicy::Drop,
        }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 300.0,
            easing: "ease-out".to_string(),
            delay_ms: 0.0,
            fallback_grace_ms: 100.0,
        }
    }
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            speed: 0.5,
            direction: Axis::Vertical,
        }
    }
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            active_class: "active".to_string(),
            offset: 100.0,
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            root_margin: "0px".to_string(),
            threshold: 0.1,
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000.0 / 60.0,
        }
    }
}

impl GlideConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `glide.toml` in the current directory,
    /// or return the default configuration if the file is missing or invalid
    pub fn load_or_default() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_FILE).unwrap_or_default()
    }

    /// Load from the default location and apply environment overrides.
    pub fn load_with_env() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Values that fail to parse are ignored.
    pub fn merge_with_env(&mut self) {
        self.merge_with_vars(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary variable lookup.
    pub fn merge_with_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Scroll settings
        if let Some(ms) = lookup("GLIDE_SCROLL_DURATION").and_then(|v| v.parse().ok()) {
            self.scroll.duration_ms = ms;
        }
        if let Some(easing) = lookup("GLIDE_SCROLL_EASING") {
            self.scroll.easing = easing;
        }
        if let Some(policy) = lookup("GLIDE_BUSY_POLICY").and_then(|v| v.parse().ok()) {
            self.scroll.busy_policy = policy;
        }

        // Transition settings
        if let Some(ms) = lookup("GLIDE_TRANSITION_DURATION").and_then(|v| v.parse().ok()) {
            self.transition.duration_ms = ms;
        }
        if let Some(easing) = lookup("GLIDE_TRANSITION_EASING") {
            self.transition.easing = easing;
        }
        if let Some(ms) = lookup("GLIDE_FALLBACK_GRACE").and_then(|v| v.parse().ok()) {
            self.transition.fallback_grace_ms = ms;
        }

        // Parallax settings
        if let Some(speed) = lookup("GLIDE_PARALLAX_SPEED").and_then(|v| v.parse().ok()) {
            self.parallax.speed = speed;
        }
        if let Some(axis) = lookup("GLIDE_PARALLAX_DIRECTION").and_then(|v| v.parse().ok()) {
            self.parallax.direction = axis;
        }

        // Spy settings
        if let Some(offset) = lookup("GLIDE_SPY_OFFSET").and_then(|v| v.parse().ok()) {
            self.spy.offset = offset;
        }
        if let Some(class) = lookup("GLIDE_SPY_CLASS") {
            self.spy.active_class = class;
        }

        // Frame settings
        if let Some(ms) = lookup("GLIDE_FRAME_INTERVAL").and_then(|v| v.parse::<f64>().ok()) {
            if ms.is_finite() && ms > 0.0 {
                self.frame.interval_ms = ms;
            }
        }
    }
}
