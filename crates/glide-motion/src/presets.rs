//! Common transition durations, declarations and presets.

use crate::timing::TimingFunction;
use crate::transition::TransitionOptions;

/// Standard transition durations in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct Duration;

impl Duration {
    pub const FAST: f64 = 150.0;
    pub const NORMAL: f64 = 300.0;
    pub const SLOW: f64 = 500.0;
}

/// Build a `transition` declaration that applies one timing to several
/// properties: `"<props> <duration>ms <easing>[ <delay>ms]"`.
///
/// Defaults are [`Duration::NORMAL`], `ease-out` and no delay.
pub fn create_transition(
    properties: &[&str],
    duration: Option<f64>,
    easing: Option<TimingFunction>,
    delay: Option<f64>,
) -> String {
    let duration = duration.unwrap_or(Duration::NORMAL);
    let easing = easing.unwrap_or(TimingFunction::EASE_OUT);
    let mut declaration = format!("{} {}ms {}", properties.join(", "), duration, easing);
    if let Some(delay) = delay.filter(|d| *d > 0.0) {
        declaration.push_str(&format!(" {}ms", delay));
    }
    declaration
}

/// A named transition: which property moves, how long and on which curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionPreset {
    pub name: &'static str,
    pub property: &'static str,
    pub duration_ms: f64,
    pub easing: TimingFunction,
}

impl TransitionPreset {
    /// Options for [`crate::TransitionManager::animate`], with an optional
    /// duration override.
    pub fn options(&self, duration: Option<f64>) -> TransitionOptions {
        TransitionOptions::new()
            .with_duration(duration.unwrap_or(self.duration_ms))
            .with_easing(self.easing)
    }
}

pub struct Presets;

impl Presets {
    pub const FADE_IN: TransitionPreset = TransitionPreset {
        name: "fade-in",
        property: "opacity",
        duration_ms: Duration::NORMAL,
        easing: TimingFunction::EASE_OUT,
    };

    pub const FADE_OUT: TransitionPreset = TransitionPreset {
        name: "fade-out",
        property: "opacity",
        duration_ms: Duration::NORMAL,
        easing: TimingFunction::EASE_IN,
    };

    pub const SLIDE_UP: TransitionPreset = TransitionPreset {
        name: "slide-up",
        property: "transform",
        duration_ms: Duration::NORMAL,
        easing: TimingFunction::EASE_OUT_QUART,
    };

    pub const SLIDE_DOWN: TransitionPreset = TransitionPreset {
        name: "slide-down",
        property: "transform",
        duration_ms: Duration::NORMAL,
        easing: TimingFunction::EASE_OUT_QUART,
    };

    pub const SCALE_IN: TransitionPreset = TransitionPreset {
        name: "scale-in",
        property: "transform",
        duration_ms: Duration::NORMAL,
        easing: TimingFunction::EASE_OUT_BACK,
    };

    pub const SCALE_OUT: TransitionPreset = TransitionPreset {
        name: "scale-out",
        property: "transform",
        duration_ms: Duration::NORMAL,
        easing: TimingFunction::EASE_IN_BACK,
    };

    pub const ALL: [TransitionPreset; 6] = [
        Self::FADE_IN,
        Self::FADE_OUT,
        Self::SLIDE_UP,
        Self::SLIDE_DOWN,
        Self::SCALE_IN,
        Self::SCALE_OUT,
    ];

    pub fn by_name(name: &str) -> Option<TransitionPreset> {
        Self::ALL.into_iter().find(|preset| preset.name == name)
    }
}
