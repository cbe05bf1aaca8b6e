//! Easing curves for frame-driven animation.
//!
//! Each curve maps linear progress (normally 0.0 to 1.0) to eased progress.
//! Inputs are not clamped; callers clamp progress before evaluating.
//!
//! # Usage
//!
//! ```
//! use glide_motion::easing::Easing;
//!
//! assert_eq!(Easing::EaseOutQuart.evaluate(0.5), 0.9375);
//! let custom = Easing::Custom(|t| t.sqrt());
//! assert_eq!(custom.evaluate(0.25), 0.5);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::MotionError;

/// Easing curve used by the scroll animator.
#[derive(Clone, Copy)]
pub enum Easing {
    /// `t`
    Linear,
    /// `t²`
    EaseIn,
    /// `t·(2−t)`
    EaseOut,
    /// Quadratic in, quadratic out.
    EaseInOut,
    /// `1−(t−1)⁴`
    EaseOutQuart,
    /// `t⁴`
    EaseInQuart,
    /// Quartic in, quartic out.
    EaseInOutQuart,
    /// Caller-supplied curve.
    Custom(fn(f64) -> f64),
}

impl Default for Easing {
    fn default() -> Self {
        Self::EaseOutQuart
    }
}

impl Easing {
    /// All named curves, in declaration order.
    pub const NAMED: [Easing; 7] = [
        Self::Linear,
        Self::EaseIn,
        Self::EaseOut,
        Self::EaseInOut,
        Self::EaseOutQuart,
        Self::EaseInQuart,
        Self::EaseInOutQuart,
    ];

    /// Evaluate the curve at progress `t`.
    pub fn evaluate(&self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::EaseOutQuart => {
                let u = t - 1.0;
                1.0 - u * u * u * u
            }
            Self::EaseInQuart => t * t * t * t,
            Self::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    let u = t - 1.0;
                    1.0 - 8.0 * u * u * u * u
                }
            }
            Self::Custom(f) => f(t),
        }
    }

    /// Kebab-case name of the curve, `"custom"` for caller-supplied curves.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease-in",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
            Self::EaseOutQuart => "ease-out-quart",
            Self::EaseInQuart => "ease-in-quart",
            Self::EaseInOutQuart => "ease-in-out-quart",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::NAMED
            .into_iter()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| MotionError::UnknownEasing(s.to_string()))
    }
}
