//! CSS timing function tokens for transition declarations.
//!
//! Unlike [`crate::easing::Easing`], these are never evaluated by the engine;
//! they are rendered into the `transition` declaration and interpreted by the
//! style surface.
//!
//! - Keywords: `linear`, `ease`, `ease-in`, `ease-out`, `ease-in-out`
//! - `cubic-bezier(x1, y1, x2, y2)`
//! - `steps(n, position)`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MotionError;

/// Where the jumps of a `steps(..)` function fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepPosition {
    JumpStart,
    #[default]
    JumpEnd,
    JumpBoth,
    JumpNone,
}

impl StepPosition {
    fn keyword(&self) -> &'static str {
        match self {
            Self::JumpStart => "jump-start",
            Self::JumpEnd => "jump-end",
            Self::JumpBoth => "jump-both",
            Self::JumpNone => "jump-none",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "jump-start" | "start" => Some(Self::JumpStart),
            "jump-end" | "end" => Some(Self::JumpEnd),
            "jump-both" => Some(Self::JumpBoth),
            "jump-none" => Some(Self::JumpNone),
            _ => None,
        }
    }
}

/// Timing function token attached to a transition descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimingFunction {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// `cubic-bezier(..)`; y may leave `[0, 1]` for overshooting curves.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// `steps(..)`; `count` is never zero.
    Steps { count: u32, position: StepPosition },
}

impl Default for TimingFunction {
    fn default() -> Self {
        Self::EaseOut
    }
}

const fn bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> TimingFunction {
    TimingFunction::CubicBezier { x1, y1, x2, y2 }
}

impl TimingFunction {
    pub const LINEAR: Self = Self::Linear;
    pub const EASE: Self = Self::Ease;
    pub const EASE_IN: Self = Self::EaseIn;
    pub const EASE_OUT: Self = Self::EaseOut;
    pub const EASE_IN_OUT: Self = Self::EaseInOut;

    pub const EASE_OUT_CUBIC: Self = bezier(0.215, 0.610, 0.355, 1.000);
    pub const EASE_IN_QUART: Self = bezier(0.895, 0.030, 0.685, 0.220);
    pub const EASE_OUT_QUART: Self = bezier(0.165, 0.840, 0.440, 1.000);
    pub const EASE_IN_OUT_QUART: Self = bezier(0.770, 0.000, 0.175, 1.000);
    pub const EASE_OUT_QUINT: Self = bezier(0.230, 1.000, 0.320, 1.000);
    pub const EASE_IN_OUT_QUINT: Self = bezier(0.860, 0.000, 0.070, 1.000);
    pub const EASE_OUT_BACK: Self = bezier(0.175, 0.885, 0.320, 1.275);
    pub const EASE_IN_BACK: Self = bezier(0.600, -0.280, 0.735, 0.045);

    /// `cubic-bezier(x1, y1, x2, y2)`, or `None` when an x coordinate leaves `[0, 1]`.
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Option<Self> {
        let x_range = 0.0..=1.0;
        (x_range.contains(&x1) && x_range.contains(&x2)).then_some(Self::CubicBezier { x1, y1, x2, y2 })
    }

    /// `steps(count, position)`, or `None` for zero steps.
    pub fn steps(count: u32, position: StepPosition) -> Option<Self> {
        (count >= 1).then_some(Self::Steps { count, position })
    }
}

impl fmt::Display for TimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Ease => f.write_str("ease"),
            Self::EaseIn => f.write_str("ease-in"),
            Self::EaseOut => f.write_str("ease-out"),
            Self::EaseInOut => f.write_str("ease-in-out"),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1:.3}, {y1:.3}, {x2:.3}, {y2:.3})")
            }
            Self::Steps { count, position } => write!(f, "steps({count}, {})", position.keyword()),
        }
    }
}

impl FromStr for TimingFunction {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MotionError::InvalidTimingFunction(s.to_string());
        let token = s.trim().to_ascii_lowercase();

        match token.as_str() {
            "linear" => return Ok(Self::Linear),
            "ease" => return Ok(Self::Ease),
            "ease-in" => return Ok(Self::EaseIn),
            "ease-out" => return Ok(Self::EaseOut),
            "ease-in-out" => return Ok(Self::EaseInOut),
            "step-start" => return Self::steps(1, StepPosition::JumpStart).ok_or_else(invalid),
            "step-end" => return Self::steps(1, StepPosition::JumpEnd).ok_or_else(invalid),
            _ => {}
        }

        let (name, args) = token
            .strip_suffix(')')
            .and_then(|t| t.split_once('('))
            .ok_or_else(invalid)?;
        let args: Vec<&str> = args.split(',').map(str::trim).collect();

        match name.trim() {
            "cubic-bezier" => {
                let values = args
                    .iter()
                    .map(|a| a.parse::<f32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| invalid())?;
                let &[x1, y1, x2, y2] = values.as_slice() else {
                    return Err(invalid());
                };
                Self::cubic_bezier(x1, y1, x2, y2).ok_or_else(invalid)
            }
            "steps" => {
                let count = args
                    .first()
                    .and_then(|c| c.parse::<u32>().ok())
                    .ok_or_else(invalid)?;
                let position = match args.get(1).copied() {
                    None => StepPosition::default(),
                    Some(keyword) => StepPosition::from_keyword(keyword).ok_or_else(invalid)?,
                };
                if args.len() > 2 {
                    return Err(invalid());
                }
                Self::steps(count, position).ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_display() {
        assert_eq!(TimingFunction::Linear.to_string(), "linear");
        assert_eq!(TimingFunction::EaseInOut.to_string(), "ease-in-out");
        assert_eq!(TimingFunction::default().to_string(), "ease-out");
    }

    #[test]
    fn test_named_curves_render_three_decimals() {
        assert_eq!(
            TimingFunction::EASE_OUT_CUBIC.to_string(),
            "cubic-bezier(0.215, 0.610, 0.355, 1.000)"
        );
        assert_eq!(
            TimingFunction::EASE_IN_BACK.to_string(),
            "cubic-bezier(0.600, -0.280, 0.735, 0.045)"
        );
    }

    #[test]
    fn test_steps_display() {
        let steps = TimingFunction::steps(4, StepPosition::JumpStart).unwrap();
        assert_eq!(steps.to_string(), "steps(4, jump-start)");
    }

    #[test]
    fn test_parse_keywords_and_functions() {
        assert_eq!("EASE-IN".parse::<TimingFunction>(), Ok(TimingFunction::EaseIn));
        assert_eq!(
            "cubic-bezier(0.165, 0.84, 0.44, 1)".parse::<TimingFunction>(),
            Ok(TimingFunction::EASE_OUT_QUART)
        );
        assert_eq!(
            "steps(3)".parse::<TimingFunction>(),
            Ok(TimingFunction::Steps {
                count: 3,
                position: StepPosition::JumpEnd
            })
        );
        assert_eq!(
            "step-start".parse::<TimingFunction>(),
            Ok(TimingFunction::Steps {
                count: 1,
                position: StepPosition::JumpStart
            })
        );
    }

    #[test]
    fn test_parse_display_is_stable() {
        let token = TimingFunction::EASE_IN_OUT_QUINT.to_string();
        let parsed: TimingFunction = token.parse().unwrap();
        assert_eq!(parsed.to_string(), token);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in [
            "bouncy",
            "cubic-bezier(1.5, 0, 0.5, 1)",
            "cubic-bezier(0.1, 0.2, 0.3)",
            "steps(0)",
            "steps(2, sideways)",
            "cubic-bezier(0.1, 0.2, 0.3, 0.4",
        ] {
            assert!(
                matches!(
                    bad.parse::<TimingFunction>(),
                    Err(MotionError::InvalidTimingFunction(_))
                ),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_constructors_reject_out_of_range() {
        assert_eq!(TimingFunction::cubic_bezier(-0.1, 0.0, 0.5, 1.0), None);
        assert_eq!(
            TimingFunction::cubic_bezier(0.175, 0.885, 0.32, 1.275),
            Some(TimingFunction::EASE_OUT_BACK)
        );
        assert_eq!(TimingFunction::steps(0, StepPosition::JumpEnd), None);
    }
}
