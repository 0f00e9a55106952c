use std::{f32::consts::PI, str::FromStr};

use crate::error::SceneError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EaseDirection {
    In,
    Out,
    InOut,
}

/// Maps normalised time in `[0, 1]` to interpolation progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// `power1` is quadratic, `power2` cubic and so on.
    Power(u8, EaseDirection),
    SineInOut,
}

impl Default for Ease {
    fn default() -> Self {
        // the usual tweening default
        Ease::Power(1, EaseDirection::Out)
    }
}

impl Ease {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Ease::Linear => t,
            Ease::Power(power, direction) => {
                let exp = power as i32 + 1;
                match direction {
                    EaseDirection::In => t.powi(exp),
                    EaseDirection::Out => 1.0 - (1.0 - t).powi(exp),
                    EaseDirection::InOut => {
                        if t < 0.5 {
                            (2.0 * t).powi(exp) / 2.0
                        } else {
                            1.0 - (2.0 * (1.0 - t)).powi(exp) / 2.0
                        }
                    }
                }
            }
            Ease::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Parses names such as `"none"`, `"linear"`, `"power1.inOut"` or `"sine.inOut"`.
impl FromStr for Ease {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || SceneError::UnknownEase(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        if lower == "none" || lower == "linear" {
            return Ok(Ease::Linear);
        }
        let (family, direction) = match lower.split_once('.') {
            Some((family, direction)) => (family, direction),
            None => (lower.as_str(), "out"),
        };
        let direction = match direction {
            "in" => EaseDirection::In,
            "out" => EaseDirection::Out,
            "inout" => EaseDirection::InOut,
            _ => return Err(unknown()),
        };
        match family {
            "sine" if direction == EaseDirection::InOut => Ok(Ease::SineInOut),
            "quad" => Ok(Ease::Power(1, direction)),
            "cubic" => Ok(Ease::Power(2, direction)),
            "quart" => Ok(Ease::Power(3, direction)),
            "quint" | "strong" => Ok(Ease::Power(4, direction)),
            family => match family.strip_prefix("power").map(str::parse::<u8>) {
                Some(Ok(0)) => Ok(Ease::Linear),
                Some(Ok(power)) if power <= 4 => Ok(Ease::Power(power, direction)),
                _ => Err(unknown()),
            },
        }
    }
}
