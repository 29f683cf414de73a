//! Easing curves and interpolation helpers.
//!
//! Reveal and entrance tweens map a linear time fraction through an [`Easing`]
//! before blending styles.

pub mod functions;

use serde::{Deserialize, Serialize};

pub use functions::{bezier_ease, clamp01, lerp_f32, lerp_vec2};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// The site's signature curve, cubic-bezier(0.22, 1, 0.36, 1).
    #[default]
    EaseOut,
    EaseInOut,
    /// Control points (x1, y1, x2, y2).
    CubicBezier([f32; 4]),
}

impl Easing {
    pub fn control_points(&self) -> [f32; 4] {
        match self {
            Easing::Linear => [0.0, 0.0, 1.0, 1.0],
            Easing::EaseOut => [0.22, 1.0, 0.36, 1.0],
            Easing::EaseInOut => [0.42, 0.0, 0.58, 1.0],
            Easing::CubicBezier(c) => *c,
        }
    }

    /// Eased fraction for a linear fraction `t` (clamped to [0, 1]).
    #[inline]
    pub fn apply(&self, t: f32) -> f32 {
        let c = self.control_points();
        bezier_ease(t, c[0], c[1], c[2], c[3])
    }
}
