//! Error types for the motion core.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MotionError {
    /// Preloader stage table has no stages.
    #[error("preloader stage table is empty")]
    EmptyStageTable,

    /// Stage targets must strictly increase and end at 100.
    #[error("stage {index}: target {target} must be above {previous} and at most 100")]
    InvalidStageTarget {
        index: usize,
        target: u8,
        previous: u8,
    },

    #[error("last preloader stage must target 100, got {0}")]
    UnfinishedStageTable(u8),

    #[error("tick interval must be positive")]
    InvalidTickInterval,

    #[error("pause range {min}..={max}ms is empty")]
    InvalidPauseRange { min: u64, max: u64 },

    /// Timing table offsets are seconds and must be finite and non-negative.
    #[error("timing offset for '{event}' must be finite and >= 0, got {seconds}")]
    InvalidTiming { event: String, seconds: f32 },

    #[error("visibility threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f32),

    #[error("viewport dimension must be positive, got {0}")]
    InvalidViewport(f32),

    /// Host input carried NaN or infinity.
    #[error("non-finite value for {what}")]
    NonFiniteInput { what: &'static str },

    #[error("unknown section id '{0}'")]
    UnknownSection(String),

    #[error("unknown element {0}")]
    UnknownElement(u32),

    #[error("config parse error: {0}")]
    Config(String),
}

/// Guard used by trackers before accepting host input.
#[inline]
pub(crate) fn finite(value: f32, what: &'static str) -> Result<f32, MotionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MotionError::NonFiniteInput { what })
    }
}
