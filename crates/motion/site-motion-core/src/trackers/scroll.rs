//! Vertical scroll observer.

use serde::{Deserialize, Serialize};

use crate::error::{finite, MotionError};
use crate::ids::SubscriptionId;
use crate::trackers::Observed;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    pub offset_y: f32,
    pub document_height: f32,
    pub viewport_height: f32,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset_y: 0.0,
            document_height: 800.0,
            viewport_height: 800.0,
        }
    }
}

impl ScrollState {
    /// Fraction of the scrollable range travelled, 0 when nothing scrolls.
    pub fn progress(&self) -> f32 {
        let range = self.document_height - self.viewport_height;
        if range > 0.0 {
            (self.offset_y / range).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Document-space band currently in view.
    #[inline]
    pub fn viewport_band(&self) -> (f32, f32) {
        (self.offset_y, self.offset_y + self.viewport_height)
    }
}

/// Owns the process-wide [`ScrollState`].
#[derive(Debug)]
pub struct ScrollTracker {
    state: Observed<ScrollState>,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new(ScrollState::default())
    }
}

impl ScrollTracker {
    pub fn new(initial: ScrollState) -> Self {
        Self {
            state: Observed::new(initial),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> ScrollState {
        self.state.snapshot()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ScrollState) + 'static,
    {
        self.state.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Scroll event. Overscroll (negative offsets) is clamped to 0.
    pub fn on_scroll(&mut self, offset_y: f32) -> Result<ScrollState, MotionError> {
        let offset_y = finite(offset_y, "scroll offset")?.max(0.0);
        let mut next = self.state.snapshot();
        next.offset_y = offset_y;
        self.state.publish(next);
        Ok(next)
    }

    /// Resize / layout change. The document is never shorter than the viewport.
    pub fn on_resize(
        &mut self,
        viewport_height: f32,
        document_height: f32,
    ) -> Result<ScrollState, MotionError> {
        let viewport_height = finite(viewport_height, "viewport height")?;
        let document_height = finite(document_height, "document height")?;
        if viewport_height <= 0.0 {
            return Err(MotionError::InvalidViewport(viewport_height));
        }
        let mut next = self.state.snapshot();
        next.viewport_height = viewport_height;
        next.document_height = document_height.max(viewport_height);
        self.state.publish(next);
        Ok(next)
    }

    pub fn dispose(&mut self) {
        self.state.clear_listeners();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn progress_over_scrollable_range() {
        let mut t = ScrollTracker::default();
        t.on_resize(1000.0, 3000.0).unwrap();
        let s = t.on_scroll(500.0).unwrap();
        assert_abs_diff_eq!(s.progress(), 0.25);
        let s = t.on_scroll(5000.0).unwrap();
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn unscrollable_document_has_zero_progress() {
        let mut t = ScrollTracker::default();
        t.on_resize(900.0, 400.0).unwrap();
        let s = t.on_scroll(100.0).unwrap();
        assert_eq!(s.document_height, 900.0);
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn rejects_non_finite_and_clamps_overscroll() {
        let mut t = ScrollTracker::default();
        assert!(t.on_scroll(f32::NAN).is_err());
        assert_eq!(t.on_scroll(-40.0).unwrap().offset_y, 0.0);
        assert!(matches!(
            t.on_resize(0.0, 100.0),
            Err(MotionError::InvalidViewport(_))
        ));
    }
}
