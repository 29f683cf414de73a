//! Normalized pointer observer.

use serde::{Deserialize, Serialize};

use crate::error::{finite, MotionError};
use crate::ids::SubscriptionId;
use crate::trackers::Observed;

/// Pointer position normalized to [0, 1] on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl Default for PointerState {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

impl PointerState {
    /// Offset in px centred on the middle of the viewport: `(p - 0.5) * range`.
    #[inline]
    pub fn centered_offset(&self, range: [f32; 2]) -> [f32; 2] {
        [(self.x - 0.5) * range[0], (self.y - 0.5) * range[1]]
    }
}

#[derive(Debug)]
pub struct PointerTracker {
    state: Observed<PointerState>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            state: Observed::new(PointerState::default()),
        }
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn snapshot(&self) -> PointerState {
        self.state.snapshot()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PointerState) + 'static,
    {
        self.state.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Pointer move in client pixels against the current viewport size.
    pub fn on_pointer_move(
        &mut self,
        client_x: f32,
        client_y: f32,
        viewport: [f32; 2],
    ) -> Result<PointerState, MotionError> {
        let cx = finite(client_x, "pointer x")?;
        let cy = finite(client_y, "pointer y")?;
        for v in viewport {
            if !(v.is_finite() && v > 0.0) {
                return Err(MotionError::InvalidViewport(v));
            }
        }
        self.set_normalized(cx / viewport[0], cy / viewport[1])
    }

    /// Already-normalized position; clamped into [0, 1].
    pub fn set_normalized(&mut self, x: f32, y: f32) -> Result<PointerState, MotionError> {
        let next = PointerState {
            x: finite(x, "pointer x")?.clamp(0.0, 1.0),
            y: finite(y, "pointer y")?.clamp(0.0, 1.0),
        };
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
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn normalizes_client_coordinates() {
        let mut t = PointerTracker::new();
        let p = t.on_pointer_move(960.0, 270.0, [1920.0, 1080.0]).unwrap();
        assert_eq!(p, PointerState { x: 0.5, y: 0.25 });
        assert_eq!(p.centered_offset([10.0, 5.0]), [0.0, -1.25]);
    }

    #[test]
    fn clamps_outside_viewport() {
        let mut t = PointerTracker::new();
        let p = t.on_pointer_move(-20.0, 5000.0, [800.0, 600.0]).unwrap();
        assert_eq!(p, PointerState { x: 0.0, y: 1.0 });
    }

    #[test]
    fn subscribers_see_every_move() {
        let count = Rc::new(Cell::new(0));
        let mut t = PointerTracker::new();
        let c = Rc::clone(&count);
        let id = t.subscribe(move |_| c.set(c.get() + 1));
        t.set_normalized(0.1, 0.1).unwrap();
        t.set_normalized(0.2, 0.2).unwrap();
        t.unsubscribe(id);
        t.set_normalized(0.3, 0.3).unwrap();
        assert_eq!(count.get(), 2);
    }
}
