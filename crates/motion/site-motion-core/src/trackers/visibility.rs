//! One-shot visibility triggers.
//!
//! Each element moves Unarmed -> Armed (observer attached) -> Fired (crossed
//! its threshold). Fired is terminal: scrolling away never re-arms it.

use serde::{Deserialize, Serialize};

use crate::error::MotionError;
use crate::ids::{ElementId, IdAllocator};
use crate::trackers::scroll::ScrollState;

/// Root margin length. Positive values grow the observed band (earlier
/// trigger), negative values shrink it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Margin {
    Px(f32),
    /// Percent of the viewport height.
    Percent(f32),
}

impl Default for Margin {
    fn default() -> Self {
        Margin::Px(0.0)
    }
}

impl Margin {
    #[inline]
    pub fn resolve(&self, viewport_height: f32) -> f32 {
        match *self {
            Margin::Px(px) => px,
            Margin::Percent(p) => viewport_height * p / 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: Margin,
    pub bottom: Margin,
}

impl RootMargin {
    /// Document-space band observed for the given scroll state.
    pub fn band(&self, scroll: &ScrollState) -> (f32, f32) {
        let (start, end) = scroll.viewport_band();
        (
            start - self.top.resolve(scroll.viewport_height),
            end + self.bottom.resolve(scroll.viewport_height),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerOptions {
    /// Fraction of the element that must be inside the band.
    pub threshold: f32,
    pub margin: RootMargin,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            margin: RootMargin::default(),
        }
    }
}

impl TriggerOptions {
    pub fn validate(&self) -> Result<(), MotionError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(MotionError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

/// Vertical extent of an element in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub top: f32,
    pub height: f32,
}

impl Span {
    pub const fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height.max(0.0)
    }

    /// Visible fraction of this span inside `band`.
    pub fn ratio_in(&self, band: (f32, f32)) -> f32 {
        if band.1 <= band.0 {
            return 0.0;
        }
        if self.height <= 0.0 {
            return if self.top >= band.0 && self.top <= band.1 {
                1.0
            } else {
                0.0
            };
        }
        let overlap = self.bottom().min(band.1) - self.top.max(band.0);
        (overlap.max(0.0) / self.height).min(1.0)
    }

    /// Intersection test with observer semantics: some part must be inside
    /// and at least `threshold` of it.
    pub fn intersects(&self, band: (f32, f32), threshold: f32) -> bool {
        let ratio = self.ratio_in(band);
        ratio > 0.0 && ratio >= threshold
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    Unarmed,
    Armed,
    Fired,
}

#[derive(Debug, Clone)]
struct Tracked {
    id: ElementId,
    span: Span,
    options: TriggerOptions,
    state: TriggerState,
}

#[derive(Debug, Default)]
pub struct VisibilityTracker {
    ids: IdAllocator,
    entries: Vec<Tracked>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element; it stays Unarmed until [`Self::arm`].
    pub fn register(&mut self, span: Span, options: TriggerOptions) -> Result<ElementId, MotionError> {
        options.validate()?;
        let id = self.ids.alloc_element();
        self.entries.push(Tracked {
            id,
            span,
            options,
            state: TriggerState::Unarmed,
        });
        Ok(id)
    }

    fn entry_mut(&mut self, id: ElementId) -> Result<&mut Tracked, MotionError> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(MotionError::UnknownElement(id.0))
    }

    /// Attach the observer. Fired elements stay fired.
    pub fn arm(&mut self, id: ElementId) -> Result<TriggerState, MotionError> {
        let e = self.entry_mut(id)?;
        if e.state == TriggerState::Unarmed {
            e.state = TriggerState::Armed;
        }
        Ok(e.state)
    }

    pub fn set_span(&mut self, id: ElementId, span: Span) -> Result<(), MotionError> {
        self.entry_mut(id)?.span = span;
        Ok(())
    }

    pub fn state(&self, id: ElementId) -> Option<TriggerState> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.state)
    }

    /// Fire every armed element now past its threshold; returns the newly
    /// fired ids in registration order.
    pub fn evaluate(&mut self, scroll: &ScrollState) -> Vec<ElementId> {
        let mut fired = Vec::new();
        for e in self.entries.iter_mut() {
            if e.state != TriggerState::Armed {
                continue;
            }
            let band = e.options.margin.band(scroll);
            if e.span.intersects(band, e.options.threshold) {
                e.state = TriggerState::Fired;
                fired.push(e.id);
            }
        }
        fired
    }

    /// Detach observers; pending (armed) triggers go back to Unarmed.
    pub fn dispose(&mut self) {
        for e in self.entries.iter_mut() {
            if e.state == TriggerState::Armed {
                e.state = TriggerState::Unarmed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset_y: f32) -> ScrollState {
        ScrollState {
            offset_y,
            document_height: 5000.0,
            viewport_height: 1000.0,
        }
    }

    #[test]
    fn percent_margins_shrink_band() {
        let m = RootMargin {
            top: Margin::Percent(-40.0),
            bottom: Margin::Percent(-55.0),
        };
        assert_eq!(m.band(&at(0.0)), (400.0, 450.0));
    }

    #[test]
    fn threshold_fraction_is_respected() {
        let span = Span::new(900.0, 400.0);
        // 100 of 400 visible
        assert!(!span.intersects((0.0, 1000.0), 0.3));
        assert!(span.intersects((0.0, 1000.0), 0.25));
        assert!(!span.intersects((0.0, 900.0), 0.0));
    }

    #[test]
    fn unarmed_elements_never_fire() {
        let mut t = VisibilityTracker::new();
        let id = t.register(Span::new(100.0, 100.0), TriggerOptions::default()).unwrap();
        assert!(t.evaluate(&at(0.0)).is_empty());
        t.arm(id).unwrap();
        assert_eq!(t.evaluate(&at(0.0)), vec![id]);
    }

    #[test]
    fn fired_is_terminal() {
        let mut t = VisibilityTracker::new();
        let id = t.register(Span::new(1500.0, 200.0), TriggerOptions::default()).unwrap();
        t.arm(id).unwrap();
        assert_eq!(t.evaluate(&at(1000.0)), vec![id]);
        assert!(t.evaluate(&at(0.0)).is_empty());
        assert!(t.evaluate(&at(1000.0)).is_empty());
        t.dispose();
        assert_eq!(t.arm(id).unwrap(), TriggerState::Fired);
    }

    #[test]
    fn rejects_bad_threshold() {
        let mut t = VisibilityTracker::new();
        let opts = TriggerOptions {
            threshold: 1.5,
            ..TriggerOptions::default()
        };
        assert_eq!(
            t.register(Span::new(0.0, 1.0), opts),
            Err(MotionError::InvalidThreshold(1.5))
        );
    }
}
