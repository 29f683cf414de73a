//! Output contracts from the motion controllers.
//!
//! Outputs carry the presentation values that changed this tick, keyed by a
//! stable path string, and a separate list of semantic events. Hosts apply
//! changes to the page and forward events.

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;
use crate::nav::{Overlay, SectionId};
use crate::preloader::Phase;
use crate::value::Value;

/// One changed presentation value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub path: String,
    pub value: Value,
}

/// How the preloader left the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Finished,
    Skipped,
    Watchdog,
}

/// Discrete semantic signals emitted while advancing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum MotionEvent {
    PreloaderPhase { phase: Phase, at_ms: u64 },
    SkipAvailable { at_ms: u64 },
    AssetsReady { at_ms: u64 },
    PreloaderCompleted { reason: ExitReason, at_ms: u64 },
    MegaMenu { open: bool },
    Search { open: bool },
    MobileMenu { open: bool },
    NavHidden { hidden: bool },
    ActiveSection { section: Option<SectionId> },
    ScrollLock { locked: bool, holder: Overlay },
    RevealStarted { element: ElementId, at_ms: u64 },
    RevealSettled { element: ElementId, at_ms: u64 },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<MotionEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.changes.push(Change {
            path: path.into(),
            value: value.into(),
        });
    }

    #[inline]
    pub fn push_event(&mut self, event: MotionEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }
}
