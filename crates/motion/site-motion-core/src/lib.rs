//! Site Motion Core (engine-agnostic)
//!
//! Decides, for a given scroll offset, pointer position or elapsed time, what
//! opacity/transform/visibility each animated element of the site shell has.
//! Hosts (the orchestrator, wasm bindings) feed input events in and apply the
//! numeric state that comes out; nothing here touches pixels.
//!
//! All time is virtual: controllers own a [`TimerQueue`] measured in integer
//! milliseconds and are advanced explicitly, which keeps every sequence
//! deterministic under test.

pub mod clock;
pub mod config;
pub mod error;
pub mod hero;
pub mod ids;
pub mod interp;
pub mod nav;
pub mod outputs;
pub mod preloader;
pub mod reveal;
pub mod trackers;
pub mod value;

// Re-exports for consumers (orchestrator, wasm)
pub use clock::{Fired, Millis, TimerQueue};
pub use config::{HeroCfg, MotionConfig, NavCfg, PreloaderCfg, RevealCfg, Stage, TimingTable};
pub use error::MotionError;
pub use hero::{HeroEntrance, HeroFrame, HeroParallax};
pub use ids::{ElementId, IdAllocator, SubscriptionId, TimerId};
pub use interp::Easing;
pub use nav::{KeyOutcome, NavController, NavKey, NavState, Overlay, ScrollLock, SectionId};
pub use outputs::{Change, ExitReason, MotionEvent, Outputs};
pub use preloader::{Phase, PreloaderSequencer, PreloaderState};
pub use reveal::{RevealOrchestrator, RevealPlan, RevealSample, RevealStyle};
pub use trackers::pointer::{PointerState, PointerTracker};
pub use trackers::scroll::{ScrollState, ScrollTracker};
pub use trackers::visibility::{Margin, RootMargin, Span, TriggerOptions, TriggerState, VisibilityTracker};
pub use trackers::Observed;
pub use value::Value;
