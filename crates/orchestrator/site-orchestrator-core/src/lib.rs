//! site-orchestrator
//!
//! Owns every site motion controller and drives them from one frame loop.
//! Hosts queue input (`push_event`), call `step(dt_ms)` once per animation
//! frame, and apply the returned [`SiteFrame`]: changed presentation values
//! keyed by path plus the semantic events raised while advancing.

pub mod blackboard;
pub mod diagnostics;
pub mod events;
pub mod layout;
pub mod scheduler;

use std::collections::VecDeque;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use site_motion_core::{
    Change, ExitReason, HeroEntrance, HeroParallax, KeyOutcome, Millis, MotionConfig,
    MotionEvent, NavController, NavState, Outputs, PointerState, PointerTracker,
    PreloaderSequencer, PreloaderState, RevealOrchestrator, ScrollState, ScrollTracker, Span,
};

pub use crate::blackboard::{Blackboard, BlackboardEntry};
pub use crate::diagnostics::DiagnosticsCfg;
pub use crate::events::HostEvent;
pub use crate::layout::{RevealSpec, SectionSpan, SiteLayout};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteFrame {
    pub epoch: u64,
    pub now_ms: Millis,
    pub dt_ms: Millis,
    /// Values that changed this frame, in pass order then publish order.
    pub changes: Vec<Change>,
    pub events: Vec<MotionEvent>,
    /// One entry per `Key` host event applied this frame, in arrival order.
    pub key_outcomes: Vec<KeyOutcome>,
}

/// Full presentation state, for hosts attaching late or re-rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSnapshot {
    pub epoch: u64,
    pub now_ms: Millis,
    pub values: Vec<Change>,
    pub scroll: ScrollState,
    pub pointer: PointerState,
    pub nav: NavState,
    /// `None` once the preloader has been unmounted.
    pub preloader: Option<PreloaderState>,
    pub preloader_exit: Option<ExitReason>,
}

pub struct Orchestrator {
    pub blackboard: Blackboard,
    pub epoch: u64,
    pub diagnostics: DiagnosticsCfg,
    now_ms: Millis,
    cfg: MotionConfig,
    queue: VecDeque<HostEvent>,
    scroll: ScrollTracker,
    pointer: PointerTracker,
    viewport_width: f32,
    preloader: Option<PreloaderSequencer>,
    preloader_exit: Option<ExitReason>,
    nav: NavController,
    hero: HeroParallax,
    entrance: HeroEntrance,
    reveals: RevealOrchestrator,
    /// Sub-millisecond remainder carried between `step_host` calls.
    carry_ms: f64,
    disposed: bool,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("epoch", &self.epoch)
            .field("now_ms", &self.now_ms)
            .field("queued", &self.queue.len())
            .field("preloader", &self.preloader)
            .field("preloader_exit", &self.preloader_exit)
            .field("nav", &self.nav.state())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Orchestrator {
    /// Build every controller from `cfg` and mount the preloader at t = 0.
    pub fn new(cfg: MotionConfig) -> Result<Self> {
        cfg.validate().context("invalid motion config")?;
        let mut preloader =
            PreloaderSequencer::new(cfg.preloader.clone()).context("preloader config")?;
        preloader.mount(0);
        let layout = SiteLayout::default();
        let mut scroll = ScrollTracker::default();
        scroll
            .on_resize(layout.viewport[1], layout.document_height)
            .context("default viewport")?;
        Ok(Self {
            blackboard: Blackboard::new(),
            epoch: 0,
            diagnostics: DiagnosticsCfg::default(),
            now_ms: 0,
            queue: VecDeque::new(),
            scroll,
            pointer: PointerTracker::new(),
            viewport_width: layout.viewport[0],
            preloader: Some(preloader),
            preloader_exit: None,
            nav: NavController::new(cfg.nav.clone(), 0),
            hero: HeroParallax::new(cfg.hero.clone()),
            entrance: HeroEntrance::new(&cfg.hero, &cfg.timing),
            reveals: RevealOrchestrator::new(),
            cfg,
            carry_ms: 0.0,
            disposed: false,
        })
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsCfg) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Apply page geometry: viewport, section spans and reveal registrations.
    pub fn with_layout(mut self, layout: &SiteLayout) -> Result<Self> {
        let [width, height] = layout.viewport;
        if !(width.is_finite() && width > 0.0) {
            bail!("layout viewport width must be positive, got {width}");
        }
        self.scroll
            .on_resize(height, layout.document_height)
            .context("layout viewport")?;
        self.viewport_width = width;

        for s in &layout.sections {
            self.nav.set_section_span(s.section, Span::new(s.top, s.height));
        }
        for r in &layout.reveals {
            if self.reveals.id_of(&r.name).is_some() {
                bail!("duplicate reveal '{}'", r.name);
            }
            let trigger = r.trigger.unwrap_or(self.cfg.reveal.trigger);
            let mut plan = r.plan.clone().unwrap_or_else(|| self.cfg.reveal.plan.clone());
            if let Some(children) = r.children {
                plan.children = children;
            }
            self.reveals
                .register(&r.name, r.span(), trigger, plan)
                .with_context(|| format!("register reveal '{}'", r.name))?;
        }
        Ok(self)
    }

    /// Queue a host event for the next frame. Dropped after dispose.
    pub fn push_event(&mut self, event: HostEvent) {
        if self.disposed {
            log::warn!("orchestrator disposed; dropping {} event", event.kind());
            return;
        }
        self.queue.push_back(event);
    }

    /// Register the preloader completion callback. Runs at once if the
    /// preloader has already completed; dropped uncalled after dispose.
    /// A later registration before completion replaces the earlier one.
    pub fn on_preloader_complete<F>(&mut self, f: F)
    where
        F: FnOnce(ExitReason) + 'static,
    {
        if self.disposed {
            log::warn!("orchestrator disposed; completion callback dropped");
            return;
        }
        let finished = self
            .preloader_exit
            .or_else(|| self.preloader.as_ref().and_then(|p| p.completed()));
        match (finished, self.preloader.as_mut()) {
            (Some(reason), _) => f(reason),
            (None, Some(p)) => p.on_complete(f),
            (None, None) => log::warn!("no preloader mounted; completion callback dropped"),
        }
    }

    /// Advance the clock by `dt_ms` and run one frame.
    pub fn step(&mut self, dt_ms: Millis) -> Result<SiteFrame> {
        if self.disposed {
            bail!("step after dispose");
        }
        self.epoch = self.epoch.wrapping_add(1);
        self.now_ms = self.now_ms.saturating_add(dt_ms);
        let frame = crate::scheduler::run_frame(self, dt_ms)?;
        self.diagnostics.report(&frame);
        Ok(frame)
    }

    /// Step by a host frame delta in fractional milliseconds, e.g. from
    /// `requestAnimationFrame`. Whole milliseconds advance the clock and the
    /// remainder carries into the next call, so the virtual clock never
    /// drifts from host time by a millisecond or more.
    pub fn step_host(&mut self, dt_ms: f64) -> Result<SiteFrame> {
        if !(dt_ms.is_finite() && dt_ms >= 0.0) {
            bail!("dt_ms must be a finite, non-negative number, got {dt_ms}");
        }
        let total = self.carry_ms + dt_ms;
        let whole = total.floor();
        let frame = self.step(whole as Millis)?;
        self.carry_ms = total - whole;
        Ok(frame)
    }

    /// Convenience for hosts wiring a skip button directly.
    pub fn skip(&mut self) {
        self.push_event(HostEvent::Skip);
    }

    /// Tear everything down. The returned frame carries the final changes
    /// (scroll lock released). Later calls return an empty frame.
    pub fn dispose(&mut self) -> SiteFrame {
        let mut frame = SiteFrame {
            epoch: self.epoch,
            now_ms: self.now_ms,
            ..SiteFrame::default()
        };
        if self.disposed {
            return frame;
        }
        self.disposed = true;
        self.queue.clear();
        if let Some(p) = self.preloader.as_mut() {
            p.dispose();
        }
        let mut out = Outputs::default();
        self.nav.dispose(&mut out);
        self.reveals.dispose();
        self.scroll.dispose();
        self.pointer.dispose();
        self.nav.publish(&mut out);
        frame.changes = self.blackboard.apply(out.changes, self.epoch, "nav");
        frame.events = out.events;
        log::debug!("orchestrator disposed at {}ms", self.now_ms);
        frame
    }

    pub fn snapshot(&self) -> SiteSnapshot {
        SiteSnapshot {
            epoch: self.epoch,
            now_ms: self.now_ms,
            values: self.blackboard.snapshot(),
            scroll: self.scroll.snapshot(),
            pointer: self.pointer.snapshot(),
            nav: self.nav.state().clone(),
            preloader: self.preloader.as_ref().map(|p| p.state()),
            preloader_exit: self.preloader_exit,
        }
    }

    pub fn now_ms(&self) -> Millis {
        self.now_ms
    }

    pub fn config(&self) -> &MotionConfig {
        &self.cfg
    }

    pub fn nav(&self) -> &NavController {
        &self.nav
    }

    pub fn hero(&self) -> &HeroParallax {
        &self.hero
    }

    pub fn entrance(&self) -> &HeroEntrance {
        &self.entrance
    }

    pub fn reveals(&self) -> &RevealOrchestrator {
        &self.reveals
    }

    pub fn preloader(&self) -> Option<&PreloaderSequencer> {
        self.preloader.as_ref()
    }

    pub fn preloader_exit(&self) -> Option<ExitReason> {
        self.preloader_exit
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.snapshot()
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer.snapshot()
    }

    pub fn queued_events(&self) -> usize {
        self.queue.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
