//! Preloader sequencer.
//!
//! Drives a 0..=100 progress value through a fixed stage table on the virtual
//! clock, then walks Loading -> Complete -> Exit and reports completion. Two
//! always-armed escape hatches race the stage driver: a skip control that
//! becomes available after `skip_available_ms`, and a watchdog that forces an
//! exit after `watchdog_ms`. Whatever path wins, completion is reported
//! exactly once; after [`PreloaderSequencer::dispose`] nothing fires.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::clock::{Fired, Millis, TimerQueue};
use crate::config::PreloaderCfg;
use crate::error::MotionError;
use crate::ids::TimerId;
use crate::outputs::{ExitReason, MotionEvent, Outputs};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Complete,
    Exit,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Complete => "complete",
            Phase::Exit => "exit",
        }
    }
}

/// Read-only snapshot for presentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreloaderState {
    pub staged_progress: u8,
    pub phase: Phase,
    pub assets_ready: bool,
    pub skip_available: bool,
    pub completed: Option<ExitReason>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Tick {
    StageTick,
    StageStart(usize),
    AssetsReady,
    Exit,
    SkipAvailable,
    Watchdog,
    Complete(ExitReason),
}

type CompleteFn = Box<dyn FnOnce(ExitReason)>;

pub struct PreloaderSequencer {
    cfg: PreloaderCfg,
    timers: TimerQueue<Tick>,
    rng: StdRng,

    progress: f32,
    stage: usize,
    increment: f32,
    tick_timer: Option<TimerId>,

    phase: Phase,
    assets_ready: bool,
    skip_available: bool,
    mounted: bool,
    disposed: bool,
    completed: Option<ExitReason>,
    on_complete: Option<CompleteFn>,
}

impl std::fmt::Debug for PreloaderSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloaderSequencer")
            .field("now", &self.timers.now())
            .field("progress", &self.progress)
            .field("stage", &self.stage)
            .field("phase", &self.phase)
            .field("assets_ready", &self.assets_ready)
            .field("skip_available", &self.skip_available)
            .field("completed", &self.completed)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl PreloaderSequencer {
    pub fn new(cfg: PreloaderCfg) -> Result<Self, MotionError> {
        cfg.validate()?;
        Ok(Self {
            rng: StdRng::seed_from_u64(cfg.seed),
            cfg,
            timers: TimerQueue::new(0),
            progress: 0.0,
            stage: 0,
            increment: 0.0,
            tick_timer: None,
            phase: Phase::Loading,
            assets_ready: false,
            skip_available: false,
            mounted: false,
            disposed: false,
            completed: None,
            on_complete: None,
        })
    }

    /// Register the completion callback. It runs at most once and is dropped
    /// uncalled on dispose. Only the last registration is kept.
    pub fn on_complete<F>(&mut self, f: F)
    where
        F: FnOnce(ExitReason) + 'static,
    {
        if self.on_complete.replace(Box::new(f)).is_some() {
            log::warn!("preloader completion callback replaced");
        }
    }

    /// Start the stage driver, the skip-availability timer and the watchdog.
    /// Mounting twice (or after dispose) is a no-op.
    pub fn mount(&mut self, now: Millis) {
        if self.mounted || self.disposed {
            return;
        }
        self.mounted = true;
        self.timers = TimerQueue::new(now);
        self.timers
            .schedule(self.cfg.skip_available_ms, Tick::SkipAvailable);
        self.timers.schedule(self.cfg.watchdog_ms, Tick::Watchdog);
        self.start_stage(0);
        log::debug!("preloader mounted at {now}ms");
    }

    fn start_stage(&mut self, index: usize) {
        let stage = self.cfg.stages[index];
        self.stage = index;
        let ticks = (stage.duration_ms as f32 / self.cfg.tick_ms as f32).max(1.0);
        self.increment = (stage.target as f32 - self.progress) / ticks;
        self.tick_timer = Some(self.timers.schedule_every(self.cfg.tick_ms, Tick::StageTick));
    }

    /// Advance the virtual clock to `now`, handling every timer due on the way.
    pub fn advance_to(&mut self, now: Millis, out: &mut Outputs) {
        if !self.mounted || self.disposed {
            return;
        }
        while let Some(fired) = self.timers.pop_due(now) {
            self.handle(fired, out);
        }
        self.timers.settle(now);
    }

    fn handle(&mut self, fired: Fired<Tick>, out: &mut Outputs) {
        let at = fired.at;
        match fired.event {
            Tick::StageTick => self.on_stage_tick(at, out),
            Tick::StageStart(index) => self.start_stage(index),
            Tick::AssetsReady => {
                self.assets_ready = true;
                out.push_event(MotionEvent::AssetsReady { at_ms: at });
                self.timers.schedule(self.cfg.exit_delay_ms, Tick::Exit);
            }
            Tick::Exit => {
                self.set_phase(Phase::Exit, at, out);
                self.timers
                    .schedule(self.cfg.complete_delay_ms, Tick::Complete(ExitReason::Finished));
            }
            Tick::SkipAvailable => {
                if self.phase != Phase::Exit {
                    self.skip_available = true;
                    out.push_event(MotionEvent::SkipAvailable { at_ms: at });
                }
            }
            Tick::Watchdog => {
                if self.phase != Phase::Exit {
                    log::warn!(
                        "preloader watchdog fired at {at}ms (progress {:.0}, phase {:?})",
                        self.progress,
                        self.phase
                    );
                    self.force_exit(
                        ExitReason::Watchdog,
                        self.cfg.watchdog_complete_delay_ms,
                        out,
                    );
                }
            }
            Tick::Complete(reason) => self.fire_completion(reason, at, out),
        }
    }

    fn on_stage_tick(&mut self, at: Millis, out: &mut Outputs) {
        let target = self.cfg.stages[self.stage].target as f32;
        self.progress += self.increment;
        if self.progress < target {
            return;
        }
        self.progress = target;
        if let Some(id) = self.tick_timer.take() {
            self.timers.cancel(id);
        }
        let next = self.stage + 1;
        if next < self.cfg.stages.len() {
            let pause = self
                .rng
                .random_range(self.cfg.pause_min_ms..=self.cfg.pause_max_ms);
            self.timers.schedule(pause, Tick::StageStart(next));
        } else {
            self.set_phase(Phase::Complete, at, out);
            self.timers
                .schedule(self.cfg.ready_delay_ms, Tick::AssetsReady);
        }
    }

    fn set_phase(&mut self, phase: Phase, at: Millis, out: &mut Outputs) {
        if self.phase == phase {
            return;
        }
        log::debug!("preloader phase {:?} -> {:?} at {at}ms", self.phase, phase);
        self.phase = phase;
        out.push_event(MotionEvent::PreloaderPhase { phase, at_ms: at });
    }

    /// Drop every pending timer, jump to Exit and schedule completion.
    fn force_exit(&mut self, reason: ExitReason, delay: Millis, out: &mut Outputs) {
        let at = self.timers.now();
        self.timers.cancel_all();
        self.tick_timer = None;
        self.skip_available = false;
        self.set_phase(Phase::Exit, at, out);
        if delay == 0 {
            self.fire_completion(reason, at, out);
        } else {
            self.timers.schedule(delay, Tick::Complete(reason));
        }
    }

    fn fire_completion(&mut self, reason: ExitReason, at: Millis, out: &mut Outputs) {
        if self.completed.is_some() {
            return;
        }
        self.completed = Some(reason);
        self.timers.cancel_all();
        self.skip_available = false;
        if let Some(f) = self.on_complete.take() {
            f(reason);
        }
        out.push_event(MotionEvent::PreloaderCompleted { reason, at_ms: at });
        log::debug!("preloader completed ({reason:?}) at {at}ms");
    }

    /// User skip. Ignored until the control is available, and once exiting.
    /// Call after advancing to the current time.
    pub fn skip(&mut self, out: &mut Outputs) -> bool {
        if !self.mounted || self.disposed || !self.skip_available || self.phase == Phase::Exit {
            return false;
        }
        self.force_exit(ExitReason::Skipped, self.cfg.skip_complete_delay_ms, out);
        true
    }

    /// Cancel every timer and drop the callback uncalled.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let dropped = self.timers.cancel_all();
        self.tick_timer = None;
        self.on_complete = None;
        log::debug!("preloader disposed, {dropped} timers cancelled");
    }

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    /// Displayed progress, whole percent.
    pub fn staged_progress(&self) -> u8 {
        self.progress.floor().clamp(0.0, 100.0) as u8
    }

    /// Raw progress including the fractional part of the current tick.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn assets_ready(&self) -> bool {
        self.assets_ready
    }

    pub fn skip_available(&self) -> bool {
        self.skip_available
    }

    pub fn completed(&self) -> Option<ExitReason> {
        self.completed
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn state(&self) -> PreloaderState {
        PreloaderState {
            staged_progress: self.staged_progress(),
            phase: self.phase,
            assets_ready: self.assets_ready,
            skip_available: self.skip_available,
            completed: self.completed,
        }
    }
}
