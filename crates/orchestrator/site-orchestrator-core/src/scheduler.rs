//! Frame passes.
//!
//! Order per frame:
//!   timers -> host events -> timers (zero-delay follow-ups) -> completion
//!   hand-off -> derived state -> publish
//!
//! Timers run before host events so anything an event schedules (hover
//! intent, skip completion) is measured from the current frame time.

use anyhow::{anyhow, bail, Context, Result};

use site_motion_core::{Change, KeyOutcome, Millis, MotionEvent, Outputs, Span};

use crate::events::HostEvent;
use crate::{Orchestrator, SiteFrame};

/// Run every pass for the frame ending at `o.now_ms`.
pub fn run_frame(o: &mut Orchestrator, dt_ms: Millis) -> Result<SiteFrame> {
    let now = o.now_ms;
    let mut out = Outputs::default();
    let mut key_outcomes = Vec::new();

    advance_timers(o, now, &mut out);

    while let Some(event) = o.queue.pop_front() {
        let kind = event.kind();
        if let Err(err) = apply_host_event(o, event, &mut out, &mut key_outcomes) {
            log::warn!("dropping {kind} event at {now}ms: {err:#}");
        }
    }

    advance_timers(o, now, &mut out);
    hand_off_completion(o, &out.events);
    derive(o, now, &mut out);

    let changes = publish(o, now);
    debug_assert!(out.changes.is_empty());

    Ok(SiteFrame {
        epoch: o.epoch,
        now_ms: now,
        dt_ms,
        changes,
        events: out.events,
        key_outcomes,
    })
}

fn advance_timers(o: &mut Orchestrator, now: Millis, out: &mut Outputs) {
    if let Some(p) = o.preloader.as_mut() {
        p.advance_to(now, out);
    }
    o.nav.advance_to(now, out);
}

/// Route one host event to its controller. Invalid input is an error.
pub fn apply_host_event(
    o: &mut Orchestrator,
    event: HostEvent,
    out: &mut Outputs,
    key_outcomes: &mut Vec<KeyOutcome>,
) -> Result<()> {
    match event {
        HostEvent::Scroll { y } => {
            let s = o.scroll.on_scroll(y)?;
            o.nav.on_scroll(s.offset_y, out);
        }
        HostEvent::Resize {
            width,
            height,
            document_height,
        } => {
            if !(width.is_finite() && width > 0.0) {
                bail!("viewport width must be positive, got {width}");
            }
            o.scroll.on_resize(height, document_height)?;
            o.viewport_width = width;
        }
        HostEvent::PointerMove { x, y } => {
            let vh = o.scroll.snapshot().viewport_height;
            o.pointer.on_pointer_move(x, y, [o.viewport_width, vh])?;
        }
        HostEvent::TriggerEnter => o.nav.trigger_enter(),
        HostEvent::TriggerLeave => o.nav.trigger_leave(),
        HostEvent::MenuEnter => o.nav.menu_enter(),
        HostEvent::MenuLeave => o.nav.menu_leave(),
        HostEvent::ToggleMegaMenu => o.nav.toggle_mega_menu(out),
        HostEvent::OpenMobileMenu { focusable } => o.nav.open_mobile_menu(focusable, out),
        HostEvent::CloseMobileMenu => o.nav.close_mobile_menu(out),
        HostEvent::OpenSearch => o.nav.open_search(out),
        HostEvent::CloseSearch => o.nav.close_search(out),
        HostEvent::Key(key) => key_outcomes.push(o.nav.key(key, out)),
        HostEvent::Focus { index } => o.nav.focus(index),
        HostEvent::Skip => {
            let skipped = o.preloader.as_mut().is_some_and(|p| p.skip(out));
            if skipped {
                log::debug!("preloader skipped at {}ms", o.now_ms);
            } else {
                log::debug!("skip ignored at {}ms", o.now_ms);
            }
        }
        HostEvent::SectionLayout {
            section,
            top,
            height,
        } => {
            let span = finite_span(top, height)?;
            o.nav.set_section_span(section, span);
        }
        HostEvent::RevealLayout { name, top, height } => {
            let span = finite_span(top, height)?;
            let id = o
                .reveals
                .id_of(&name)
                .ok_or_else(|| anyhow!("unknown reveal '{name}'"))?;
            o.reveals
                .set_span(id, span)
                .with_context(|| format!("reveal '{name}'"))?;
        }
    }
    Ok(())
}

fn finite_span(top: f32, height: f32) -> Result<Span> {
    if !top.is_finite() || !height.is_finite() || height < 0.0 {
        bail!("invalid span top={top} height={height}");
    }
    Ok(Span::new(top, height))
}

/// First completion seen starts the hero entrance at the completion instant.
fn hand_off_completion(o: &mut Orchestrator, events: &[MotionEvent]) {
    if o.preloader_exit.is_some() {
        return;
    }
    for e in events {
        if let MotionEvent::PreloaderCompleted { reason, at_ms } = e {
            o.preloader_exit = Some(*reason);
            o.entrance.start(*at_ms);
            log::debug!("hero entrance starts at {at_ms}ms ({reason:?})");
            break;
        }
    }
}

fn derive(o: &mut Orchestrator, now: Millis, out: &mut Outputs) {
    let scroll = o.scroll.snapshot();
    let pointer = o.pointer.snapshot();
    o.hero.update(scroll.offset_y, scroll.viewport_height, &pointer);
    o.reveals.observe(&scroll, now, out);
    o.reveals.advance(now, out);
    o.nav.observe_sections(&scroll, out);
}

/// Publish each source through the blackboard; returns what changed.
fn publish(o: &mut Orchestrator, now: Millis) -> Vec<Change> {
    let epoch = o.epoch;
    let mut changes = Vec::new();
    let mut staged = Outputs::default();

    if let Some(p) = o.preloader.as_ref() {
        let done = p.completed().is_some();
        staged.push_change("preloader/progress", p.staged_progress() as f32);
        staged.push_change("preloader/phase", p.phase().as_str());
        staged.push_change("preloader/skip_visible", p.skip_available());
        staged.push_change("preloader/assets_ready", p.assets_ready());
        staged.push_change("preloader/mounted", !done);
        commit(o, &mut staged, epoch, "preloader", &mut changes);
        if done {
            o.preloader = None;
            log::debug!("preloader unmounted at {now}ms");
        }
    }

    o.nav.publish(&mut staged);
    commit(o, &mut staged, epoch, "nav", &mut changes);

    o.hero.publish(&mut staged);
    commit(o, &mut staged, epoch, "hero", &mut changes);

    o.entrance.publish(now, &mut staged);
    commit(o, &mut staged, epoch, "entrance", &mut changes);

    o.reveals.publish(now, &mut staged);
    commit(o, &mut staged, epoch, "reveal", &mut changes);

    changes
}

fn commit(
    o: &mut Orchestrator,
    staged: &mut Outputs,
    epoch: u64,
    source: &str,
    changes: &mut Vec<Change>,
) {
    let batch = std::mem::take(&mut staged.changes);
    changes.extend(o.blackboard.apply(batch, epoch, source));
}
