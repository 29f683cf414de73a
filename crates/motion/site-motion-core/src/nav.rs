//! Navigation interaction controller.
//!
//! Owns hide/show-on-scroll, hover-intent for the mega menu, active-section
//! detection, the mobile-menu focus trap and the body scroll lock.
//!
//! Hover intent keeps a single pending timer: every new hover event cancels
//! it before scheduling (debounce, never queue). The body lock is keyed per
//! overlay, so overlapping overlays release it only when the last one closes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clock::{Millis, TimerQueue};
use crate::config::NavCfg;
use crate::error::MotionError;
use crate::ids::TimerId;
use crate::outputs::{MotionEvent, Outputs};
use crate::trackers::scroll::ScrollState;
use crate::trackers::visibility::Span;

/// Fixed set of anchor sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Divisions,
    Ecosystem,
    Impact,
    About,
    Careers,
}

impl SectionId {
    pub const ALL: [SectionId; 5] = [
        SectionId::Divisions,
        SectionId::Ecosystem,
        SectionId::Impact,
        SectionId::About,
        SectionId::Careers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Divisions => "divisions",
            SectionId::Ecosystem => "ecosystem",
            SectionId::Impact => "impact",
            SectionId::About => "about",
            SectionId::Careers => "careers",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start_matches('#');
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| MotionError::UnknownSection(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    MobileMenu,
    MegaMenu,
    Search,
}

impl Overlay {
    /// Full-screen overlays lock body scroll.
    pub fn is_full_screen(&self) -> bool {
        matches!(self, Overlay::MobileMenu | Overlay::Search)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum NavKey {
    Tab { shift: bool },
    Escape,
}

/// Result of a key press routed through the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOutcome {
    /// The host must suppress its default handling.
    pub prevent_default: bool,
    /// Focus index inside the trap after the key, if trapped.
    pub focus: Option<usize>,
}

/// Body scroll lock keyed by the overlay holding it.
#[derive(Debug, Default, Clone)]
pub struct ScrollLock {
    holders: BTreeSet<Overlay>,
}

impl ScrollLock {
    /// Returns true when this acquire locked the body.
    pub fn acquire(&mut self, holder: Overlay) -> bool {
        let was = self.is_locked();
        self.holders.insert(holder);
        !was
    }

    /// Returns true when this release unlocked the body.
    pub fn release(&mut self, holder: Overlay) -> bool {
        let removed = self.holders.remove(&holder);
        removed && !self.is_locked()
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        !self.holders.is_empty()
    }

    pub fn holders(&self) -> impl Iterator<Item = &Overlay> {
        self.holders.iter()
    }
}

#[derive(Debug, Default, Clone)]
struct FocusTrap {
    len: usize,
    focused: Option<usize>,
}

impl FocusTrap {
    fn activate(&mut self, len: usize) {
        self.len = len;
        self.focused = if len > 0 { Some(0) } else { None };
    }

    fn deactivate(&mut self) {
        self.len = 0;
        self.focused = None;
    }

    /// Returns the new focus and whether the move wrapped.
    fn tab(&mut self, shift: bool) -> Option<(usize, bool)> {
        if self.len == 0 {
            return None;
        }
        let last = self.len - 1;
        let (next, wrapped) = match (self.focused, shift) {
            (None, false) => (0, false),
            (None, true) => (last, false),
            (Some(i), false) if i >= last => (0, true),
            (Some(i), false) => (i + 1, false),
            (Some(0), true) => (last, true),
            (Some(i), true) => (i - 1, false),
        };
        self.focused = Some(next);
        Some((next, wrapped))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NavState {
    pub mobile_menu_open: bool,
    pub mega_menu_open: bool,
    pub search_open: bool,
    pub active_section: Option<SectionId>,
    pub hidden: bool,
    pub last_scroll_y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum HoverIntent {
    Open,
    Close,
}

#[derive(Debug, Clone)]
struct SectionSlot {
    id: SectionId,
    span: Option<Span>,
    intersecting: bool,
}

#[derive(Debug)]
pub struct NavController {
    cfg: NavCfg,
    state: NavState,
    timers: TimerQueue<HoverIntent>,
    pending: Option<TimerId>,
    lock: ScrollLock,
    trap: FocusTrap,
    sections: Vec<SectionSlot>,
    disposed: bool,
}

impl NavController {
    pub fn new(cfg: NavCfg, now: Millis) -> Self {
        Self {
            cfg,
            state: NavState::default(),
            timers: TimerQueue::new(now),
            pending: None,
            lock: ScrollLock::default(),
            trap: FocusTrap::default(),
            sections: SectionId::ALL
                .into_iter()
                .map(|id| SectionSlot {
                    id,
                    span: None,
                    intersecting: false,
                })
                .collect(),
            disposed: false,
        }
    }

    #[inline]
    pub fn state(&self) -> &NavState {
        &self.state
    }

    #[inline]
    pub fn is_scroll_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.lock
    }

    pub fn focus_index(&self) -> Option<usize> {
        self.trap.focused
    }

    pub fn has_pending_intent(&self) -> bool {
        self.pending.is_some()
    }

    pub fn advance_to(&mut self, now: Millis, out: &mut Outputs) {
        if self.disposed {
            return;
        }
        while let Some(fired) = self.timers.pop_due(now) {
            if self.pending == Some(fired.id) {
                self.pending = None;
            }
            match fired.event {
                HoverIntent::Open => self.set_overlay(Overlay::MegaMenu, true, out),
                HoverIntent::Close => self.set_overlay(Overlay::MegaMenu, false, out),
            }
        }
        self.timers.settle(now);
    }

    // ---- hide on scroll ----

    pub fn on_scroll(&mut self, offset_y: f32, out: &mut Outputs) {
        if self.disposed {
            return;
        }
        if offset_y <= self.cfg.hide_threshold_px {
            self.set_hidden(false, out);
            self.state.last_scroll_y = offset_y;
            return;
        }
        let delta = offset_y - self.state.last_scroll_y;
        if delta.abs() < self.cfg.hide_delta_px {
            return;
        }
        self.set_hidden(delta > 0.0, out);
        self.state.last_scroll_y = offset_y;
    }

    fn set_hidden(&mut self, hidden: bool, out: &mut Outputs) {
        if self.state.hidden != hidden {
            self.state.hidden = hidden;
            out.push_event(MotionEvent::NavHidden { hidden });
        }
    }

    // ---- hover intent ----

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            self.timers.cancel(id);
        }
    }

    fn reschedule(&mut self, delay: Millis, intent: HoverIntent) {
        self.cancel_pending();
        self.pending = Some(self.timers.schedule(delay, intent));
    }

    pub fn trigger_enter(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_pending();
        if !self.state.mega_menu_open {
            self.reschedule(self.cfg.open_delay_ms, HoverIntent::Open);
        }
    }

    pub fn trigger_leave(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_pending();
        if self.state.mega_menu_open {
            self.reschedule(self.cfg.trigger_close_delay_ms, HoverIntent::Close);
        }
    }

    pub fn menu_enter(&mut self) {
        self.cancel_pending();
    }

    pub fn menu_leave(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_pending();
        if self.state.mega_menu_open {
            self.reschedule(self.cfg.menu_close_delay_ms, HoverIntent::Close);
        }
    }

    /// Click/keyboard activation of the trigger.
    pub fn toggle_mega_menu(&mut self, out: &mut Outputs) {
        if self.disposed {
            return;
        }
        self.cancel_pending();
        let open = !self.state.mega_menu_open;
        self.set_overlay(Overlay::MegaMenu, open, out);
    }

    // ---- overlays ----

    fn set_overlay(&mut self, overlay: Overlay, open: bool, out: &mut Outputs) {
        let flag = match overlay {
            Overlay::MobileMenu => &mut self.state.mobile_menu_open,
            Overlay::MegaMenu => &mut self.state.mega_menu_open,
            Overlay::Search => &mut self.state.search_open,
        };
        if *flag == open {
            return;
        }
        *flag = open;
        log::debug!("{overlay:?} {}", if open { "opened" } else { "closed" });
        out.push_event(match overlay {
            Overlay::MobileMenu => MotionEvent::MobileMenu { open },
            Overlay::MegaMenu => MotionEvent::MegaMenu { open },
            Overlay::Search => MotionEvent::Search { open },
        });

        if overlay.is_full_screen() {
            let changed = if open {
                self.lock.acquire(overlay)
            } else {
                self.lock.release(overlay)
            };
            if changed {
                out.push_event(MotionEvent::ScrollLock {
                    locked: open,
                    holder: overlay,
                });
            }
        }
    }

    /// Open the mobile menu with `focusable` elements; focus lands on the first.
    pub fn open_mobile_menu(&mut self, focusable: usize, out: &mut Outputs) {
        if self.disposed {
            return;
        }
        self.trap.activate(focusable);
        self.set_overlay(Overlay::MobileMenu, true, out);
    }

    pub fn close_mobile_menu(&mut self, out: &mut Outputs) {
        self.trap.deactivate();
        self.set_overlay(Overlay::MobileMenu, false, out);
    }

    pub fn open_search(&mut self, out: &mut Outputs) {
        if self.disposed {
            return;
        }
        self.set_overlay(Overlay::Search, true, out);
    }

    pub fn close_search(&mut self, out: &mut Outputs) {
        self.set_overlay(Overlay::Search, false, out);
    }

    /// Close every overlay at once.
    pub fn close_all(&mut self, out: &mut Outputs) {
        self.cancel_pending();
        self.close_mobile_menu(out);
        self.set_overlay(Overlay::MegaMenu, false, out);
        self.close_search(out);
    }

    /// Move focus inside the trap, e.g. after a pointer click.
    pub fn focus(&mut self, index: usize) {
        if index < self.trap.len {
            self.trap.focused = Some(index);
        }
    }

    pub fn key(&mut self, key: NavKey, out: &mut Outputs) -> KeyOutcome {
        if self.disposed {
            return KeyOutcome::default();
        }
        match key {
            NavKey::Escape => {
                let any_open = self.state.mobile_menu_open
                    || self.state.mega_menu_open
                    || self.state.search_open;
                self.close_all(out);
                KeyOutcome {
                    prevent_default: any_open,
                    focus: None,
                }
            }
            NavKey::Tab { shift } => {
                if !self.state.mobile_menu_open {
                    return KeyOutcome::default();
                }
                match self.trap.tab(shift) {
                    Some((focus, wrapped)) => KeyOutcome {
                        prevent_default: wrapped,
                        focus: Some(focus),
                    },
                    None => KeyOutcome {
                        prevent_default: true,
                        focus: None,
                    },
                }
            }
        }
    }

    // ---- active section ----

    pub fn set_section_span(&mut self, id: SectionId, span: Span) {
        if let Some(slot) = self.sections.iter_mut().find(|s| s.id == id) {
            slot.span = Some(span);
        }
    }

    /// Re-test every section against the centre band. Sections that just
    /// entered update the active id in anchor order, so the last one wins.
    pub fn observe_sections(&mut self, scroll: &ScrollState, out: &mut Outputs) {
        if self.disposed {
            return;
        }
        let band = self.cfg.section_band.band(scroll);
        let mut entered = None;
        for slot in self.sections.iter_mut() {
            let Some(span) = slot.span else {
                continue;
            };
            let now = span.intersects(band, 0.0);
            if now != slot.intersecting {
                slot.intersecting = now;
                if now {
                    entered = Some(slot.id);
                }
            }
        }
        if let Some(id) = entered {
            if self.state.active_section != Some(id) {
                self.state.active_section = Some(id);
                out.push_event(MotionEvent::ActiveSection { section: Some(id) });
            }
        }
    }

    pub fn publish(&self, out: &mut Outputs) {
        let s = &self.state;
        out.push_change("nav/hidden", s.hidden);
        out.push_change("nav/mega_menu_open", s.mega_menu_open);
        out.push_change("nav/search_open", s.search_open);
        out.push_change("nav/mobile_menu_open", s.mobile_menu_open);
        out.push_change(
            "nav/active_section",
            s.active_section.map(|id| id.as_str()).unwrap_or(""),
        );
        out.push_change("body/scroll_locked", self.lock.is_locked());
    }

    /// Close every overlay, cancel hover timers and release the body lock.
    pub fn dispose(&mut self, out: &mut Outputs) {
        if self.disposed {
            return;
        }
        self.close_all(out);
        self.timers.cancel_all();
        self.pending = None;
        let holders: Vec<Overlay> = self.lock.holders().copied().collect();
        for holder in holders {
            if self.lock.release(holder) {
                out.push_event(MotionEvent::ScrollLock {
                    locked: false,
                    holder,
                });
            }
        }
        self.trap.deactivate();
        self.disposed = true;
    }
}
