//! Hero parallax and entrance.
//!
//! [`hero_frame`] is a pure function of scroll and pointer state. The
//! [`HeroParallax`] wrapper only adds the freeze: once the hero has scrolled
//! fully out of view the scroll-driven values stop recomputing.
//! [`HeroEntrance`] plays each hero element in at its timing-table cue once
//! the preloader has finished.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::config::{HeroCfg, TimingTable};
use crate::outputs::Outputs;
use crate::reveal::{RevealPlan, RevealStyle};
use crate::trackers::pointer::PointerState;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeroFrame {
    pub progress: f32,
    pub content_opacity: f32,
    pub content_translate_y: f32,
    pub content_scale: f32,
    pub scroll_indicator_opacity: f32,
    /// Pointer offset in px (x, y).
    pub pointer_offset: [f32; 2],
    /// Final content translate: pointer offset plus scroll translate.
    pub content_offset: [f32; 2],
    pub scene_opacity: f32,
    pub scene_offset: [f32; 2],
}

/// Scroll-driven part only.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScrollPart {
    progress: f32,
    content_opacity: f32,
    content_translate_y: f32,
    content_scale: f32,
    scroll_indicator_opacity: f32,
}

fn scroll_part(cfg: &HeroCfg, scroll_y: f32, viewport_height: f32) -> ScrollPart {
    let span = viewport_height * cfg.progress_span;
    let progress = if span > 0.0 {
        (scroll_y / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    ScrollPart {
        progress,
        content_opacity: 1.0 - progress,
        content_translate_y: scroll_y * cfg.translate_rate,
        content_scale: 1.0 - progress * cfg.scale_span,
        scroll_indicator_opacity: (1.0 - progress * cfg.indicator_rate).max(0.0),
    }
}

fn compose(cfg: &HeroCfg, s: ScrollPart, pointer: &PointerState) -> HeroFrame {
    let pointer_offset = pointer.centered_offset(cfg.pointer_range_px);
    HeroFrame {
        progress: s.progress,
        content_opacity: s.content_opacity,
        content_translate_y: s.content_translate_y,
        content_scale: s.content_scale,
        scroll_indicator_opacity: s.scroll_indicator_opacity,
        pointer_offset,
        content_offset: [pointer_offset[0], s.content_translate_y + pointer_offset[1]],
        scene_opacity: s.content_opacity,
        scene_offset: [
            -pointer_offset[0] * cfg.scene_factor,
            -pointer_offset[1] * cfg.scene_factor,
        ],
    }
}

/// Derived hero values for one input snapshot.
pub fn hero_frame(
    cfg: &HeroCfg,
    scroll_y: f32,
    viewport_height: f32,
    pointer: &PointerState,
) -> HeroFrame {
    compose(cfg, scroll_part(cfg, scroll_y, viewport_height), pointer)
}

#[derive(Debug)]
pub struct HeroParallax {
    cfg: HeroCfg,
    scroll: ScrollPart,
    frame: HeroFrame,
    frozen: bool,
}

impl HeroParallax {
    pub fn new(cfg: HeroCfg) -> Self {
        let scroll = scroll_part(&cfg, 0.0, 1.0);
        let frame = compose(&cfg, scroll, &PointerState::default());
        Self {
            cfg,
            scroll,
            frame,
            frozen: false,
        }
    }

    /// Recompute from the latest inputs. Past the hero the scroll part is
    /// pinned at the fully-scrolled values for the current viewport height;
    /// the pointer part always updates.
    pub fn update(&mut self, scroll_y: f32, viewport_height: f32, pointer: &PointerState) -> &HeroFrame {
        self.frozen = scroll_y >= viewport_height;
        let effective_y = if self.frozen { viewport_height } else { scroll_y };
        self.scroll = scroll_part(&self.cfg, effective_y, viewport_height);
        self.frame = compose(&self.cfg, self.scroll, pointer);
        &self.frame
    }

    #[inline]
    pub fn frame(&self) -> &HeroFrame {
        &self.frame
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn publish(&self, out: &mut Outputs) {
        let f = &self.frame;
        out.push_change("hero/content.opacity", f.content_opacity);
        out.push_change("hero/content.offset", f.content_offset);
        out.push_change("hero/content.scale", f.content_scale);
        out.push_change("hero/scroll_indicator.opacity", f.scroll_indicator_opacity);
        out.push_change("scene/opacity", f.scene_opacity);
        out.push_change("scene/offset", f.scene_offset);
    }
}

#[derive(Debug, Clone)]
struct Cue {
    element: String,
    delay_ms: Millis,
}

/// Timed hero entrance keyed by the timing table.
#[derive(Debug)]
pub struct HeroEntrance {
    plan: RevealPlan,
    cues: Vec<Cue>,
    started_at: Option<Millis>,
}

impl HeroEntrance {
    /// Cues missing from the timing table enter immediately.
    pub fn new(cfg: &HeroCfg, timing: &TimingTable) -> Self {
        let cues = cfg
            .entrance
            .iter()
            .map(|c| {
                let delay_ms = timing.offset_ms(&c.cue).unwrap_or_else(|| {
                    log::warn!("no timing cue '{}' for hero element '{}'", c.cue, c.element);
                    0
                });
                Cue {
                    element: c.element.clone(),
                    delay_ms,
                }
            })
            .collect();
        Self {
            plan: cfg.entrance_plan.clone(),
            cues,
            started_at: None,
        }
    }

    /// Start once; later calls are ignored.
    pub fn start(&mut self, now: Millis) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn started_at(&self) -> Option<Millis> {
        self.started_at
    }

    /// Style per element at `now`; hidden until started.
    pub fn sample(&self, now: Millis) -> Vec<(&str, RevealStyle)> {
        self.cues
            .iter()
            .map(|c| {
                let style = match self.started_at {
                    None => self.plan.hidden,
                    Some(t0) => self.plan.style_at(now.saturating_sub(t0 + c.delay_ms)),
                };
                (c.element.as_str(), style)
            })
            .collect()
    }

    pub fn is_settled(&self, now: Millis) -> bool {
        match self.started_at {
            None => false,
            Some(t0) => self
                .cues
                .iter()
                .all(|c| now >= t0 + c.delay_ms + self.plan.duration_ms),
        }
    }

    pub fn publish(&self, now: Millis, out: &mut Outputs) {
        for (element, style) in self.sample(now) {
            style.publish(&format!("hero/{element}"), out);
        }
    }
}
