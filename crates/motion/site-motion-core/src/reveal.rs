//! Reveal orchestrator.
//!
//! Below-the-fold sections register a one-shot visibility trigger and a
//! declarative [`RevealPlan`]. When the trigger fires, the plan interpolates
//! from its hidden style to its visible style, staggered across children:
//! child `i` starts at `delay_children_ms + i * stagger_children_ms` after the
//! trigger. Elements never re-hide.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::error::MotionError;
use crate::ids::ElementId;
use crate::interp::{lerp_f32, lerp_vec2, Easing};
use crate::outputs::{MotionEvent, Outputs};
use crate::trackers::scroll::ScrollState;
use crate::trackers::visibility::{Span, TriggerOptions, TriggerState, VisibilityTracker};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealStyle {
    pub opacity: f32,
    /// Translate in px (x, y).
    pub offset: [f32; 2],
    /// Blur radius in px.
    pub blur: f32,
    pub scale: f32,
}

impl RevealStyle {
    pub const VISIBLE: RevealStyle = RevealStyle {
        opacity: 1.0,
        offset: [0.0, 0.0],
        blur: 0.0,
        scale: 1.0,
    };

    pub fn lerp(a: &RevealStyle, b: &RevealStyle, t: f32) -> RevealStyle {
        RevealStyle {
            opacity: lerp_f32(a.opacity, b.opacity, t),
            offset: lerp_vec2(a.offset, b.offset, t),
            blur: lerp_f32(a.blur, b.blur, t),
            scale: lerp_f32(a.scale, b.scale, t),
        }
    }

    pub fn publish(&self, prefix: &str, out: &mut Outputs) {
        out.push_change(format!("{prefix}.opacity"), self.opacity);
        out.push_change(format!("{prefix}.offset"), self.offset);
        out.push_change(format!("{prefix}.blur"), self.blur);
        out.push_change(format!("{prefix}.scale"), self.scale);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealPlan {
    pub hidden: RevealStyle,
    pub visible: RevealStyle,
    pub duration_ms: Millis,
    pub easing: Easing,
    /// Delay of the element itself after its trigger.
    pub delay_ms: Millis,
    pub delay_children_ms: Millis,
    pub stagger_children_ms: Millis,
    /// Number of staggered children; 0 animates the element as one unit.
    pub children: usize,
}

impl Default for RevealPlan {
    fn default() -> Self {
        Self {
            hidden: RevealStyle {
                opacity: 0.0,
                offset: [0.0, 40.0],
                blur: 10.0,
                scale: 1.0,
            },
            visible: RevealStyle::VISIBLE,
            duration_ms: 800,
            easing: Easing::EaseOut,
            delay_ms: 0,
            delay_children_ms: 200,
            stagger_children_ms: 100,
            children: 0,
        }
    }
}

impl RevealPlan {
    /// Style `elapsed` ms after this tween started.
    pub fn style_at(&self, elapsed: Millis) -> RevealStyle {
        let t = if self.duration_ms == 0 {
            1.0
        } else {
            (elapsed as f32 / self.duration_ms as f32).min(1.0)
        };
        RevealStyle::lerp(&self.hidden, &self.visible, self.easing.apply(t))
    }

    /// Start offset of child `i` relative to the trigger.
    #[inline]
    pub fn child_start(&self, i: usize) -> Millis {
        self.delay_ms + self.delay_children_ms + i as Millis * self.stagger_children_ms
    }

    /// Start offsets of every animated target relative to the trigger.
    pub fn starts(&self) -> Vec<Millis> {
        if self.children == 0 {
            vec![self.delay_ms]
        } else {
            (0..self.children).map(|i| self.child_start(i)).collect()
        }
    }

    /// Time from trigger until the last target settles.
    pub fn total_ms(&self) -> Millis {
        self.starts().into_iter().max().unwrap_or(0) + self.duration_ms
    }

    /// One style per target, `since_trigger` ms after the trigger.
    pub fn sample(&self, since_trigger: Millis) -> Vec<RevealStyle> {
        self.starts()
            .into_iter()
            .map(|start| {
                if since_trigger < start {
                    self.hidden
                } else {
                    self.style_at(since_trigger - start)
                }
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealSample {
    pub element: ElementId,
    pub child: Option<usize>,
    pub style: RevealStyle,
}

#[derive(Debug)]
struct Group {
    id: ElementId,
    name: String,
    plan: RevealPlan,
    fired_at: Option<Millis>,
    settled: bool,
}

#[derive(Debug, Default)]
pub struct RevealOrchestrator {
    tracker: VisibilityTracker,
    groups: Vec<Group>,
}

impl RevealOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register and arm a reveal for `name`.
    pub fn register(
        &mut self,
        name: &str,
        span: Span,
        options: TriggerOptions,
        plan: RevealPlan,
    ) -> Result<ElementId, MotionError> {
        let id = self.tracker.register(span, options)?;
        self.tracker.arm(id)?;
        self.groups.push(Group {
            id,
            name: name.to_string(),
            plan,
            fired_at: None,
            settled: false,
        });
        Ok(id)
    }

    pub fn id_of(&self, name: &str) -> Option<ElementId> {
        self.groups.iter().find(|g| g.name == name).map(|g| g.id)
    }

    pub fn name_of(&self, id: ElementId) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.name.as_str())
    }

    pub fn set_span(&mut self, id: ElementId, span: Span) -> Result<(), MotionError> {
        self.tracker.set_span(id, span)
    }

    pub fn trigger_state(&self, id: ElementId) -> Option<TriggerState> {
        self.tracker.state(id)
    }

    pub fn fired_at(&self, id: ElementId) -> Option<Millis> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .and_then(|g| g.fired_at)
    }

    /// Feed the latest scroll state; newly visible groups start at `now`.
    pub fn observe(&mut self, scroll: &ScrollState, now: Millis, out: &mut Outputs) {
        for id in self.tracker.evaluate(scroll) {
            if let Some(g) = self.groups.iter_mut().find(|g| g.id == id) {
                g.fired_at = Some(now);
                log::debug!("reveal '{}' triggered at {now}ms", g.name);
                out.push_event(MotionEvent::RevealStarted {
                    element: id,
                    at_ms: now,
                });
            }
        }
    }

    /// Mark groups whose last child finished.
    pub fn advance(&mut self, now: Millis, out: &mut Outputs) {
        for g in self.groups.iter_mut() {
            if g.settled {
                continue;
            }
            if let Some(t0) = g.fired_at {
                let done = t0 + g.plan.total_ms();
                if now >= done {
                    g.settled = true;
                    out.push_event(MotionEvent::RevealSettled {
                        element: g.id,
                        at_ms: done,
                    });
                }
            }
        }
    }

    pub fn sample(&self, now: Millis) -> Vec<RevealSample> {
        let mut samples = Vec::new();
        for g in &self.groups {
            let styles = match g.fired_at {
                Some(t0) => g.plan.sample(now.saturating_sub(t0)),
                None => vec![g.plan.hidden; g.plan.starts().len()],
            };
            let staggered = g.plan.children > 0;
            for (i, style) in styles.into_iter().enumerate() {
                samples.push(RevealSample {
                    element: g.id,
                    child: staggered.then_some(i),
                    style,
                });
            }
        }
        samples
    }

    /// Publish styles under `reveal/<name>` or `reveal/<name>/<child>`.
    pub fn publish(&self, now: Millis, out: &mut Outputs) {
        for s in self.sample(now) {
            let Some(name) = self.name_of(s.element) else {
                continue;
            };
            let prefix = match s.child {
                Some(i) => format!("reveal/{name}/{i}"),
                None => format!("reveal/{name}"),
            };
            s.style.publish(&prefix, out);
        }
    }

    pub fn all_settled(&self) -> bool {
        self.groups.iter().all(|g| g.settled)
    }

    pub fn dispose(&mut self) {
        self.tracker.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagger_composition() {
        let plan = RevealPlan {
            delay_children_ms: 200,
            stagger_children_ms: 100,
            children: 3,
            ..RevealPlan::default()
        };
        assert_eq!(plan.starts(), vec![200, 300, 400]);
        assert_eq!(plan.total_ms(), 400 + 800);
        let s = plan.sample(300);
        assert!(s[0].opacity > 0.0);
        assert_eq!(s[1], plan.hidden);
        assert_eq!(s[2], plan.hidden);
    }

    #[test]
    fn single_unit_ignores_child_delays() {
        let plan = RevealPlan::default();
        assert_eq!(plan.starts(), vec![0]);
        assert_eq!(plan.sample(800), vec![RevealStyle::VISIBLE]);
    }

    #[test]
    fn zero_duration_snaps_visible() {
        let plan = RevealPlan {
            duration_ms: 0,
            ..RevealPlan::default()
        };
        assert_eq!(plan.style_at(0), RevealStyle::VISIBLE);
    }
}
