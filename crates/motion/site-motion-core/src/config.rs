//! Core configuration for site-motion-core.
//!
//! Every pixel threshold, delay and stage budget lives here so hosts can tune
//! them without touching controller code. Defaults match the shipped site.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::error::MotionError;
use crate::reveal::{RevealPlan, RevealStyle};
use crate::trackers::visibility::{Margin, RootMargin, TriggerOptions};

/// Named entrance events mapped to offsets in seconds.
/// Built once at startup and read by every entrance sequencer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f32>", into = "BTreeMap<String, f32>")]
pub struct TimingTable {
    entries: BTreeMap<String, f32>,
}

impl TimingTable {
    pub fn new<I, S>(entries: I) -> Result<Self, MotionError>
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (event, seconds) in entries {
            let event = event.into();
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(MotionError::InvalidTiming { event, seconds });
            }
            map.insert(event, seconds);
        }
        Ok(Self { entries: map })
    }

    /// Offset in seconds for a named event.
    pub fn get(&self, event: &str) -> Option<f32> {
        self.entries.get(event).copied()
    }

    /// Offset rounded to whole milliseconds.
    pub fn offset_ms(&self, event: &str) -> Option<Millis> {
        self.get(event).map(|s| (s * 1000.0).round() as Millis)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<BTreeMap<String, f32>> for TimingTable {
    type Error = MotionError;

    fn try_from(map: BTreeMap<String, f32>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<TimingTable> for BTreeMap<String, f32> {
    fn from(t: TimingTable) -> Self {
        t.entries
    }
}

impl Default for TimingTable {
    fn default() -> Self {
        let entries = [
            ("nav", 0.1),
            ("hero_scene", 0.2),
            ("hero_badge", 0.3),
            ("hero_title", 0.5),
            ("hero_subtitle", 0.8),
            ("hero_cta", 1.0),
            ("scroll_indicator", 1.4),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

/// One preloader stage: reach `target` percent over `duration_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub target: u8,
    pub duration_ms: Millis,
}

impl Stage {
    pub const fn new(target: u8, duration_ms: Millis) -> Self {
        Self {
            target,
            duration_ms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloaderCfg {
    pub stages: Vec<Stage>,
    /// Progress sampling period (~60Hz).
    pub tick_ms: Millis,
    pub pause_min_ms: Millis,
    pub pause_max_ms: Millis,
    /// Complete -> assets ready.
    pub ready_delay_ms: Millis,
    /// Assets ready -> Exit.
    pub exit_delay_ms: Millis,
    /// Exit -> completion callback on the normal path.
    pub complete_delay_ms: Millis,
    pub skip_available_ms: Millis,
    /// Skip -> completion callback.
    pub skip_complete_delay_ms: Millis,
    pub watchdog_ms: Millis,
    /// Watchdog exit -> completion callback.
    pub watchdog_complete_delay_ms: Millis,
    /// Seed for the inter-stage pause generator.
    pub seed: u64,
}

impl Default for PreloaderCfg {
    fn default() -> Self {
        Self {
            stages: vec![
                Stage::new(15, 200),
                Stage::new(35, 400),
                Stage::new(55, 350),
                Stage::new(75, 300),
                Stage::new(90, 250),
                Stage::new(100, 200),
            ],
            tick_ms: 16,
            pause_min_ms: 50,
            pause_max_ms: 150,
            ready_delay_ms: 400,
            exit_delay_ms: 600,
            complete_delay_ms: 800,
            skip_available_ms: 2000,
            skip_complete_delay_ms: 300,
            watchdog_ms: 10_000,
            watchdog_complete_delay_ms: 0,
            seed: 0x5eed,
        }
    }
}

impl PreloaderCfg {
    pub fn validate(&self) -> Result<(), MotionError> {
        if self.stages.is_empty() {
            return Err(MotionError::EmptyStageTable);
        }
        let mut previous = 0u8;
        for (index, stage) in self.stages.iter().enumerate() {
            if stage.target <= previous || stage.target > 100 {
                return Err(MotionError::InvalidStageTarget {
                    index,
                    target: stage.target,
                    previous,
                });
            }
            previous = stage.target;
        }
        if previous != 100 {
            return Err(MotionError::UnfinishedStageTable(previous));
        }
        if self.tick_ms == 0 {
            return Err(MotionError::InvalidTickInterval);
        }
        if self.pause_min_ms > self.pause_max_ms {
            return Err(MotionError::InvalidPauseRange {
                min: self.pause_min_ms,
                max: self.pause_max_ms,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavCfg {
    /// Bar never hides above this offset.
    pub hide_threshold_px: f32,
    /// Minimum scroll delta before direction is trusted.
    pub hide_delta_px: f32,
    pub open_delay_ms: Millis,
    pub trigger_close_delay_ms: Millis,
    pub menu_close_delay_ms: Millis,
    /// Band used to pick the active section.
    pub section_band: RootMargin,
}

impl Default for NavCfg {
    fn default() -> Self {
        Self {
            hide_threshold_px: 500.0,
            hide_delta_px: 10.0,
            open_delay_ms: 150,
            trigger_close_delay_ms: 300,
            menu_close_delay_ms: 200,
            section_band: RootMargin {
                top: Margin::Percent(-40.0),
                bottom: Margin::Percent(-55.0),
            },
        }
    }
}

/// Hero element entering at a timing-table cue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntranceCue {
    pub element: String,
    pub cue: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroCfg {
    /// Fraction of the viewport height over which content fades out.
    pub progress_span: f32,
    pub translate_rate: f32,
    pub scale_span: f32,
    pub indicator_rate: f32,
    /// Pointer offset range in px (x, y) at the viewport edge.
    pub pointer_range_px: [f32; 2],
    /// Background layer moves against the pointer by this factor.
    pub scene_factor: f32,
    pub entrance: Vec<EntranceCue>,
    pub entrance_plan: RevealPlan,
}

impl Default for HeroCfg {
    fn default() -> Self {
        let cue = |element: &str, cue: &str| EntranceCue {
            element: element.to_string(),
            cue: cue.to_string(),
        };
        Self {
            progress_span: 0.7,
            translate_rate: 0.3,
            scale_span: 0.05,
            indicator_rate: 2.0,
            pointer_range_px: [10.0, 5.0],
            scene_factor: 0.5,
            entrance: vec![
                cue("scene", "hero_scene"),
                cue("badge", "hero_badge"),
                cue("title", "hero_title"),
                cue("subtitle", "hero_subtitle"),
                cue("cta", "hero_cta"),
                cue("scroll_indicator", "scroll_indicator"),
            ],
            entrance_plan: RevealPlan {
                hidden: RevealStyle {
                    opacity: 0.0,
                    offset: [0.0, 30.0],
                    blur: 8.0,
                    scale: 1.0,
                },
                duration_ms: 900,
                ..RevealPlan::default()
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealCfg {
    pub trigger: TriggerOptions,
    pub plan: RevealPlan,
}

impl Default for RevealCfg {
    fn default() -> Self {
        Self {
            trigger: TriggerOptions {
                threshold: 0.2,
                margin: RootMargin {
                    top: Margin::Px(0.0),
                    bottom: Margin::Px(-100.0),
                },
            },
            plan: RevealPlan::default(),
        }
    }
}

/// Top-level configuration consumed by the orchestrator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub timing: TimingTable,
    pub preloader: PreloaderCfg,
    pub nav: NavCfg,
    pub hero: HeroCfg,
    pub reveal: RevealCfg,
}

impl MotionConfig {
    pub fn from_json_str(s: &str) -> Result<Self, MotionError> {
        let cfg: MotionConfig =
            serde_json::from_str(s).map_err(|e| MotionError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        self.preloader.validate()?;
        self.reveal.trigger.validate()?;
        Ok(())
    }
}
