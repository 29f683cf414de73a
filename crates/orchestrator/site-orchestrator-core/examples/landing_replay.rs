use serde::Deserialize;
use serde_json::to_string_pretty;

use site_motion_core::MotionConfig;
use site_orchestrator::{DiagnosticsCfg, HostEvent, Orchestrator, SiteLayout};
use site_test_fixtures::{configs, layouts, scripts};

#[derive(Deserialize)]
struct Script {
    steps: Vec<Step>,
}

#[derive(Deserialize)]
struct Step {
    dt_ms: u64,
    #[serde(default)]
    events: Vec<HostEvent>,
}

fn main() -> anyhow::Result<()> {
    let cfg: MotionConfig = configs::load("default")?;
    let layout: SiteLayout = layouts::load("landing")?;
    // warn on frames publishing more than 64 values
    let diagnostics = DiagnosticsCfg {
        enabled: true,
        busy_frame_changes: 64,
    };
    let mut orch = Orchestrator::new(cfg)?
        .with_diagnostics(diagnostics)
        .with_layout(&layout)?;
    orch.on_preloader_complete(|reason| println!("preloader done: {reason:?}"));

    // Replay the recorded scroll session frame by frame.
    let script: Script = scripts::load("scroll_through")?;
    for step in script.steps {
        for e in step.events {
            orch.push_event(e);
        }
        let frame = orch.step(step.dt_ms)?;
        println!(
            "frame {:>3} @{:>5}ms: {:>3} changes, events {}",
            frame.epoch,
            frame.now_ms,
            frame.changes.len(),
            serde_json::to_string(&frame.events)?
        );
    }

    println!("final state:\n{}", to_string_pretty(&orch.snapshot().nav)?);
    if let Some(entry) = orch.blackboard.get("nav/active_section") {
        println!("active section = {:?} (epoch {}, {})", entry.value, entry.epoch, entry.source);
    }
    Ok(())
}
