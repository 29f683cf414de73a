use std::cell::{Cell, RefCell};
use std::rc::Rc;

use site_motion_core::{
    ExitReason, MotionEvent, Outputs, Phase, PreloaderCfg, PreloaderSequencer, Stage,
};

/// Sequencer mounted at t=0 with a counting completion callback.
fn mounted(cfg: PreloaderCfg) -> (PreloaderSequencer, Rc<Cell<u32>>, Rc<RefCell<Vec<ExitReason>>>) {
    let calls = Rc::new(Cell::new(0));
    let reasons = Rc::new(RefCell::new(Vec::new()));
    let mut p = PreloaderSequencer::new(cfg).expect("valid config");
    let (c, r) = (Rc::clone(&calls), Rc::clone(&reasons));
    p.on_complete(move |reason| {
        c.set(c.get() + 1);
        r.borrow_mut().push(reason);
    });
    p.mount(0);
    (p, calls, reasons)
}

fn completion_times(out: &Outputs) -> Vec<u64> {
    out.events
        .iter()
        .filter_map(|e| match e {
            MotionEvent::PreloaderCompleted { at_ms, .. } => Some(*at_ms),
            _ => None,
        })
        .collect()
}

/// Advance in 16ms frames, like a render loop would.
fn run_frames(p: &mut PreloaderSequencer, until: u64, out: &mut Outputs) {
    let mut t = p.now();
    while t < until {
        t = (t + 16).min(until);
        p.advance_to(t, out);
    }
}

fn stalled_cfg() -> PreloaderCfg {
    PreloaderCfg {
        stages: vec![Stage::new(15, 200), Stage::new(90, 600_000), Stage::new(100, 200)],
        ..PreloaderCfg::default()
    }
}

#[test]
fn normal_completion_fires_once() {
    let (mut p, calls, reasons) = mounted(PreloaderCfg::default());
    let mut out = Outputs::default();
    run_frames(&mut p, 30_000, &mut out);

    assert_eq!(calls.get(), 1);
    assert_eq!(*reasons.borrow(), vec![ExitReason::Finished]);
    assert_eq!(p.phase(), Phase::Exit);
    assert_eq!(p.staged_progress(), 100);
    assert!(p.assets_ready());

    let done = completion_times(&out);
    assert_eq!(done.len(), 1);
    // six stages (1700ms) + five pauses (250..=750ms) + ready/exit/complete (1800ms)
    assert!(done[0] >= 3500 && done[0] <= 4400, "completed at {}", done[0]);

    let phases: Vec<Phase> = out
        .events
        .iter()
        .filter_map(|e| match e {
            MotionEvent::PreloaderPhase { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(phases, vec![Phase::Complete, Phase::Exit]);
}

#[test]
fn progress_is_non_decreasing_while_loading() {
    let (mut p, _, _) = mounted(PreloaderCfg::default());
    let mut out = Outputs::default();
    let mut last = 0;
    let mut t = 0;
    while p.phase() == Phase::Loading && t < 10_000 {
        t += 16;
        p.advance_to(t, &mut out);
        let now = p.staged_progress();
        assert!(now >= last, "progress fell from {last} to {now} at {t}ms");
        last = now;
    }
    assert_eq!(last, 100);
}

#[test]
fn skip_before_control_is_shown_has_no_effect() {
    let (mut p, calls, _) = mounted(stalled_cfg());
    let mut out = Outputs::default();
    p.advance_to(1999, &mut out);
    assert!(!p.skip_available());
    assert!(!p.skip(&mut out));
    assert_eq!(p.phase(), Phase::Loading);
    assert_eq!(calls.get(), 0);
}

#[test]
fn skip_after_two_seconds_exits_and_completes_300ms_later() {
    let (mut p, calls, reasons) = mounted(stalled_cfg());
    let mut out = Outputs::default();
    p.advance_to(2000, &mut out);
    assert!(p.skip_available());
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, MotionEvent::SkipAvailable { at_ms: 2000 })));

    assert!(p.skip(&mut out));
    assert_eq!(p.phase(), Phase::Exit);
    assert!(!p.skip(&mut out), "second skip is ignored");

    p.advance_to(2299, &mut out);
    assert_eq!(calls.get(), 0);
    p.advance_to(2300, &mut out);
    assert_eq!(calls.get(), 1);
    assert_eq!(*reasons.borrow(), vec![ExitReason::Skipped]);

    run_frames(&mut p, 20_000, &mut out);
    assert_eq!(calls.get(), 1, "watchdog must not fire a second completion");
    assert_eq!(completion_times(&out), vec![2300]);
}

#[test]
fn watchdog_completes_a_stalled_preloader() {
    let (mut p, calls, reasons) = mounted(stalled_cfg());
    let mut out = Outputs::default();
    run_frames(&mut p, 9_984, &mut out);
    assert_eq!(calls.get(), 0);
    assert_eq!(p.phase(), Phase::Loading);
    assert!(p.staged_progress() < 90);

    run_frames(&mut p, 12_000, &mut out);
    assert_eq!(calls.get(), 1);
    assert_eq!(*reasons.borrow(), vec![ExitReason::Watchdog]);
    let done = completion_times(&out);
    assert_eq!(done.len(), 1);
    assert!(done[0].abs_diff(10_000) <= 50, "completed at {}", done[0]);
}

#[test]
fn skip_racing_the_watchdog_completes_once() {
    let (mut p, calls, reasons) = mounted(stalled_cfg());
    let mut out = Outputs::default();
    p.advance_to(9_900, &mut out);
    assert!(p.skip(&mut out));
    run_frames(&mut p, 15_000, &mut out);
    assert_eq!(calls.get(), 1);
    assert_eq!(*reasons.borrow(), vec![ExitReason::Skipped]);
    assert_eq!(completion_times(&out), vec![10_200]);
}

#[test]
fn nothing_fires_after_dispose() {
    let (mut p, calls, _) = mounted(PreloaderCfg::default());
    let mut out = Outputs::default();
    p.advance_to(500, &mut out);
    p.dispose();
    assert_eq!(p.pending_timers(), 0);

    let before = out.events.len();
    run_frames(&mut p, 20_000, &mut out);
    assert_eq!(calls.get(), 0);
    assert_eq!(out.events.len(), before);
    assert!(!p.skip(&mut out));
}

#[test]
fn dispose_during_exit_drops_pending_completion() {
    let (mut p, calls, _) = mounted(stalled_cfg());
    let mut out = Outputs::default();
    p.advance_to(2500, &mut out);
    assert!(p.skip(&mut out));
    p.advance_to(2600, &mut out);
    p.dispose();
    run_frames(&mut p, 12_000, &mut out);
    assert_eq!(calls.get(), 0);
    assert!(completion_times(&out).is_empty());
}

#[test]
fn last_completion_callback_wins() {
    let (mut p, first_calls, _) = mounted(PreloaderCfg::default());
    let second = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&second);
    p.on_complete(move |reason| sink.borrow_mut().push(reason));

    let mut out = Outputs::default();
    run_frames(&mut p, 30_000, &mut out);
    assert_eq!(first_calls.get(), 0);
    assert_eq!(*second.borrow(), vec![ExitReason::Finished]);
}
