use site_motion_core::{
    MotionEvent, Outputs, RevealOrchestrator, RevealPlan, RevealStyle, ScrollState, Span,
    TriggerOptions, TriggerState,
};

fn at(offset_y: f32) -> ScrollState {
    ScrollState {
        offset_y,
        document_height: 6000.0,
        viewport_height: 1000.0,
    }
}

fn started(out: &Outputs) -> usize {
    out.events
        .iter()
        .filter(|e| matches!(e, MotionEvent::RevealStarted { .. }))
        .count()
}

#[test]
fn reveal_fires_exactly_once_across_scroll_round_trips() {
    let mut r = RevealOrchestrator::new();
    let id = r
        .register(
            "manifesto",
            Span::new(2000.0, 400.0),
            TriggerOptions {
                threshold: 0.5,
                ..TriggerOptions::default()
            },
            RevealPlan::default(),
        )
        .unwrap();
    let mut out = Outputs::default();

    r.observe(&at(0.0), 0, &mut out);
    assert_eq!(r.trigger_state(id), Some(TriggerState::Armed));

    // 100 of 400 px visible: below threshold
    r.observe(&at(1100.0), 100, &mut out);
    assert_eq!(started(&out), 0);

    r.observe(&at(1300.0), 200, &mut out);
    assert_eq!(r.fired_at(id), Some(200));

    // out of view and back in again
    for (i, y) in [0.0, 1300.0, 5000.0, 1500.0].into_iter().enumerate() {
        let now = 1200 + i as u64 * 500;
        r.observe(&at(y), now, &mut out);
        let samples = r.sample(now);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].style, RevealStyle::VISIBLE);
    }
    assert_eq!(started(&out), 1);
    assert_eq!(r.fired_at(id), Some(200));
    assert_eq!(r.trigger_state(id), Some(TriggerState::Fired));
}

#[test]
fn hidden_until_triggered() {
    let mut r = RevealOrchestrator::new();
    let plan = RevealPlan::default();
    r.register("cta", Span::new(5000.0, 300.0), TriggerOptions::default(), plan.clone())
        .unwrap();
    let mut out = Outputs::default();
    r.observe(&at(0.0), 0, &mut out);
    assert_eq!(r.sample(10_000)[0].style, plan.hidden);
}

#[test]
fn children_stagger_from_trigger_time() {
    let mut r = RevealOrchestrator::new();
    let plan = RevealPlan {
        children: 4,
        delay_children_ms: 200,
        stagger_children_ms: 100,
        duration_ms: 500,
        ..RevealPlan::default()
    };
    let id = r
        .register("divisions", Span::new(1200.0, 900.0), TriggerOptions::default(), plan.clone())
        .unwrap();
    let mut out = Outputs::default();
    r.observe(&at(500.0), 1000, &mut out);

    // 350ms after trigger: children 0 and 1 are moving, 2 and 3 still hidden
    let s = r.sample(1350);
    assert_eq!(s.len(), 4);
    assert!(s.iter().all(|x| x.element == id));
    assert_eq!(s.iter().map(|x| x.child).collect::<Vec<_>>(), vec![Some(0), Some(1), Some(2), Some(3)]);
    assert!(s[0].style.opacity > s[1].style.opacity);
    assert!(s[1].style.opacity > 0.0);
    assert_eq!(s[2].style, plan.hidden);
    assert_eq!(s[3].style, plan.hidden);

    // last child starts at 500 and runs 500ms
    r.advance(1999, &mut out);
    assert!(!r.all_settled());
    r.advance(2000, &mut out);
    assert!(r.all_settled());
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, MotionEvent::RevealSettled { at_ms: 2000, .. })));
    assert!(r.sample(2000).iter().all(|x| x.style == RevealStyle::VISIBLE));
}

#[test]
fn negative_margin_delays_the_trigger() {
    let mut r = RevealOrchestrator::new();
    let opts = TriggerOptions {
        threshold: 0.0,
        margin: site_motion_core::RootMargin {
            top: site_motion_core::Margin::Px(0.0),
            bottom: site_motion_core::Margin::Px(-100.0),
        },
    };
    let id = r
        .register("stats", Span::new(1050.0, 200.0), opts, RevealPlan::default())
        .unwrap();
    let mut out = Outputs::default();
    // element top at 1050 is inside the viewport but above the shrunk band end (900)
    r.observe(&at(0.0), 0, &mut out);
    assert_eq!(r.fired_at(id), None);
    r.observe(&at(200.0), 16, &mut out);
    assert_eq!(r.fired_at(id), Some(16));
}

#[test]
fn publishes_paths_per_child() {
    let mut r = RevealOrchestrator::new();
    let plan = RevealPlan {
        children: 2,
        ..RevealPlan::default()
    };
    r.register("footer", Span::new(0.0, 100.0), TriggerOptions::default(), plan)
        .unwrap();
    let mut out = Outputs::default();
    r.observe(&at(0.0), 0, &mut out);
    r.publish(0, &mut out);
    let paths: Vec<&str> = out.changes.iter().map(|c| c.path.as_str()).collect();
    assert!(paths.contains(&"reveal/footer/0.opacity"));
    assert!(paths.contains(&"reveal/footer/1.blur"));
    assert_eq!(paths.len(), 8);
}
