use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use site_motion_core::hero::hero_frame;
use site_motion_core::{HeroCfg, HeroParallax, PointerState};

proptest! {
    #[test]
    fn content_opacity_matches_formula(vh in 200.0f32..2400.0, frac in 0.0f32..=1.0) {
        let cfg = HeroCfg::default();
        let scroll_y = vh * frac;
        let f = hero_frame(&cfg, scroll_y, vh, &PointerState::default());
        let expected = 1.0 - (scroll_y / (vh * 0.7)).clamp(0.0, 1.0);
        prop_assert!((f.content_opacity - expected).abs() < 1e-5);
        prop_assert!((0.0..=1.0).contains(&f.scroll_indicator_opacity));
        prop_assert!(f.scroll_indicator_opacity <= f.content_opacity + 1e-6);
    }

    #[test]
    fn content_opacity_non_increasing(vh in 200.0f32..2400.0, a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
        let cfg = HeroCfg::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let p = PointerState::default();
        let f_lo = hero_frame(&cfg, vh * lo, vh, &p);
        let f_hi = hero_frame(&cfg, vh * hi, vh, &p);
        prop_assert!(f_hi.content_opacity <= f_lo.content_opacity);
        prop_assert!(f_hi.content_scale <= f_lo.content_scale);
    }

    #[test]
    fn pointer_offsets_are_bounded(x in 0.0f32..=1.0, y in 0.0f32..=1.0) {
        let cfg = HeroCfg::default();
        let f = hero_frame(&cfg, 0.0, 900.0, &PointerState { x, y });
        prop_assert!(f.pointer_offset[0].abs() <= 5.0 + 1e-6);
        prop_assert!(f.pointer_offset[1].abs() <= 2.5 + 1e-6);
        prop_assert!((f.scene_offset[0] + f.pointer_offset[0] * 0.5).abs() < 1e-6);
        prop_assert!((f.scene_offset[1] + f.pointer_offset[1] * 0.5).abs() < 1e-6);
    }
}

#[test]
fn pure_values_are_recomputable() {
    let cfg = HeroCfg::default();
    let p = PointerState { x: 0.8, y: 0.3 };
    assert_eq!(hero_frame(&cfg, 240.0, 800.0, &p), hero_frame(&cfg, 240.0, 800.0, &p));
}

#[test]
fn pointer_still_moves_while_scroll_is_frozen() {
    let mut h = HeroParallax::new(HeroCfg::default());
    h.update(1200.0, 1000.0, &PointerState::default());
    assert!(h.is_frozen());
    let opacity = h.frame().content_opacity;
    let f = *h.update(2400.0, 1000.0, &PointerState { x: 1.0, y: 1.0 });
    assert_eq!(f.content_opacity, opacity);
    assert_abs_diff_eq!(f.content_offset[0], 5.0, epsilon = 1e-4);
    assert_abs_diff_eq!(f.content_offset[1], 300.0 + 2.5, epsilon = 1e-3);
}

#[test]
fn frozen_values_follow_a_viewport_resize() {
    let mut h = HeroParallax::new(HeroCfg::default());
    h.update(1200.0, 1000.0, &PointerState::default());
    assert_abs_diff_eq!(h.frame().content_translate_y, 300.0, epsilon = 1e-3);

    // still past the hero after shrinking the window
    let f = *h.update(1200.0, 500.0, &PointerState::default());
    assert!(h.is_frozen());
    assert_abs_diff_eq!(f.content_translate_y, 150.0, epsilon = 1e-3);
    assert_eq!(f, hero_frame(&HeroCfg::default(), 500.0, 500.0, &PointerState::default()));
}
