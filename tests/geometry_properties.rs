// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Property tests: every label leaving a correction step lies inside the image.

use labelisator::config::CanvasConfig;
use labelisator::interaction::transform::{draft_to_label, resize_labels, translate_labels};
use labelisator::models::{Label, Rect};
use labelisator::util::geometry::{to_normalized_delta, to_normalized_point, to_pixel, PixelPoint, Surface};
use labelisator::util::hit_test::Corner;
use labelisator::util::rect::sanitize;
use proptest::prelude::*;

fn surface() -> Surface {
    Surface::new(400.0, 300.0, 20.0)
}

fn unit_label() -> impl Strategy<Value = Label> {
    (0.05f64..1.0, 0.05f64..1.0, 0.0f64..1.0, 0.0f64..1.0).prop_map(|(w, h, fx, fy)| {
        Label::new(None, Rect::new(fx * (1.0 - w), fy * (1.0 - h), w, h))
    })
}

fn corner() -> impl Strategy<Value = Corner> {
    prop::sample::select(Corner::ALL.to_vec())
}

#[test]
fn resize_past_origin_flips_anchor() {
    let s = surface();
    let label = Label::new(None, Rect::new(0.5, 0.5, 0.1, 0.1));
    // Bottom-right handle at (236, 176); drag by (-0.3, -0.3) normalized.
    let anchor = PixelPoint::new(236.0, 176.0);
    let current = PixelPoint::new(236.0 - 108.0, 176.0 - 78.0);
    let resized = resize_labels(&s, &[label], current, anchor, Corner::BottomRight, None);
    let r = resized[0].rect();

    assert!((r.x - 0.3).abs() < 1e-9);
    assert!((r.y - 0.3).abs() < 1e-9);
    assert!((r.w - 0.2).abs() < 1e-9);
    assert!((r.h - 0.2).abs() < 1e-9);
}

proptest! {
    #[test]
    fn pixel_mapping_round_trips(
        label in unit_label(),
        width in 60.0f64..2000.0,
        height in 60.0f64..2000.0,
    ) {
        let s = Surface::new(width, height, 20.0);
        let px = to_pixel(&s, &label.rect());
        let (x, y) = to_normalized_point(&s, PixelPoint::new(px.x, px.y));
        let (w, h) = to_normalized_delta(
            &s,
            Some(PixelPoint::new(px.right(), px.bottom())),
            Some(PixelPoint::new(px.x, px.y)),
        );

        prop_assert!((x - label.x).abs() < 1e-9);
        prop_assert!((y - label.y).abs() < 1e-9);
        prop_assert!((w - label.w).abs() < 1e-9);
        prop_assert!((h - label.h).abs() < 1e-9);
    }

    #[test]
    fn sanitized_rects_are_inside(
        x in -2.0f64..2.0,
        y in -2.0f64..2.0,
        w in -2.0f64..2.0,
        h in -2.0f64..2.0,
    ) {
        if let Some(r) = sanitize(Rect::new(x, y, w, h)) {
            prop_assert!(r.is_within_unit(), "{:?}", r);
        }
    }

    #[test]
    fn translation_keeps_extents_and_stays_inside(
        label in unit_label(),
        dx in -500.0f64..500.0,
        dy in -500.0f64..500.0,
    ) {
        let anchor = PixelPoint::new(200.0, 150.0);
        let current = PixelPoint::new(200.0 + dx, 150.0 + dy);
        let moved = translate_labels(&surface(), &[label.clone()], current, anchor);

        prop_assert_eq!(moved[0].w, label.w);
        prop_assert_eq!(moved[0].h, label.h);
        prop_assert!(moved[0].rect().is_within_unit(), "{:?}", moved[0]);
    }

    #[test]
    fn committed_resize_is_inside_and_large_enough(
        label in unit_label(),
        corner in corner(),
        x in 20.0f64..380.0,
        y in 20.0f64..280.0,
    ) {
        let s = surface();
        let canvas = CanvasConfig::default();
        let anchor = PixelPoint::new(200.0, 150.0);
        let resized = resize_labels(&s, &[label], PixelPoint::new(x, y), anchor, corner, Some(&canvas));
        let r = resized[0].rect();

        prop_assert!(r.x >= 0.0 && r.y >= 0.0);
        prop_assert!(r.x + r.w <= 1.0 + 1e-9 && r.y + r.h <= 1.0 + 1e-9, "{:?}", r);
        prop_assert!(r.w * s.usable_width() >= canvas.min_label_width - 1e-6);
        prop_assert!(r.h * s.usable_height() >= canvas.min_label_height - 1e-6);
    }

    #[test]
    fn drafts_inside_the_area_become_valid_labels(
        ax in 20.0f64..380.0,
        ay in 20.0f64..280.0,
        bx in 20.0f64..380.0,
        by in 20.0f64..280.0,
    ) {
        let canvas = CanvasConfig::default();
        let draft = draft_to_label(
            &surface(),
            PixelPoint::new(ax, ay),
            PixelPoint::new(bx, by),
            None,
            &canvas,
        );
        let big_enough = (ax - bx).abs() >= canvas.min_label_width
            && (ay - by).abs() >= canvas.min_label_height;

        prop_assert_eq!(draft.is_some(), big_enough);
        if let Some(label) = draft {
            prop_assert!(label.rect().is_within_unit(), "{:?}", label);
        }
    }
}
