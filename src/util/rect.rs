// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rectangle corrections applied to labels before they are committed.

use super::geometry::{PixelPoint, PixelRect, Surface};
use crate::models::label::Rect;

/// Flip negative extents so the rectangle is anchored at its true top-left.
pub fn correct_degenerate(rect: Rect) -> Rect {
    let mut r = rect;
    if r.w < 0.0 {
        r.x += r.w;
        r.w = -r.w;
    }
    if r.h < 0.0 {
        r.y += r.h;
        r.h = -r.h;
    }
    r
}

/// Clamp the anchor to the unit square and cut extents that cross the far edge.
pub fn clamp_to_unit(rect: Rect) -> Rect {
    let mut r = rect;
    r.x = r.x.clamp(0.0, 1.0);
    r.y = r.y.clamp(0.0, 1.0);
    if r.x + r.w > 1.0 {
        r.w = 1.0 - r.x;
    }
    if r.y + r.h > 1.0 {
        r.h = 1.0 - r.y;
    }
    r
}

/// Shift the rectangle back inside the unit square, keeping its extents.
///
/// Extents larger than the square are cut to fit.
pub fn clamp_translation(rect: Rect) -> Rect {
    let w = rect.w.clamp(0.0, 1.0);
    let h = rect.h.clamp(0.0, 1.0);
    Rect {
        x: rect.x.clamp(0.0, 1.0 - w),
        y: rect.y.clamp(0.0, 1.0 - h),
        w,
        h,
    }
}

/// Raise extents that are smaller than the pixel minimum at the current scale.
///
/// A grown box that crosses the far edge is shifted back inside.
pub fn enforce_minimum(rect: Rect, min_w_px: f64, min_h_px: f64, surface: &Surface) -> Rect {
    let mut r = rect;
    let min_w = (min_w_px / surface.usable_width()).min(1.0);
    let min_h = (min_h_px / surface.usable_height()).min(1.0);

    if r.w * surface.usable_width() < min_w_px {
        r.w = min_w;
        if r.x + r.w > 1.0 {
            r.x = 1.0 - r.w;
        }
    }
    if r.h * surface.usable_height() < min_h_px {
        r.h = min_h;
        if r.y + r.h > 1.0 {
            r.y = 1.0 - r.h;
        }
    }
    r
}

/// Squared Euclidean distance between two pixel points.
pub fn distance_squared(a: PixelPoint, b: PixelPoint) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Inclusive point-in-rectangle test.
pub fn contains(rect: &PixelRect, point: PixelPoint) -> bool {
    point.x >= rect.x && point.x <= rect.right() && point.y >= rect.y && point.y <= rect.bottom()
}

/// Round a ratio to six decimals and drop its sign.
pub fn round_ratio(value: f64) -> f64 {
    ((value * 1e6).round() / 1e6).abs()
}

/// Bring untrusted geometry (e.g. fetched from storage) inside the unit square.
///
/// Returns `None` when nothing usable is left.
pub fn sanitize(rect: Rect) -> Option<Rect> {
    if !rect.is_finite() {
        return None;
    }
    let r = clamp_to_unit(correct_degenerate(rect));
    if r.w > 0.0 && r.h > 0.0 {
        Some(r)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Rect, b: Rect) -> bool {
        (a.x - b.x).abs() < 1e-9
            && (a.y - b.y).abs() < 1e-9
            && (a.w - b.w).abs() < 1e-9
            && (a.h - b.h).abs() < 1e-9
    }

    #[test]
    fn test_correct_degenerate_flips_anchor() {
        let r = correct_degenerate(Rect::new(0.5, 0.5, -0.2, -0.1));
        assert!(approx(r, Rect::new(0.3, 0.4, 0.2, 0.1)));

        let untouched = Rect::new(0.1, 0.1, 0.2, 0.2);
        assert_eq!(correct_degenerate(untouched), untouched);
    }

    #[test]
    fn test_clamp_to_unit() {
        let r = clamp_to_unit(Rect::new(-0.1, 0.2, 0.3, 0.9));
        assert!(approx(r, Rect::new(0.0, 0.2, 0.3, 0.8)));

        let r = clamp_to_unit(Rect::new(0.8, 0.0, 0.5, 0.5));
        assert!(approx(r, Rect::new(0.8, 0.0, 0.2, 0.5)));
    }

    #[test]
    fn test_clamp_translation_keeps_extents() {
        let r = clamp_translation(Rect::new(0.9, -0.2, 0.3, 0.4));
        assert!(approx(r, Rect::new(0.7, 0.0, 0.3, 0.4)));
    }

    #[test]
    fn test_enforce_minimum_exact() {
        let s = Surface::new(400.0, 300.0, 20.0);
        let r = enforce_minimum(Rect::new(0.1, 0.1, 5.0 / 360.0, 0.5), 16.0, 16.0, &s);

        assert!((r.w * 360.0 - 16.0).abs() < 1e-9);
        assert_eq!(r.h, 0.5);
    }

    #[test]
    fn test_enforce_minimum_stays_inside() {
        let s = Surface::new(400.0, 300.0, 20.0);
        let r = enforce_minimum(Rect::new(0.999, 0.999, 0.001, 0.001), 16.0, 16.0, &s);

        assert!(r.is_within_unit());
        assert!((r.x + r.w - 1.0).abs() < 1e-9);
        assert!((r.y + r.h - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_squared() {
        let d = distance_squared(PixelPoint::new(0.0, 0.0), PixelPoint::new(3.0, 4.0));
        assert_eq!(d, 25.0);
    }

    #[test]
    fn test_round_ratio() {
        assert_eq!(round_ratio(0.123_456_789), 0.123_457);
        assert_eq!(round_ratio(-0.25), 0.25);
    }

    #[test]
    fn test_sanitize() {
        let fixed = sanitize(Rect::new(0.9, 0.9, 0.3, -0.2)).unwrap();
        assert!(fixed.is_within_unit());
        assert!(sanitize(Rect::new(f64::NAN, 0.0, 0.1, 0.1)).is_none());
        assert!(sanitize(Rect::new(1.2, 0.0, 0.1, 0.1)).is_none());
        assert!(sanitize(Rect::new(0.2, 0.2, 0.0, 0.1)).is_none());
    }
}
