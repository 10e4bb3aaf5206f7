// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label-set transformations driven by a pointer drag.

use crate::config::CanvasConfig;
use crate::models::label::{CategoryId, Label, Rect};
use crate::util::geometry::{to_normalized_delta, to_normalized_point, PixelPoint, PixelRect, Surface};
use crate::util::hit_test::Corner;
use crate::util::rect::{clamp_to_unit, clamp_translation, correct_degenerate, enforce_minimum, round_ratio};

/// Apply the per-corner resize algebra for a normalized delta.
pub fn resize_rect(rect: Rect, corner: Corner, dx: f64, dy: f64) -> Rect {
    let Rect { x, y, w, h } = rect;
    match corner {
        Corner::TopLeft => Rect::new(x + dx, y + dy, w - dx, h - dy),
        Corner::TopRight => Rect::new(x, y + dy, w + dx, h - dy),
        Corner::BottomLeft => Rect::new(x + dx, y, w - dx, h + dy),
        Corner::BottomRight => Rect::new(x, y, w + dx, h + dy),
    }
}

/// Move every label by the drag vector `current - anchor`, keeping it inside the image.
pub fn translate_labels(
    surface: &Surface,
    labels: &[Label],
    current: PixelPoint,
    anchor: PixelPoint,
) -> Vec<Label> {
    let (dx, dy) = to_normalized_delta(surface, Some(current), Some(anchor));
    labels
        .iter()
        .map(|label| {
            let r = label.rect();
            label.with_rect(clamp_translation(Rect::new(r.x + dx, r.y + dy, r.w, r.h)))
        })
        .collect()
}

/// Resize every label from `corner` by the drag vector `current - anchor`.
///
/// The minimum size is only enforced when `commit` is set; previews keep the
/// raw size so the violation can be shown.
pub fn resize_labels(
    surface: &Surface,
    labels: &[Label],
    current: PixelPoint,
    anchor: PixelPoint,
    corner: Corner,
    commit: Option<&CanvasConfig>,
) -> Vec<Label> {
    let (dx, dy) = to_normalized_delta(surface, Some(current), Some(anchor));
    labels
        .iter()
        .map(|label| {
            let mut r = clamp_to_unit(correct_degenerate(resize_rect(label.rect(), corner, dx, dy)));
            if let Some(canvas) = commit {
                r = enforce_minimum(r, canvas.min_label_width, canvas.min_label_height, surface);
            }
            label.with_rect(r)
        })
        .collect()
}

/// True if a pixel rectangle is narrower or shorter than the configured minimum.
pub fn is_below_minimum(w_px: f64, h_px: f64, canvas: &CanvasConfig) -> bool {
    w_px.abs() < canvas.min_label_width || h_px.abs() < canvas.min_label_height
}

/// Pixel-space size check of a normalized rectangle on `surface`.
pub fn rect_below_minimum(surface: &Surface, rect: &Rect, canvas: &CanvasConfig) -> bool {
    is_below_minimum(
        rect.w * surface.usable_width(),
        rect.h * surface.usable_height(),
        canvas,
    )
}

/// Turn a finished draw gesture into a label, or `None` if it is too small.
pub fn draft_to_label(
    surface: &Surface,
    anchor: PixelPoint,
    current: PixelPoint,
    category_id: Option<CategoryId>,
    canvas: &CanvasConfig,
) -> Option<Label> {
    let px = PixelRect::from_corners(anchor, current);
    if is_below_minimum(px.w, px.h, canvas) {
        return None;
    }
    let (x, y) = to_normalized_point(surface, PixelPoint::new(px.x, px.y));
    let (w, h) = to_normalized_delta(surface, Some(current), Some(anchor));
    let rect = Rect::new(
        round_ratio(x),
        round_ratio(y),
        round_ratio(w.abs()),
        round_ratio(h.abs()),
    );
    Some(Label::new(category_id, clamp_to_unit(rect)))
}
