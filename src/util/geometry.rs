// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Coordinate transformations between the normalized label space and the
//! pixel space of a drawing surface.
//!
//! The surface has a fixed inset margin (`offset`) on every edge; the usable
//! drawing rectangle is what remains. [`to_pixel`] is the one place where pixel
//! geometry of a label is computed.

use crate::models::label::Rect;

/// A point in surface pixel coordinates (origin at the surface's top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(a: PixelPoint, b: PixelPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (a.x - b.x).abs(),
            h: (a.y - b.y).abs(),
        }
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + 2.0 * margin,
            h: self.h + 2.0 * margin,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// Pixel dimensions of the current drawing surface and its inset margin.
///
/// Recomputed by the host on every layout change; it carries no other state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    pub offset: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64, offset: f64) -> Self {
        Self {
            width,
            height,
            offset,
        }
    }

    /// Width of the usable rectangle, never below one pixel.
    pub fn usable_width(&self) -> f64 {
        (self.width - 2.0 * self.offset).max(1.0)
    }

    /// Height of the usable rectangle, never below one pixel.
    pub fn usable_height(&self) -> f64 {
        (self.height - 2.0 * self.offset).max(1.0)
    }

    /// The usable drawing rectangle in surface pixels.
    pub fn usable_rect(&self) -> PixelRect {
        PixelRect::new(
            self.offset,
            self.offset,
            self.usable_width(),
            self.usable_height(),
        )
    }
}

/// Convert a normalized rectangle to surface pixels.
pub fn to_pixel(surface: &Surface, rect: &Rect) -> PixelRect {
    PixelRect {
        x: surface.offset + rect.x * surface.usable_width(),
        y: surface.offset + rect.y * surface.usable_height(),
        w: rect.w * surface.usable_width(),
        h: rect.h * surface.usable_height(),
    }
}

/// Convert a surface pixel point to normalized coordinates.
///
/// The result is not clamped: points in the margin map outside `[0, 1]`.
pub fn to_normalized_point(surface: &Surface, point: PixelPoint) -> (f64, f64) {
    (
        (point.x - surface.offset) / surface.usable_width(),
        (point.y - surface.offset) / surface.usable_height(),
    )
}

/// Normalized delta `a - b` of a pointer drag, or `(0, 0)` if either point is absent.
pub fn to_normalized_delta(
    surface: &Surface,
    a: Option<PixelPoint>,
    b: Option<PixelPoint>,
) -> (f64, f64) {
    match (a, b) {
        (Some(a), Some(b)) => (
            (a.x - b.x) / surface.usable_width(),
            (a.y - b.y) / surface.usable_height(),
        ),
        _ => (0.0, 0.0),
    }
}

/// True if the point lies in the margin band on any edge (or beyond it).
pub fn is_outside(surface: &Surface, point: PixelPoint) -> bool {
    point.x < surface.offset
        || point.x > surface.width - surface.offset
        || point.y < surface.offset
        || point.y > surface.height - surface.offset
}
