// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounding-box label data structures.
//!
//! Label geometry lives in the normalized coordinate space: `x` and `w` are
//! fractions of the image width, `y` and `h` fractions of the image height.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a label.
///
/// Stores may hand out any string. Labels created here get a UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(String);

impl LabelId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LabelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LabelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a category, as handed out by the category provider.
pub type CategoryId = String;

/// An axis-aligned rectangle in normalized coordinates.
///
/// Extents may be negative while a gesture is in progress; see
/// [`crate::util::rect::correct_degenerate`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// True when the rectangle lies inside the unit square with positive extents.
    pub fn is_within_unit(&self) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= 0.0
            && self.y >= 0.0
            && self.w > 0.0
            && self.h > 0.0
            && self.x + self.w <= 1.0 + EPS
            && self.y + self.h <= 1.0 + EPS
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

/// A bounding-box annotation attached to one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Label {
    /// Create a label with a fresh identifier.
    pub fn new(category_id: Option<CategoryId>, rect: Rect) -> Self {
        Self {
            id: LabelId::generate(),
            category_id,
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Copy of this label with its geometry replaced.
    pub fn with_rect(&self, rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            ..self.clone()
        }
    }
}

/// Wire shape of a label set, shared by the REST API and the file store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelsDocument {
    pub labels: Vec<Label>,
}
