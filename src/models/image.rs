// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image metadata.
//!
//! The image is read-only within the annotation engine: its pixel size is the
//! denominator of every normalized label coordinate.

use serde::{Deserialize, Serialize};

/// An image of a dataset, as known to the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: String,
    pub path: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    /// Create image metadata for the given file and pixel dimensions.
    pub fn new(id: impl Into<String>, path: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            width,
            height,
        }
    }

    /// Width divided by height, or 1.0 for a degenerate image.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}
