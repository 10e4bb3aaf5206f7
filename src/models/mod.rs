// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: labels, categories and images.

pub mod category;
pub mod image;
pub mod label;

pub use category::Category;
pub use image::ImageInfo;
pub use label::{CategoryId, Label, LabelId, LabelsDocument, Rect};
