// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for persistence and session operations.
//!
//! Geometry problems are never errors: degenerate or out-of-range boxes are
//! corrected or discarded where they occur.

use thiserror::Error;

/// Errors raised by the persistence collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image not found: {id}")]
    ImageNotFound { id: String },
}

/// Errors raised by [`crate::session::AnnotationSession`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No image is loaded")]
    NoImage,

    #[error("A save for image {image_id} is already in flight")]
    SaveInFlight { image_id: String },

    #[error("Session is read-only")]
    ReadOnly,
}
