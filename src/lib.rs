// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Labelisator - interactive bounding-box annotation engine
//!
//! Labels are axis-aligned boxes stored in normalized image coordinates
//! (`[0, 1]` on both axes). The engine maps them onto a pixel drawing surface,
//! turns pointer gestures into drawn, moved and resized labels, keeps a
//! snapshot history per image and serializes saves to a label store.
//!
//! - [`util`]: coordinate mapping, rectangle corrections, hit testing
//! - [`interaction`]: tool modes and the gesture state machine
//! - [`render`]: draw commands for a frame
//! - [`history`]: label-set snapshots
//! - [`session`]: per-image editing session and save guard
//! - [`io`]: label store, background saves, image decoding

pub mod config;
pub mod error;
pub mod history;
pub mod interaction;
pub mod io;
pub mod models;
pub mod render;
pub mod session;
pub mod util;

pub use config::EditorConfig;
pub use error::{SessionError, StoreError};
pub use session::AnnotationSession;
