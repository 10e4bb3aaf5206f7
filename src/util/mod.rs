// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometry utilities: coordinate mapping, rectangle corrections and hit testing.

pub mod geometry;
pub mod rect;
