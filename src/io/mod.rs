// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O: persistence collaborators, background saves and image decoding.

pub mod media;
pub mod save_worker;
pub mod store;
