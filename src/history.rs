// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Snapshot history of a label set.
//!
//! The stack is owned by one editing session and seeded with the labels fetched
//! for its image. Every successful save appends a snapshot.

use crate::models::label::Label;

/// Ordered label-set snapshots, oldest first.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    snapshots: Vec<Vec<Label>>,
}

impl HistoryStack {
    /// A stack holding only the initial label set.
    pub fn seeded(initial: &[Label]) -> Self {
        Self {
            snapshots: vec![initial.to_vec()],
        }
    }

    /// Append a copy of the given label set.
    pub fn push(&mut self, snapshot: &[Label]) {
        self.snapshots.push(snapshot.to_vec());
        log::debug!("History: {} snapshot(s)", self.snapshots.len());
    }

    /// Go back one position and return the label set to restore.
    ///
    /// With a single snapshot that snapshot is replayed; with more, the last
    /// one is discarded and the new last one is returned.
    pub fn step_back(&mut self) -> Option<&[Label]> {
        if self.snapshots.len() > 1 {
            self.snapshots.pop();
        }
        self.snapshots.last().map(Vec::as_slice)
    }

    /// The most recent snapshot.
    pub fn current(&self) -> Option<&[Label]> {
        self.snapshots.last().map(Vec::as_slice)
    }

    /// True if stepping back would restore an older snapshot.
    pub fn can_step_back(&self) -> bool {
        self.snapshots.len() > 1
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
