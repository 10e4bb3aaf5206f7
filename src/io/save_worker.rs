// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background execution of label saves.
//!
//! Each submitted request runs on its own thread; results come back over a
//! channel and are collected by polling from the UI loop.

use super::store::{LabelStore, SaveAck};
use crate::error::StoreError;
use crate::models::Label;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Identifies which image, in which session generation, a save belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub image_id: String,
    pub generation: u64,
}

/// A full label-set replace to send to the store.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub ticket: SaveTicket,
    pub labels: Vec<Label>,
}

/// Result of a save, tagged with its ticket.
#[derive(Debug)]
pub struct SaveOutcome {
    pub ticket: SaveTicket,
    pub result: Result<SaveAck, StoreError>,
}

/// Runs saves against a [`LabelStore`] off the UI thread.
pub struct SaveWorker {
    store: Arc<dyn LabelStore>,
    sender: Sender<SaveOutcome>,
    receiver: Receiver<SaveOutcome>,
    in_flight: usize,
}

impl SaveWorker {
    pub fn new(store: Arc<dyn LabelStore>) -> Self {
        let (sender, receiver) = channel();
        Self {
            store,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Number of submitted saves whose outcome has not been collected yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start a save in the background.
    pub fn submit(&mut self, request: SaveRequest) {
        let store = Arc::clone(&self.store);
        let sender = self.sender.clone();
        self.in_flight += 1;
        log::debug!(
            "Submitting save of {} label(s) for {}",
            request.labels.len(),
            request.ticket.image_id
        );

        std::thread::spawn(move || {
            let result = store.replace_labels(&request.ticket.image_id, &request.labels);
            let _ = sender.send(SaveOutcome {
                ticket: request.ticket,
                result,
            });
        });
    }

    /// Collect every outcome that is ready, without blocking.
    pub fn poll(&mut self) -> Vec<SaveOutcome> {
        let outcomes: Vec<SaveOutcome> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }

    /// Block until the next outcome arrives or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<SaveOutcome> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
