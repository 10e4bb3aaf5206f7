// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-image annotation session.
//!
//! An [`AnnotationSession`] owns the in-memory label set of the active image,
//! the interaction state, the history stack and the save guard. Switching
//! images bumps the session generation: gestures are abandoned, history is
//! reseeded and completions of saves issued for the previous image are ignored.

use crate::config::EditorConfig;
use crate::error::SessionError;
use crate::history::HistoryStack;
use crate::interaction::{CursorHint, GestureContext, InteractionState, PointerEvent, PointerOutcome, Tool};
use crate::io::save_worker::{SaveOutcome, SaveRequest, SaveTicket};
use crate::models::{Category, CategoryId, ImageInfo, Label, LabelId};
use crate::render::{render, DrawCommand, RenderInput};
use crate::util::geometry::{PixelPoint, Surface};
use crate::util::hit_test::hovered_ids;
use crate::util::rect::sanitize;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
}

/// How a save completion was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// The saved set was committed to history.
    Committed,
    /// The save failed; nothing changed.
    Failed,
    /// The save belongs to an image or request this session no longer tracks.
    Stale,
}

#[derive(Debug, Clone)]
struct PendingSave {
    ticket: SaveTicket,
    labels: Vec<Label>,
}

/// Bring fetched labels inside the unit square, dropping unusable ones.
pub fn sanitize_labels(labels: Vec<Label>) -> Vec<Label> {
    labels
        .into_iter()
        .filter_map(|label| match sanitize(label.rect()) {
            Some(rect) if rect == label.rect() => Some(label),
            Some(rect) => {
                log::warn!("Clamped out-of-range label {}: {:?} -> {:?}", label.id, label.rect(), rect);
                Some(label.with_rect(rect))
            }
            None => {
                log::warn!("Dropped unusable label {}: {:?}", label.id, label.rect());
                None
            }
        })
        .collect()
}

/// Editing session of one image at a time.
#[derive(Debug)]
pub struct AnnotationSession {
    config: EditorConfig,
    image: Option<ImageInfo>,
    labels: Vec<Label>,
    categories: Vec<Category>,
    selected_category: Option<CategoryId>,
    interaction: InteractionState,
    history: HistoryStack,
    generation: u64,
    pending: Option<PendingSave>,
    notifications: Vec<Notification>,
    read_only: bool,
}

impl AnnotationSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            interaction: InteractionState::new(config.auto_switch),
            config,
            image: None,
            labels: Vec::new(),
            categories: Vec::new(),
            selected_category: None,
            history: HistoryStack::default(),
            generation: 0,
            pending: None,
            notifications: Vec::new(),
            read_only: false,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Make the active image the given one with its fetched labels.
    pub fn open_image(&mut self, image: ImageInfo, fetched: Vec<Label>) {
        self.interaction.reset();
        self.generation += 1;
        if let Some(pending) = self.pending.take() {
            log::info!("Abandoning pending save for {}", pending.ticket.image_id);
        }
        self.labels = sanitize_labels(fetched);
        self.history = HistoryStack::seeded(&self.labels);
        log::info!(
            "Opened image {} ({}x{}) with {} label(s)",
            image.id,
            image.width,
            image.height,
            self.labels.len()
        );
        self.image = Some(image);
    }

    /// Drop the active image, its labels and history.
    pub fn close_image(&mut self) {
        self.interaction.reset();
        self.generation += 1;
        self.pending = None;
        self.labels.clear();
        self.history = HistoryStack::default();
        self.image = None;
    }

    pub fn image(&self) -> Option<&ImageInfo> {
        self.image.as_ref()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Replace the category list supplied by the category provider.
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        if let Some(selected) = &self.selected_category {
            if !categories.iter().any(|c| &c.id == selected) {
                self.selected_category = None;
            }
        }
        self.categories = categories;
    }

    pub fn selected_category(&self) -> Option<&CategoryId> {
        self.selected_category.as_ref()
    }

    /// Category given to newly drawn labels.
    pub fn select_category(&mut self, category_id: Option<CategoryId>) {
        self.selected_category = category_id;
    }

    pub fn tool(&self) -> Tool {
        self.interaction.tool()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.interaction.set_tool(tool);
    }

    pub fn auto_switch(&self) -> bool {
        self.interaction.auto_switch()
    }

    pub fn set_auto_switch(&mut self, enabled: bool) {
        self.interaction.set_auto_switch(enabled);
    }

    pub fn set_drag_disabled(&mut self, disabled: bool) {
        self.interaction.set_drag_disabled(disabled);
    }

    /// Last pointer position seen inside the surface.
    pub fn pointer(&self) -> Option<PixelPoint> {
        self.interaction.pointer()
    }

    /// Block edits and saves, e.g. for a dataset that cannot be written.
    pub fn set_read_only(&mut self, read_only: bool) {
        if read_only {
            self.interaction.reset();
        }
        self.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Drawing surface of the given pixel size with the configured margin.
    pub fn surface(&self, width: f64, height: f64) -> Surface {
        Surface::new(width, height, self.config.canvas.offset)
    }

    /// Feed a pointer event; committed gestures replace the label set.
    pub fn handle_pointer(&mut self, surface: &Surface, event: PointerEvent) -> PointerOutcome {
        if self.image.is_none() || self.read_only {
            return PointerOutcome::None;
        }
        let ctx = GestureContext {
            surface,
            labels: &self.labels,
            category: self.selected_category.as_ref(),
            canvas: &self.config.canvas,
        };
        let outcome = self.interaction.handle(event, &ctx);
        if let PointerOutcome::Committed(labels) = &outcome {
            log::info!("Committed gesture, {} label(s)", labels.len());
            self.labels = labels.clone();
        }
        outcome
    }

    /// Draw commands for the current frame.
    pub fn render(&self, surface: &Surface) -> Vec<DrawCommand> {
        let ctx = GestureContext {
            surface,
            labels: &self.labels,
            category: self.selected_category.as_ref(),
            canvas: &self.config.canvas,
        };
        let preview = self.interaction.preview(&ctx);
        let hidden = self.interaction.preview_targets();
        let hovered = self.interaction.hovered(&ctx);
        let input = RenderInput {
            surface: *surface,
            labels: &self.labels,
            categories: &self.categories,
            selected_category: self.selected_category.as_ref(),
            tool: self.interaction.tool(),
            preview: &preview,
            hidden: &hidden,
            hovered: &hovered,
            pointer: self.interaction.pointer(),
            min_label_height: self.config.canvas.min_label_height,
        };
        render(&input, &self.config.render)
    }

    pub fn cursor_hint(&self, surface: &Surface) -> CursorHint {
        let ctx = GestureContext {
            surface,
            labels: &self.labels,
            category: self.selected_category.as_ref(),
            canvas: &self.config.canvas,
        };
        self.interaction.cursor_hint(&ctx)
    }

    /// Ids of the labels under a point.
    pub fn labels_at(&self, surface: &Surface, point: PixelPoint) -> Vec<LabelId> {
        hovered_ids(surface, point, &self.labels, self.config.canvas.hit_tolerance)
    }

    /// Move the given labels to another category. Returns how many changed.
    pub fn set_category(&mut self, ids: &[LabelId], category_id: &CategoryId) -> usize {
        self.interaction.reset();
        if self.read_only {
            return 0;
        }
        let mut changed = 0;
        for label in self.labels.iter_mut().filter(|l| ids.contains(&l.id)) {
            if label.category_id.as_ref() != Some(category_id) {
                label.category_id = Some(category_id.clone());
                changed += 1;
            }
        }
        log::info!("Re-categorized {} label(s) to {}", changed, category_id);
        changed
    }

    /// Remove the given labels. Returns how many were removed.
    pub fn delete_labels(&mut self, ids: &[LabelId]) -> usize {
        self.interaction.reset();
        if self.read_only {
            return 0;
        }
        let before = self.labels.len();
        self.labels.retain(|label| !ids.contains(&label.id));
        let removed = before - self.labels.len();
        log::info!("Deleted {} label(s), {} left", removed, self.labels.len());
        removed
    }

    pub fn can_step_back(&self) -> bool {
        self.history.can_step_back()
    }

    /// Restore the previous history position. Returns false without history.
    pub fn step_back(&mut self) -> bool {
        self.interaction.reset();
        match self.history.step_back() {
            Some(snapshot) => {
                self.labels = snapshot.to_vec();
                log::info!("Stepped back, {} snapshot(s) left", self.history.len());
                true
            }
            None => false,
        }
    }

    /// True if the label set differs from the last committed snapshot.
    pub fn is_dirty(&self) -> bool {
        self.history.current() != Some(self.labels.as_slice())
    }

    pub fn is_saving(&self) -> bool {
        self.pending.is_some()
    }

    /// Prepare a full-set save of the current labels.
    ///
    /// Only one save may be outstanding; the request must be handed back
    /// through [`finish_save`](Self::finish_save).
    pub fn begin_save(&mut self) -> Result<SaveRequest, SessionError> {
        if self.read_only {
            return Err(SessionError::ReadOnly);
        }
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        if let Some(pending) = &self.pending {
            return Err(SessionError::SaveInFlight {
                image_id: pending.ticket.image_id.clone(),
            });
        }

        let labels = sanitize_labels(self.labels.clone());
        let ticket = SaveTicket {
            image_id: image.id.clone(),
            generation: self.generation,
        };
        log::info!("Saving {} label(s) for {}", labels.len(), ticket.image_id);
        self.pending = Some(PendingSave {
            ticket: ticket.clone(),
            labels: labels.clone(),
        });
        Ok(SaveRequest { ticket, labels })
    }

    /// Apply the outcome of a save started with [`begin_save`](Self::begin_save).
    pub fn finish_save(&mut self, outcome: SaveOutcome) -> SaveStatus {
        let matches = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ticket == outcome.ticket);
        if !matches {
            log::warn!(
                "Ignoring stale save completion for {} (generation {})",
                outcome.ticket.image_id,
                outcome.ticket.generation
            );
            return SaveStatus::Stale;
        }
        let Some(pending) = self.pending.take() else {
            return SaveStatus::Stale;
        };

        match outcome.result {
            Ok(ack) => {
                self.history.push(&pending.labels);
                log::info!("Saved {} label(s) for {}", ack.labels_saved, ack.image_id);
                self.notify(NoticeLevel::Info, "Labels updated".to_string());
                SaveStatus::Committed
            }
            Err(e) => {
                log::error!("Failed to save labels for {}: {}", pending.ticket.image_id, e);
                self.notify(NoticeLevel::Error, format!("Failed to save labels: {e}"));
                SaveStatus::Failed
            }
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notifications.push(Notification { level, message });
    }

    /// Drain the notifications raised since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
