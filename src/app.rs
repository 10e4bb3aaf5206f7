// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The app owns the dataset store, the save worker and the annotation
//! session. Images are decoded and their labels fetched on a background
//! thread; saves run on the save worker and are collected every frame.

use crate::ui::{canvas, toolbar};
use labelisator::config::EditorConfig;
use labelisator::error::StoreError;
use labelisator::interaction::Tool;
use labelisator::io::media::{load_image, LoadedImage};
use labelisator::io::save_worker::SaveWorker;
use labelisator::io::store::{CategoryProvider, FileLabelStore, LabelStore};
use labelisator::models::{ImageInfo, Label};
use labelisator::session::{AnnotationSession, NoticeLevel, Notification, SaveStatus};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// How long closing a dataset waits for each outstanding save.
const SAVE_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a background image load.
struct LoadedFrame {
    index: usize,
    image: ImageInfo,
    pixels: LoadedImage,
    labels: Vec<Label>,
}

/// An opened dataset folder.
struct Dataset {
    store: Arc<FileLabelStore>,
    worker: SaveWorker,
    images: Vec<ImageInfo>,
}

impl Drop for Dataset {
    fn drop(&mut self) {
        while self.worker.in_flight() > 0 {
            match self.worker.wait(SAVE_FLUSH_TIMEOUT) {
                Some(outcome) => {
                    if let Err(e) = outcome.result {
                        log::error!("Save for {} failed while closing: {}", outcome.ticket.image_id, e);
                    }
                }
                None => {
                    log::warn!("Closing with {} save(s) still running", self.worker.in_flight());
                    break;
                }
            }
        }
    }
}

/// Main application state.
pub struct LabelisatorApp {
    dataset: Option<Dataset>,

    /// Index of the image shown by the session
    current: Option<usize>,

    session: AnnotationSession,
    canvas_state: canvas::CanvasState,

    /// Texture of the current image
    image_texture: Option<egui::TextureHandle>,

    /// Receiver for background image loading
    image_loader: Option<Receiver<Result<LoadedFrame, StoreError>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last notification shown in the status bar
    status: Option<Notification>,
}

impl LabelisatorApp {
    pub fn new(config: EditorConfig, dataset: Option<PathBuf>) -> Self {
        let mut app = Self {
            dataset: None,
            current: None,
            session: AnnotationSession::new(config),
            canvas_state: canvas::CanvasState::default(),
            image_texture: None,
            image_loader: None,
            loading_message: None,
            status: None,
        };
        if let Some(path) = dataset {
            app.open_dataset(path);
        }
        app
    }

    fn set_status(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.status = Some(Notification {
            level,
            message: message.into(),
        });
    }

    /// Open a dataset folder and show its first image.
    fn open_dataset(&mut self, path: PathBuf) {
        let store = Arc::new(FileLabelStore::new(&path));
        let images = match store.list_images() {
            Ok(images) => images,
            Err(e) => {
                log::error!("Failed to open dataset {}: {}", path.display(), e);
                self.set_status(NoticeLevel::Error, format!("Failed to open dataset: {e}"));
                return;
            }
        };
        log::info!("Opened dataset {} with {} image(s)", path.display(), images.len());

        match store.categories() {
            Ok(categories) => self.session.set_categories(categories),
            Err(e) => {
                log::error!("Failed to read categories: {}", e);
                self.set_status(NoticeLevel::Error, format!("Failed to read categories: {e}"));
            }
        }

        self.session.close_image();
        self.image_texture = None;
        self.current = None;

        let read_only = std::fs::metadata(&path)
            .map(|m| m.permissions().readonly())
            .unwrap_or(false);
        self.session.set_read_only(read_only);
        if read_only {
            log::warn!("Dataset {} is not writable, editing disabled", path.display());
        }

        let has_images = !images.is_empty();
        self.dataset = Some(Dataset {
            worker: SaveWorker::new(store.clone()),
            store,
            images,
        });

        if has_images {
            self.load_image_at(0);
        } else {
            self.set_status(NoticeLevel::Info, "The dataset contains no images");
        }
        if read_only {
            self.set_status(NoticeLevel::Info, "Read-only dataset: labels cannot be edited");
        }
    }

    /// Decode an image and fetch its labels (asynchronously).
    fn load_image_at(&mut self, index: usize) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let Some(image) = dataset.images.get(index).cloned() else {
            return;
        };
        let store = Arc::clone(&dataset.store);

        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some(format!("Loading {}...", image.id));

        std::thread::spawn(move || {
            let result = (|| -> Result<LoadedFrame, StoreError> {
                let path = store.image_path(&image.id)?;
                let pixels = load_image(&path)?;
                let labels = store.fetch_labels(&image.id)?;
                Ok(LoadedFrame {
                    index,
                    image,
                    pixels,
                    labels,
                })
            })();

            let _ = sender.send(result);
        });
    }

    /// Move to the next (`+1`) or previous (`-1`) image.
    fn navigate(&mut self, step: isize) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let count = dataset.images.len();
        if count == 0 || self.image_loader.is_some() {
            return;
        }
        let current = self.current.unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(count as isize) as usize;
        if Some(next) == self.current {
            return;
        }
        if self.session.is_dirty() {
            log::info!("Leaving image with unsaved changes");
        }
        self.load_image_at(next);
    }

    fn save(&mut self) {
        let in_flight = match &self.dataset {
            Some(dataset) => dataset.worker.in_flight(),
            None => return,
        };
        if in_flight > 0 {
            self.set_status(NoticeLevel::Info, "A save is still running");
            return;
        }
        match self.session.begin_save() {
            Ok(request) => {
                if let Some(dataset) = &mut self.dataset {
                    dataset.worker.submit(request);
                }
            }
            Err(e) => {
                log::warn!("Save refused: {}", e);
                self.set_status(NoticeLevel::Error, e.to_string());
            }
        }
    }

    fn step_back(&mut self) {
        if self.session.step_back() {
            self.set_status(NoticeLevel::Info, "Stepped back");
        }
    }

    fn poll_loader(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.image_loader else {
            return;
        };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                log::error!("Image loader stopped without a result");
                self.image_loader = None;
                self.loading_message = None;
                return;
            }
        };
        self.image_loader = None;
        self.loading_message = None;

        match result {
            Ok(frame) => {
                let size = [frame.pixels.width as usize, frame.pixels.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels.pixels);
                let texture = ctx.load_texture(frame.image.id.clone(), color_image, egui::TextureOptions::LINEAR);

                self.image_texture = Some(texture);
                self.current = Some(frame.index);
                self.session.open_image(frame.image, frame.labels);
            }
            Err(e) => {
                log::error!("Failed to load image: {}", e);
                self.set_status(NoticeLevel::Error, format!("Failed to load image: {e}"));
            }
        }
    }

    fn poll_saves(&mut self) {
        let Some(dataset) = &mut self.dataset else {
            return;
        };
        let mut counts_changed = false;
        for outcome in dataset.worker.poll() {
            let changed = outcome
                .result
                .as_ref()
                .is_ok_and(|ack| !ack.count_deltas.is_empty());
            if self.session.finish_save(outcome) == SaveStatus::Committed && changed {
                counts_changed = true;
            }
        }
        if counts_changed {
            match dataset.store.categories() {
                Ok(categories) => self.session.set_categories(categories),
                Err(e) => log::warn!("Failed to re-read categories: {}", e),
            }
        }
        if let Some(last) = self.session.take_notifications().pop() {
            self.status = Some(last);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (draw, move_tool, save, step_back, prev, next) = ctx.input(|i| {
            let plain = !i.modifiers.command;
            (
                plain && i.key_pressed(egui::Key::A),
                plain && i.key_pressed(egui::Key::Z),
                plain && i.key_pressed(egui::Key::S),
                i.modifiers.command && i.key_pressed(egui::Key::Z),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
            )
        });

        if draw {
            self.session.set_tool(Tool::Draw);
        }
        if move_tool {
            self.session.set_tool(Tool::Move);
        }
        if save {
            self.save();
        }
        if step_back {
            self.step_back();
        }
        if prev {
            self.navigate(-1);
        }
        if next {
            self.navigate(1);
        }
    }
}

impl eframe::App for LabelisatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader(ctx);
        self.poll_saves();

        let saving = self
            .dataset
            .as_ref()
            .is_some_and(|d| d.worker.in_flight() > 0);
        if self.loading_message.is_some() || saving {
            ctx.request_repaint();
        }

        self.handle_shortcuts(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Dataset...").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.open_dataset(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Save (S)").clicked() {
                        self.save();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let has_image = self.session.image().is_some();
                    if ui.add_enabled(has_image, egui::Button::new("Step back (Ctrl+Z)")).clicked() {
                        self.step_back();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Image", |ui| {
                    if ui.button("Previous (←)").clicked() {
                        self.navigate(-1);
                        ui.close_menu();
                    }
                    if ui.button("Next (→)").clicked() {
                        self.navigate(1);
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &mut self.session, saving))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::Save => self.save(),
            toolbar::ToolbarAction::StepBack => self.step_back(),
            toolbar::ToolbarAction::None => {}
        }

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match (&self.dataset, self.current, self.session.image()) {
                    (Some(dataset), Some(index), Some(image)) => {
                        ui.label(format!("Image {}/{}: {}", index + 1, dataset.images.len(), image.id));
                        ui.separator();
                        ui.label(format!("{} label(s)", self.session.labels().len()));
                        if self.session.is_dirty() {
                            ui.separator();
                            ui.label(egui::RichText::new("unsaved").italics());
                        }
                    }
                    _ => {
                        ui.label("No image loaded");
                    }
                }
                if let Some(status) = &self.status {
                    ui.separator();
                    let color = match status.level {
                        NoticeLevel::Info => egui::Color32::from_gray(200),
                        NoticeLevel::Error => egui::Color32::from_rgb(0xFF, 0x60, 0x60),
                    };
                    ui.label(egui::RichText::new(&status.message).color(color));
                }
            });
        });

        // Main canvas (center)
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    if self.session.image().is_none() {
                        ui.centered_and_justified(|ui| {
                            ui.vertical_centered(|ui| {
                                ui.add_space(20.0);
                                ui.spinner();
                                ui.add_space(10.0);
                                ui.label(
                                    egui::RichText::new(message)
                                        .size(16.0)
                                        .color(egui::Color32::from_gray(200)),
                                );
                            });
                        });
                        return canvas::CanvasAction::None;
                    }
                }
                canvas::show(ui, &mut self.session, &mut self.canvas_state, &self.image_texture)
            })
            .inner;

        match canvas_action {
            canvas::CanvasAction::SetCategory(ids, category_id) => {
                self.session.set_category(&ids, &category_id);
            }
            canvas::CanvasAction::DeleteLabels(ids) => {
                self.session.delete_labels(&ids);
            }
            canvas::CanvasAction::Committed => {
                // Info notices describe the set before this edit.
                if self.status.as_ref().is_some_and(|s| s.level == NoticeLevel::Info) {
                    self.status = None;
                }
            }
            canvas::CanvasAction::None => {}
        }
    }
}
