// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the active image and its labels.
//!
//! The canvas fits a drawing surface to the image, forwards egui pointer input
//! to the session as [`PointerEvent`]s and replays the session's draw commands
//! with the egui painter.

use labelisator::interaction::{CursorHint, PointerEvent, PointerOutcome};
use labelisator::models::category::sorted_by_name;
use labelisator::models::{CategoryId, LabelId};
use labelisator::render::DrawCommand;
use labelisator::session::AnnotationSession;
use labelisator::util::geometry::{PixelPoint, PixelRect, Surface};

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// A gesture replaced the label set.
    Committed,
    /// Context menu: move labels to a category.
    SetCategory(Vec<LabelId>, CategoryId),
    /// Context menu: delete labels.
    DeleteLabels(Vec<LabelId>),
}

/// Canvas state that outlives a frame.
#[derive(Default)]
pub struct CanvasState {
    /// Labels under the pointer when the context menu was opened.
    context_targets: Vec<LabelId>,
}

/// Size of a surface whose usable area has the image's aspect ratio and fits
/// inside `available`.
fn fit_surface(available: egui::Vec2, aspect: f32, offset: f32) -> egui::Vec2 {
    let inner = egui::vec2(
        (available.x - 2.0 * offset).max(1.0),
        (available.y - 2.0 * offset).max(1.0),
    );
    let inner_aspect = inner.x / inner.y;

    let (width, height) = if aspect > inner_aspect {
        // Image is wider - fit to width
        (inner.x, inner.x / aspect)
    } else {
        // Image is taller - fit to height
        (inner.y * aspect, inner.y)
    };
    egui::vec2(width + 2.0 * offset, height + 2.0 * offset)
}

fn to_screen(origin: egui::Pos2, point: PixelPoint) -> egui::Pos2 {
    egui::pos2(origin.x + point.x as f32, origin.y + point.y as f32)
}

fn to_screen_rect(origin: egui::Pos2, rect: &PixelRect) -> egui::Rect {
    egui::Rect::from_min_size(
        to_screen(origin, PixelPoint::new(rect.x, rect.y)),
        egui::vec2(rect.w as f32, rect.h as f32),
    )
}

fn cursor_icon(hint: CursorHint) -> egui::CursorIcon {
    match hint {
        CursorHint::Default => egui::CursorIcon::Default,
        CursorHint::Crosshair => egui::CursorIcon::Crosshair,
        CursorHint::Move => egui::CursorIcon::Move,
        CursorHint::ResizeNwSe => egui::CursorIcon::ResizeNwSe,
        CursorHint::ResizeNeSw => egui::CursorIcon::ResizeNeSw,
    }
}

/// Pointer events of this frame, relative to the surface origin.
fn pointer_events(ui: &egui::Ui, surface_rect: egui::Rect, tracked: bool) -> Vec<PointerEvent> {
    ui.input(|i| {
        let Some(pos) = i.pointer.latest_pos() else {
            return if tracked { vec![PointerEvent::Leave] } else { Vec::new() };
        };
        if !surface_rect.contains(pos) && !i.pointer.primary_released() {
            return if tracked { vec![PointerEvent::Leave] } else { Vec::new() };
        }

        let point = PixelPoint::new(
            (pos.x - surface_rect.min.x) as f64,
            (pos.y - surface_rect.min.y) as f64,
        );
        let mut events = Vec::new();
        if i.pointer.delta() != egui::Vec2::ZERO || !tracked {
            events.push(PointerEvent::Move(point));
        }
        if i.pointer.primary_pressed() {
            events.push(PointerEvent::Down(point));
        }
        if i.pointer.primary_released() {
            events.push(PointerEvent::Up(point));
        }
        events
    })
}

/// Display the canvas and handle pointer interaction.
pub fn show(
    ui: &mut egui::Ui,
    session: &mut AnnotationSession,
    state: &mut CanvasState,
    image_texture: &Option<egui::TextureHandle>,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let Some(image) = session.image().cloned() else {
        show_welcome(ui);
        return action;
    };

    let available = ui.available_size();
    let offset = session.config().canvas.offset as f32;
    let size = fit_surface(available, image.aspect_ratio() as f32, offset);
    let surface_rect = egui::Rect::from_min_size(
        ui.min_rect().min + (available - size) / 2.0,
        size,
    );
    let surface: Surface = session.surface(size.x as f64, size.y as f64);

    let response = ui.allocate_rect(surface_rect, egui::Sense::click_and_drag());

    if response.secondary_clicked() {
        state.context_targets = response
            .interact_pointer_pos()
            .map(|pos| {
                let point = PixelPoint::new(
                    (pos.x - surface_rect.min.x) as f64,
                    (pos.y - surface_rect.min.y) as f64,
                );
                session.labels_at(&surface, point)
            })
            .unwrap_or_default();
    }

    let categories = sorted_by_name(session.categories());
    let menu_open = response
        .context_menu(|ui| {
            let targets = state.context_targets.clone();
            let enabled = !targets.is_empty();
            ui.add_enabled_ui(enabled, |ui| {
                ui.menu_button("Category", |ui| {
                    for category in &categories {
                        if ui.button(category.display_name()).clicked() {
                            action = CanvasAction::SetCategory(targets.clone(), category.id.clone());
                            ui.close_menu();
                        }
                    }
                });
                if ui.button(format!("Delete ({})", targets.len())).clicked() {
                    action = CanvasAction::DeleteLabels(targets.clone());
                    ui.close_menu();
                }
            });
        })
        .is_some();
    session.set_drag_disabled(menu_open);

    if !menu_open {
        for event in pointer_events(ui, surface_rect, session.pointer().is_some()) {
            if let PointerOutcome::Committed(_) = session.handle_pointer(&surface, event) {
                action = CanvasAction::Committed;
            }
        }
    }

    if response.hovered() {
        ui.ctx().set_cursor_icon(cursor_icon(session.cursor_hint(&surface)));
    }

    paint(ui.painter(), surface_rect, &session.render(&surface), image_texture);

    action
}

/// Replay draw commands relative to the surface rectangle.
fn paint(
    painter: &egui::Painter,
    surface_rect: egui::Rect,
    commands: &[DrawCommand],
    image_texture: &Option<egui::TextureHandle>,
) {
    let origin = surface_rect.min;
    for command in commands {
        match command {
            DrawCommand::Clear => {
                painter.rect_filled(surface_rect, 0.0, egui::Color32::from_gray(40));
            }
            DrawCommand::Image { rect } => {
                if let Some(texture) = image_texture {
                    painter.image(
                        texture.id(),
                        to_screen_rect(origin, rect),
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
            }
            DrawCommand::StrokeRect {
                rect,
                color,
                width,
                dash,
            } => {
                let r = to_screen_rect(origin, rect);
                let stroke = egui::Stroke::new(*width, *color);
                match dash {
                    Some(length) => {
                        let path = [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom(), r.left_top()];
                        painter.extend(egui::Shape::dashed_line(&path, stroke, *length, *length));
                    }
                    None => {
                        painter.rect_stroke(r, 0.0, stroke);
                    }
                }
            }
            DrawCommand::FillRect { rect, color } => {
                painter.rect_filled(to_screen_rect(origin, rect), 0.0, *color);
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                color,
            } => {
                painter.text(
                    to_screen(origin, *pos),
                    egui::Align2::LEFT_BOTTOM,
                    text,
                    egui::FontId::proportional(*size),
                    *color,
                );
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => {
                painter.circle_filled(to_screen(origin, *center), *radius, *color);
            }
            DrawCommand::Line {
                from,
                to,
                color,
                width,
                dash,
            } => {
                let path = [to_screen(origin, *from), to_screen(origin, *to)];
                let stroke = egui::Stroke::new(*width, *color);
                match dash {
                    Some(length) => {
                        painter.extend(egui::Shape::dashed_line(&path, stroke, *length, *length));
                    }
                    None => {
                        painter.line_segment(path, stroke);
                    }
                }
            }
        }
    }
}

fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("Labelisator")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open a dataset folder to begin labeling")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Dataset...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_surface_keeps_aspect_of_usable_area() {
        let size = fit_surface(egui::vec2(840.0, 440.0), 2.5, 20.0);
        assert_eq!(size, egui::vec2(840.0, 360.0));

        let size = fit_surface(egui::vec2(440.0, 840.0), 0.5, 20.0);
        assert_eq!(size, egui::vec2(440.0, 840.0));
    }
}
