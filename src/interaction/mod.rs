// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-driven interaction state machine.
//!
//! [`InteractionState`] owns the active tool and the gesture in progress. It
//! consumes [`PointerEvent`]s and reports what changed as a [`PointerOutcome`];
//! a committed gesture yields the complete new label set. Nothing here talks to
//! the persistence service.

pub mod transform;

use crate::config::CanvasConfig;
use crate::models::label::{CategoryId, Label, LabelId};
use crate::util::geometry::{is_outside, PixelPoint, PixelRect, Surface};
use crate::util::hit_test::{find_handle, hovered_ids, is_hovering, Corner, HitParams};
use transform::{draft_to_label, is_below_minimum, rect_below_minimum, resize_labels, translate_labels};

/// Current tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Draw,
    Move,
}

/// Gesture in progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// New box from `anchor` to `current`.
    Drawing {
        anchor: PixelPoint,
        current: PixelPoint,
    },
    /// Dragging the labels in `targets`.
    Translating {
        anchor: PixelPoint,
        current: PixelPoint,
        targets: Vec<LabelId>,
    },
    /// Dragging `corner` of `target`.
    Resizing {
        anchor: PixelPoint,
        current: PixelPoint,
        target: LabelId,
        corner: Corner,
    },
}

impl Gesture {
    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }
}

/// Pointer input, in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(PixelPoint),
    Move(PixelPoint),
    Up(PixelPoint),
    Leave,
}

/// What handling a pointer event changed.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing visible changed.
    None,
    /// Preview, hover or guides changed; the host should redraw.
    Redraw,
    /// The idle pointer caused an automatic tool switch.
    ToolSwitched(Tool),
    /// A gesture finished; this is the complete new label set.
    Committed(Vec<Label>),
    /// A gesture was abandoned without changes.
    Cancelled,
}

/// Everything a gesture needs to know about the world.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub surface: &'a Surface,
    pub labels: &'a [Label],
    /// Category given to newly drawn labels.
    pub category: Option<&'a CategoryId>,
    pub canvas: &'a CanvasConfig,
}

impl GestureContext<'_> {
    fn hit_params(&self) -> HitParams {
        HitParams {
            tolerance: self.canvas.hit_tolerance,
            handle_size: self.canvas.handle_size,
        }
    }
}

/// A label drawn as part of the live preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLabel {
    pub label: Label,
    /// The label is smaller than the minimum size and would be grown on commit.
    pub too_small: bool,
}

/// Live geometry of the gesture in progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Preview {
    #[default]
    None,
    Draft {
        rect: PixelRect,
        too_small: bool,
    },
    Labels(Vec<PreviewLabel>),
}

/// Cursor shape suggested for the pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Crosshair,
    Move,
    ResizeNwSe,
    ResizeNeSw,
}

impl CursorHint {
    fn for_corner(corner: Corner) -> Self {
        match corner {
            Corner::TopLeft | Corner::BottomRight => CursorHint::ResizeNwSe,
            Corner::TopRight | Corner::BottomLeft => CursorHint::ResizeNeSw,
        }
    }
}

/// Tool mode, gesture in progress and last known pointer position.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    tool: Tool,
    gesture: Gesture,
    pointer: Option<PixelPoint>,
    drag_disabled: bool,
    auto_switch: bool,
}

impl InteractionState {
    pub fn new(auto_switch: bool) -> Self {
        Self {
            auto_switch,
            ..Self::default()
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn pointer(&self) -> Option<PixelPoint> {
        self.pointer
    }

    pub fn auto_switch(&self) -> bool {
        self.auto_switch
    }

    pub fn set_auto_switch(&mut self, enabled: bool) {
        self.auto_switch = enabled;
    }

    /// Select a tool explicitly; any gesture in progress is abandoned.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            log::debug!("Tool changed to {:?}", tool);
        }
        self.tool = tool;
        self.reset();
    }

    pub fn drag_disabled(&self) -> bool {
        self.drag_disabled
    }

    /// Suppress gestures, e.g. while another widget owns the drag.
    pub fn set_drag_disabled(&mut self, disabled: bool) {
        self.drag_disabled = disabled;
        if disabled {
            self.reset();
        }
    }

    /// Abandon any gesture in progress.
    pub fn reset(&mut self) {
        if self.gesture.is_active() {
            log::debug!("Gesture abandoned");
        }
        self.gesture = Gesture::Idle;
    }

    /// Ids of committed labels currently shown by the preview instead.
    pub fn preview_targets(&self) -> Vec<LabelId> {
        match &self.gesture {
            Gesture::Translating { targets, .. } => targets.clone(),
            Gesture::Resizing { target, .. } => vec![target.clone()],
            _ => Vec::new(),
        }
    }

    /// Feed one pointer event through the state machine.
    pub fn handle(&mut self, event: PointerEvent, ctx: &GestureContext<'_>) -> PointerOutcome {
        match event {
            PointerEvent::Down(point) => self.pointer_down(point, ctx),
            PointerEvent::Move(point) => self.pointer_move(point, ctx),
            PointerEvent::Up(point) => self.pointer_up(point, ctx),
            PointerEvent::Leave => {
                self.pointer = None;
                if self.gesture.is_active() {
                    self.reset();
                    PointerOutcome::Cancelled
                } else {
                    PointerOutcome::Redraw
                }
            }
        }
    }

    fn pointer_down(&mut self, point: PixelPoint, ctx: &GestureContext<'_>) -> PointerOutcome {
        self.pointer = Some(point);
        if self.drag_disabled || is_outside(ctx.surface, point) {
            return PointerOutcome::None;
        }
        // A down without the matching up (e.g. released outside the window).
        self.reset();

        let tolerance = ctx.canvas.hit_tolerance;
        if let Some((label, corner)) = find_handle(ctx.surface, point, ctx.labels, ctx.hit_params()) {
            log::debug!("Resize {:?} of label {}", corner, label.id);
            self.gesture = Gesture::Resizing {
                anchor: point,
                current: point,
                target: label.id.clone(),
                corner,
            };
        } else if is_hovering(ctx.surface, point, ctx.labels, tolerance) {
            if self.tool != Tool::Move {
                return PointerOutcome::None;
            }
            let targets = hovered_ids(ctx.surface, point, ctx.labels, tolerance);
            log::debug!("Translate {} label(s)", targets.len());
            self.gesture = Gesture::Translating {
                anchor: point,
                current: point,
                targets,
            };
        } else {
            if self.tool != Tool::Draw {
                return PointerOutcome::None;
            }
            log::debug!("Draw from ({:.1}, {:.1})", point.x, point.y);
            self.gesture = Gesture::Drawing {
                anchor: point,
                current: point,
            };
        }
        PointerOutcome::Redraw
    }

    fn pointer_move(&mut self, point: PixelPoint, ctx: &GestureContext<'_>) -> PointerOutcome {
        self.pointer = Some(point);

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing { current, .. }
            | Gesture::Translating { current, .. }
            | Gesture::Resizing { current, .. } => {
                if is_outside(ctx.surface, point) {
                    self.reset();
                    return PointerOutcome::Cancelled;
                }
                *current = point;
                return PointerOutcome::Redraw;
            }
        }

        if self.auto_switch && !self.drag_disabled {
            let hovering = is_hovering(ctx.surface, point, ctx.labels, ctx.canvas.hit_tolerance);
            let wanted = if hovering { Tool::Move } else { Tool::Draw };
            if wanted != self.tool {
                log::debug!("Auto switch to {:?}", wanted);
                self.tool = wanted;
                return PointerOutcome::ToolSwitched(wanted);
            }
        }
        PointerOutcome::Redraw
    }

    fn pointer_up(&mut self, point: PixelPoint, ctx: &GestureContext<'_>) -> PointerOutcome {
        self.pointer = Some(point);
        let gesture = std::mem::take(&mut self.gesture);
        if !gesture.is_active() {
            return PointerOutcome::None;
        }
        if is_outside(ctx.surface, point) {
            log::debug!("Gesture released outside the drawing area");
            return PointerOutcome::Cancelled;
        }

        let labels = match gesture {
            Gesture::Idle => return PointerOutcome::None,
            Gesture::Drawing { anchor, .. } => {
                match draft_to_label(ctx.surface, anchor, point, ctx.category.cloned(), ctx.canvas) {
                    Some(label) => {
                        let mut labels = ctx.labels.to_vec();
                        labels.push(label);
                        labels
                    }
                    None => {
                        log::debug!("Draft below minimum size discarded");
                        return PointerOutcome::Cancelled;
                    }
                }
            }
            Gesture::Translating { anchor, targets, .. } => {
                let moved = translate_labels(ctx.surface, &select(ctx.labels, &targets), point, anchor);
                merge(ctx.labels, moved)
            }
            Gesture::Resizing {
                anchor,
                target,
                corner,
                ..
            } => {
                let resized = resize_labels(
                    ctx.surface,
                    &select(ctx.labels, &[target]),
                    point,
                    anchor,
                    corner,
                    Some(ctx.canvas),
                );
                merge(ctx.labels, resized)
            }
        };

        if labels.as_slice() == ctx.labels {
            PointerOutcome::Redraw
        } else {
            PointerOutcome::Committed(labels)
        }
    }

    /// Live geometry of the current gesture.
    pub fn preview(&self, ctx: &GestureContext<'_>) -> Preview {
        match &self.gesture {
            Gesture::Idle => Preview::None,
            Gesture::Drawing { anchor, current } => {
                let rect = PixelRect::from_corners(*anchor, *current);
                Preview::Draft {
                    rect,
                    too_small: is_below_minimum(rect.w, rect.h, ctx.canvas),
                }
            }
            Gesture::Translating {
                anchor,
                current,
                targets,
            } => Preview::Labels(
                translate_labels(ctx.surface, &select(ctx.labels, targets), *current, *anchor)
                    .into_iter()
                    .map(|label| PreviewLabel {
                        label,
                        too_small: false,
                    })
                    .collect(),
            ),
            Gesture::Resizing {
                anchor,
                current,
                target,
                corner,
            } => Preview::Labels(
                resize_labels(
                    ctx.surface,
                    &select(ctx.labels, std::slice::from_ref(target)),
                    *current,
                    *anchor,
                    *corner,
                    None,
                )
                .into_iter()
                .map(|label| PreviewLabel {
                    too_small: rect_below_minimum(ctx.surface, &label.rect(), ctx.canvas),
                    label,
                })
                .collect(),
            ),
        }
    }

    /// Labels hovered by the idle pointer, for highlighting in the move tool.
    pub fn hovered(&self, ctx: &GestureContext<'_>) -> Vec<LabelId> {
        match (self.pointer, &self.gesture) {
            (Some(point), Gesture::Idle) => {
                hovered_ids(ctx.surface, point, ctx.labels, ctx.canvas.hit_tolerance)
            }
            _ => Vec::new(),
        }
    }

    /// Cursor shape for the current pointer position.
    pub fn cursor_hint(&self, ctx: &GestureContext<'_>) -> CursorHint {
        match &self.gesture {
            Gesture::Drawing { .. } => return CursorHint::Crosshair,
            Gesture::Translating { .. } => return CursorHint::Move,
            Gesture::Resizing { corner, .. } => return CursorHint::for_corner(*corner),
            Gesture::Idle => {}
        }
        let Some(point) = self.pointer else {
            return CursorHint::Default;
        };
        if is_outside(ctx.surface, point) {
            return CursorHint::Default;
        }
        if let Some((_, corner)) = find_handle(ctx.surface, point, ctx.labels, ctx.hit_params()) {
            return CursorHint::for_corner(corner);
        }
        let hovering = is_hovering(ctx.surface, point, ctx.labels, ctx.canvas.hit_tolerance);
        match (self.tool, hovering) {
            (Tool::Move, true) => CursorHint::Move,
            (Tool::Draw, false) => CursorHint::Crosshair,
            _ => CursorHint::Default,
        }
    }
}

/// Labels whose id is in `ids`, in label-set order.
fn select(labels: &[Label], ids: &[LabelId]) -> Vec<Label> {
    labels
        .iter()
        .filter(|label| ids.contains(&label.id))
        .cloned()
        .collect()
}

/// Replace labels in `labels` by their updated versions, keeping the order.
fn merge(labels: &[Label], updated: Vec<Label>) -> Vec<Label> {
    labels
        .iter()
        .map(|label| {
            updated
                .iter()
                .find(|u| u.id == label.id)
                .cloned()
                .unwrap_or_else(|| label.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::label::Rect;

    fn surface() -> Surface {
        Surface::new(400.0, 300.0, 20.0)
    }

    fn p(x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    // Pixel rect: (110, 85) .. (200, 150)
    fn labels() -> Vec<Label> {
        vec![Label::new(Some("c1".to_string()), Rect::new(0.25, 0.25, 0.25, 0.25))]
    }

    fn run(
        state: &mut InteractionState,
        labels: &[Label],
        events: &[PointerEvent],
    ) -> PointerOutcome {
        let s = surface();
        let canvas = CanvasConfig::default();
        let ctx = GestureContext {
            surface: &s,
            labels,
            category: None,
            canvas: &canvas,
        };
        let mut last = PointerOutcome::None;
        for event in events {
            last = state.handle(*event, &ctx);
        }
        last
    }

    #[test]
    fn test_draw_commits_new_label() {
        let mut state = InteractionState::new(false);
        let outcome = run(
            &mut state,
            &[],
            &[
                PointerEvent::Down(p(20.0, 20.0)),
                PointerEvent::Move(p(120.0, 100.0)),
                PointerEvent::Up(p(220.0, 170.0)),
            ],
        );

        let PointerOutcome::Committed(labels) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        assert_eq!(labels.len(), 1);
        assert!((labels[0].w - 200.0 / 360.0).abs() < 1e-6);
        assert_eq!(state.gesture(), &Gesture::Idle);
    }

    #[test]
    fn test_draw_too_small_is_discarded() {
        let mut state = InteractionState::new(false);
        let outcome = run(
            &mut state,
            &[],
            &[PointerEvent::Down(p(50.0, 50.0)), PointerEvent::Up(p(60.0, 200.0))],
        );
        assert_eq!(outcome, PointerOutcome::Cancelled);
    }

    #[test]
    fn test_draw_not_started_on_label_body() {
        let mut state = InteractionState::new(false);
        let labels = labels();
        let outcome = run(&mut state, &labels, &[PointerEvent::Down(p(150.0, 120.0))]);

        assert_eq!(outcome, PointerOutcome::None);
        assert_eq!(state.gesture(), &Gesture::Idle);
    }

    #[test]
    fn test_down_in_margin_is_ignored() {
        let mut state = InteractionState::new(false);
        run(&mut state, &[], &[PointerEvent::Down(p(5.0, 5.0))]);
        assert_eq!(state.gesture(), &Gesture::Idle);
    }

    #[test]
    fn test_handle_starts_resize_in_any_tool() {
        let mut state = InteractionState::new(false);
        let labels = labels();
        run(&mut state, &labels, &[PointerEvent::Down(p(200.0, 150.0))]);

        assert!(matches!(
            state.gesture(),
            Gesture::Resizing {
                corner: Corner::BottomRight,
                ..
            }
        ));
    }

    #[test]
    fn test_translate_in_move_tool() {
        let mut state = InteractionState::new(false);
        state.set_tool(Tool::Move);
        let labels = labels();
        let outcome = run(
            &mut state,
            &labels,
            &[
                PointerEvent::Down(p(150.0, 120.0)),
                PointerEvent::Move(p(186.0, 120.0)),
                PointerEvent::Up(p(186.0, 146.0)),
            ],
        );

        let PointerOutcome::Committed(moved) = outcome else {
            panic!("expected commit, got {outcome:?}");
        };
        assert_eq!(moved[0].id, labels[0].id);
        assert!((moved[0].x - 0.35).abs() < 1e-9);
        assert!((moved[0].y - 0.35).abs() < 1e-9);
        assert_eq!(moved[0].w, 0.25);
    }

    #[test]
    fn test_resize_preview_is_not_corrected() {
        let mut state = InteractionState::new(false);
        let labels = labels();
        let s = surface();
        let canvas = CanvasConfig::default();
        let ctx = GestureContext {
            surface: &s,
            labels: &labels,
            category: None,
            canvas: &canvas,
        };

        state.handle(PointerEvent::Down(p(200.0, 150.0)), &ctx);
        state.handle(PointerEvent::Move(p(114.0, 150.0)), &ctx);

        let Preview::Labels(preview) = state.preview(&ctx) else {
            panic!("expected label preview");
        };
        assert!(preview[0].too_small);
        assert!((preview[0].label.w * 360.0 - 4.0).abs() < 1e-9);
        assert_eq!(state.preview_targets(), vec![labels[0].id.clone()]);

        let PointerOutcome::Committed(committed) = state.handle(PointerEvent::Up(p(114.0, 150.0)), &ctx)
        else {
            panic!("expected commit");
        };
        assert!((committed[0].w * 360.0 - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_leaving_usable_area_resets() {
        let mut state = InteractionState::new(false);
        let outcome = run(
            &mut state,
            &[],
            &[PointerEvent::Down(p(50.0, 50.0)), PointerEvent::Move(p(395.0, 100.0))],
        );
        assert_eq!(outcome, PointerOutcome::Cancelled);
        assert_eq!(state.gesture(), &Gesture::Idle);

        let outcome = run(
            &mut state,
            &[],
            &[PointerEvent::Down(p(50.0, 50.0)), PointerEvent::Leave],
        );
        assert_eq!(outcome, PointerOutcome::Cancelled);
    }

    #[test]
    fn test_drag_disabled_suppresses_gestures() {
        let mut state = InteractionState::new(false);
        state.set_drag_disabled(true);
        run(&mut state, &[], &[PointerEvent::Down(p(50.0, 50.0))]);
        assert_eq!(state.gesture(), &Gesture::Idle);
    }

    #[test]
    fn test_auto_switch_follows_hover() {
        let mut state = InteractionState::new(true);
        let labels = labels();

        let outcome = run(&mut state, &labels, &[PointerEvent::Move(p(150.0, 120.0))]);
        assert_eq!(outcome, PointerOutcome::ToolSwitched(Tool::Move));

        let outcome = run(&mut state, &labels, &[PointerEvent::Move(p(300.0, 250.0))]);
        assert_eq!(outcome, PointerOutcome::ToolSwitched(Tool::Draw));
    }

    #[test]
    fn test_cursor_hints() {
        let mut state = InteractionState::new(false);
        let labels = labels();
        let s = surface();
        let canvas = CanvasConfig::default();
        let ctx = GestureContext {
            surface: &s,
            labels: &labels,
            category: None,
            canvas: &canvas,
        };

        state.handle(PointerEvent::Move(p(300.0, 250.0)), &ctx);
        assert_eq!(state.cursor_hint(&ctx), CursorHint::Crosshair);

        state.handle(PointerEvent::Move(p(200.0, 85.0)), &ctx);
        assert_eq!(state.cursor_hint(&ctx), CursorHint::ResizeNeSw);

        state.set_tool(Tool::Move);
        state.handle(PointerEvent::Move(p(150.0, 120.0)), &ctx);
        assert_eq!(state.cursor_hint(&ctx), CursorHint::Move);
    }
}
