// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rendering pipeline: label state in, draw commands out.
//!
//! [`render`] is a pure function of its input. The host calls it whenever the
//! label set, the categories, the selected category, the tool or the gesture
//! changes, and replays the commands on its drawing surface.

use crate::config::RenderConfig;
use crate::interaction::{Preview, Tool};
use crate::models::category::{color_for_id, position_of, sorted_by_name, Category};
use crate::models::label::{CategoryId, Label, LabelId};
use crate::util::geometry::{is_outside, to_pixel, PixelPoint, PixelRect, Surface};
use crate::util::hit_test::Corner;
use egui::Color32;

/// Outline color of a draft or preview below the minimum size.
pub const ALERT_COLOR: Color32 = Color32::from_rgb(0xFF, 0x00, 0x00);

/// Outline color of a valid draft.
pub const NEUTRAL_COLOR: Color32 = Color32::from_rgb(0xFF, 0xFF, 0xFF);

/// One drawing operation, in surface pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    /// Draw the image stretched over `rect`.
    Image { rect: PixelRect },
    StrokeRect {
        rect: PixelRect,
        color: Color32,
        width: f32,
        dash: Option<f32>,
    },
    FillRect { rect: PixelRect, color: Color32 },
    /// Text whose bottom-left corner is at `pos`.
    Text {
        pos: PixelPoint,
        text: String,
        size: f32,
        color: Color32,
    },
    Circle {
        center: PixelPoint,
        radius: f32,
        color: Color32,
    },
    Line {
        from: PixelPoint,
        to: PixelPoint,
        color: Color32,
        width: f32,
        dash: Option<f32>,
    },
}

/// Snapshot of everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub surface: Surface,
    pub labels: &'a [Label],
    pub categories: &'a [Category],
    pub selected_category: Option<&'a CategoryId>,
    pub tool: Tool,
    pub preview: &'a Preview,
    /// Committed labels replaced by the preview for the current gesture.
    pub hidden: &'a [LabelId],
    /// Labels under the idle pointer.
    pub hovered: &'a [LabelId],
    pub pointer: Option<PixelPoint>,
    /// Minimum label height, used by the text tag heuristic.
    pub min_label_height: f64,
}

fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Produce the draw commands for one frame.
pub fn render(input: &RenderInput<'_>, config: &RenderConfig) -> Vec<DrawCommand> {
    let sorted = sorted_by_name(input.categories);
    let mut commands = vec![
        DrawCommand::Clear,
        DrawCommand::Image {
            rect: input.surface.usable_rect(),
        },
    ];

    let mut visible: Vec<&Label> = input
        .labels
        .iter()
        .filter(|label| !input.hidden.contains(&label.id))
        .collect();
    visible.sort_by_key(|label| {
        label
            .category_id
            .as_deref()
            .and_then(|id| position_of(id, &sorted))
            .unwrap_or(usize::MAX)
    });

    for label in visible {
        let highlighted = input.tool == Tool::Move && input.hovered.contains(&label.id);
        let color = color_for_id(label.category_id.as_deref(), &sorted);
        let style = LabelStyle {
            color,
            dashed: false,
            highlighted,
        };
        draw_label(&mut commands, input, &sorted, label, style, config);
    }

    match input.preview {
        Preview::None => draw_guides(&mut commands, input, &sorted, config),
        Preview::Draft { rect, too_small } => {
            let color = if *too_small { ALERT_COLOR } else { NEUTRAL_COLOR };
            commands.push(DrawCommand::StrokeRect {
                rect: *rect,
                color,
                width: config.stroke_width,
                dash: Some(config.dash_length),
            });
            commands.push(DrawCommand::FillRect {
                rect: *rect,
                color: with_alpha(color, 0x08),
            });
        }
        Preview::Labels(labels) => {
            for preview in labels {
                let color = if preview.too_small {
                    ALERT_COLOR
                } else {
                    color_for_id(preview.label.category_id.as_deref(), &sorted)
                };
                let style = LabelStyle {
                    color,
                    dashed: true,
                    highlighted: true,
                };
                draw_label(&mut commands, input, &sorted, &preview.label, style, config);
            }
        }
    }

    commands
}

#[derive(Debug, Clone, Copy)]
struct LabelStyle {
    color: Color32,
    dashed: bool,
    /// Stronger fill and resize handles.
    highlighted: bool,
}

fn draw_label(
    commands: &mut Vec<DrawCommand>,
    input: &RenderInput<'_>,
    sorted: &[Category],
    label: &Label,
    style: LabelStyle,
    config: &RenderConfig,
) {
    let rect = to_pixel(&input.surface, &label.rect());
    let alpha = if style.highlighted {
        config.highlight_alpha
    } else {
        config.fill_alpha
    };

    commands.push(DrawCommand::StrokeRect {
        rect,
        color: style.color,
        width: config.stroke_width,
        dash: style.dashed.then_some(config.dash_length),
    });
    commands.push(DrawCommand::FillRect {
        rect,
        color: with_alpha(style.color, alpha),
    });

    if let Some(category) = label
        .category_id
        .as_deref()
        .and_then(|id| sorted.iter().find(|c| c.id == id))
    {
        let name = category.display_name();
        let fits = rect.w > config.tag_char_width * name.chars().count() as f64
            && rect.h > input.min_label_height;
        if fits {
            let size = tag_font_size(rect.w, config);
            commands.push(DrawCommand::Text {
                pos: PixelPoint::new(rect.x, rect.y - config.stroke_width as f64),
                text: name,
                size,
                color: style.color,
            });
        }
    }

    if style.highlighted {
        for corner in Corner::ALL {
            commands.push(DrawCommand::Circle {
                center: corner.position(rect.x, rect.y, rect.w, rect.h),
                radius: config.handle_radius,
                color: style.color,
            });
        }
    }
}

/// Tag size scales with the box width. The upper bound wins when the bounds cross.
fn tag_font_size(width: f64, config: &RenderConfig) -> f32 {
    ((width / 10.0) as f32).max(config.min_font_size).min(config.max_font_size)
}

/// Dashed cursor guides through the idle pointer while drawing.
fn draw_guides(
    commands: &mut Vec<DrawCommand>,
    input: &RenderInput<'_>,
    sorted: &[Category],
    config: &RenderConfig,
) {
    let Some(point) = input.pointer else {
        return;
    };
    if input.tool != Tool::Draw || is_outside(&input.surface, point) {
        return;
    }
    let color = input
        .selected_category
        .map(|id| color_for_id(Some(id), sorted))
        .unwrap_or(NEUTRAL_COLOR);
    let area = input.surface.usable_rect();

    commands.push(DrawCommand::Line {
        from: PixelPoint::new(point.x, area.y),
        to: PixelPoint::new(point.x, area.bottom()),
        color,
        width: 1.0,
        dash: Some(config.dash_length),
    });
    commands.push(DrawCommand::Line {
        from: PixelPoint::new(area.x, point.y),
        to: PixelPoint::new(area.right(), point.y),
        color,
        width: 1.0,
        dash: Some(config.dash_length),
    });
}
