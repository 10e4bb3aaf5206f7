// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar: tool selection, category selection and save.

use labelisator::interaction::Tool;
use labelisator::models::category::{color_for, sorted_by_name};
use labelisator::session::AnnotationSession;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    Save,
    StepBack,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, session: &mut AnnotationSession, save_running: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");
        ui.separator();

        let tool = session.tool();
        if ui.selectable_label(tool == Tool::Draw, "▭ Draw (A)").clicked() {
            session.set_tool(Tool::Draw);
        }
        if ui.selectable_label(tool == Tool::Move, "✥ Move (Z)").clicked() {
            session.set_tool(Tool::Move);
        }

        let mut auto_switch = session.auto_switch();
        if ui.checkbox(&mut auto_switch, "Auto switch").changed() {
            session.set_auto_switch(auto_switch);
        }

        ui.separator();

        let has_image = session.image().is_some();
        let can_save = has_image && !save_running && !session.is_saving() && !session.is_read_only();
        let save_text = if session.is_dirty() { "💾 Save* (S)" } else { "💾 Save (S)" };
        if ui.add_enabled(can_save, egui::Button::new(save_text)).clicked() {
            action = ToolbarAction::Save;
        }
        if ui
            .add_enabled(has_image, egui::Button::new("⟲ Step back (Ctrl+Z)"))
            .clicked()
        {
            action = ToolbarAction::StepBack;
        }
        if session.is_saving() {
            ui.spinner();
        }

        ui.separator();

        let tool_text = match tool {
            Tool::Draw => "Drag on the image to draw a box",
            Tool::Move => "Drag a box to move it, drag a corner to resize it",
        };
        ui.label(egui::RichText::new(tool_text).italics().weak());
    });

    let categories = sorted_by_name(session.categories());
    if !categories.is_empty() {
        ui.horizontal_wrapped(|ui| {
            ui.label("Category:");
            let selected = session.selected_category().cloned();
            if ui.selectable_label(selected.is_none(), "None").clicked() {
                session.select_category(None);
            }
            for category in &categories {
                let text = egui::RichText::new(category.display_name()).color(color_for(category, &categories));
                let chip = ui
                    .selectable_label(selected.as_ref() == Some(&category.id), text)
                    .on_hover_text(format!("{} label(s)", category.labels_count));
                if chip.clicked() {
                    session.select_category(Some(category.id.clone()));
                }
            }
        });
    }

    action
}
