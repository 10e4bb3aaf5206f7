// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Labelisator - bounding-box labeling for image datasets
//!
//! Usage: `labelisator [DATASET_DIR]`. The editor configuration is read from
//! the file named by `LABELISATOR_CONFIG`; `RUST_LOG` overrides its log level.

mod app;
mod ui;

use anyhow::{Context, Result};
use app::LabelisatorApp;
use labelisator::config::{EditorConfig, CONFIG_ENV_VAR};
use std::path::PathBuf;

fn main() -> Result<()> {
    let config = EditorConfig::from_env()
        .with_context(|| format!("Failed to load configuration from ${CONFIG_ENV_VAR}"))?;

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let dataset = std::env::args_os().nth(1).map(PathBuf::from);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Labelisator"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Labelisator",
        options,
        Box::new(move |_cc| Ok(Box::new(LabelisatorApp::new(config, dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
