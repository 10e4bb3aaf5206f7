// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label categories and their display colors.
//!
//! A category's color is not stored: it is derived from the category's
//! position in the name-sorted category list, indexed into a fixed palette.

use super::label::CategoryId;
use egui::Color32;
use serde::{Deserialize, Serialize};

/// A named class that labels belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub supercategory: String,
    #[serde(default)]
    pub labels_count: u64,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: String::new(),
            labels_count: 0,
        }
    }

    /// Display form of the name, first letter upper-cased.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Color used for labels without a known category.
pub const FALLBACK_COLOR: Color32 = Color32::from_rgb(0, 0, 0);

/// Fixed category palette.
pub const PALETTE: [Color32; 16] = [
    Color32::from_rgb(0xF4, 0x43, 0x36),
    Color32::from_rgb(0x21, 0x96, 0xF3),
    Color32::from_rgb(0x4C, 0xAF, 0x50),
    Color32::from_rgb(0xFF, 0x98, 0x00),
    Color32::from_rgb(0x9C, 0x27, 0xB0),
    Color32::from_rgb(0x00, 0xBC, 0xD4),
    Color32::from_rgb(0xFF, 0xEB, 0x3B),
    Color32::from_rgb(0xE9, 0x1E, 0x63),
    Color32::from_rgb(0x3F, 0x51, 0xB5),
    Color32::from_rgb(0x8B, 0xC3, 0x4A),
    Color32::from_rgb(0xFF, 0x57, 0x22),
    Color32::from_rgb(0x67, 0x3A, 0xB7),
    Color32::from_rgb(0x00, 0x96, 0x88),
    Color32::from_rgb(0xCD, 0xDC, 0x39),
    Color32::from_rgb(0x79, 0x55, 0x48),
    Color32::from_rgb(0x60, 0x7D, 0x8B),
];

/// Return a copy of the categories sorted by name (ties broken by id).
pub fn sorted_by_name(categories: &[Category]) -> Vec<Category> {
    let mut sorted = categories.to_vec();
    sorted.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    sorted
}

/// Position of a category in an already sorted list.
pub fn position_of(category_id: &str, sorted: &[Category]) -> Option<usize> {
    sorted.iter().position(|c| c.id == category_id)
}

/// Display color of `category`, given the name-sorted category list.
pub fn color_for(category: &Category, sorted: &[Category]) -> Color32 {
    match position_of(&category.id, sorted) {
        Some(index) => PALETTE[index % PALETTE.len()],
        None => FALLBACK_COLOR,
    }
}

/// Display color of an optional category id.
pub fn color_for_id(category_id: Option<&str>, sorted: &[Category]) -> Color32 {
    category_id
        .and_then(|id| position_of(id, sorted))
        .map(|index| PALETTE[index % PALETTE.len()])
        .unwrap_or(FALLBACK_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        vec![
            Category::new("c3", "zebra"),
            Category::new("c1", "car"),
            Category::new("c2", "person"),
        ]
    }

    #[test]
    fn test_color_follows_sorted_position() {
        let sorted = sorted_by_name(&categories());
        assert_eq!(sorted[0].name, "car");

        let zebra = Category::new("c3", "zebra");
        assert_eq!(color_for(&zebra, &sorted), PALETTE[2]);
        assert_eq!(color_for(&sorted[0], &sorted), PALETTE[0]);
    }

    #[test]
    fn test_color_is_independent_of_input_order() {
        let mut shuffled = categories();
        shuffled.reverse();
        let a = sorted_by_name(&categories());
        let b = sorted_by_name(&shuffled);

        for category in &a {
            assert_eq!(color_for(category, &a), color_for(category, &b));
        }
    }

    #[test]
    fn test_unknown_category_uses_fallback() {
        let sorted = sorted_by_name(&categories());
        assert_eq!(color_for(&Category::new("nope", "ghost"), &sorted), FALLBACK_COLOR);
        assert_eq!(color_for_id(None, &sorted), FALLBACK_COLOR);
    }

    #[test]
    fn test_palette_wraps() {
        let many: Vec<Category> = (0..20)
            .map(|i| Category::new(format!("id{i:02}"), format!("name{i:02}")))
            .collect();
        let sorted = sorted_by_name(&many);
        assert_eq!(color_for(&sorted[16], &sorted), PALETTE[0]);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Category::new("1", "person").display_name(), "Person");
        assert_eq!(Category::new("2", "").display_name(), "");
    }
}
