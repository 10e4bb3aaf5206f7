// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persistence collaborators.
//!
//! [`LabelStore`] is the image/label persistence service: labels are fetched
//! per image and saved as a full replace of the image's label set.
//! [`CategoryProvider`] supplies the category list. [`FileLabelStore`]
//! implements both over a dataset directory:
//!
//! ```text
//! dataset/
//!   categories.yaml      category list
//!   labels/<image>.json  {"labels": [...]} per image
//!   *.jpg, *.png, ...    images
//! ```

use crate::error::StoreError;
use crate::models::{Category, CategoryId, ImageInfo, Label, LabelsDocument};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Image file extensions recognized in a dataset directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// Acknowledgement of a successful full-set replace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveAck {
    pub image_id: String,
    pub labels_saved: usize,
    /// Change of each category's label count caused by the save.
    pub count_deltas: HashMap<CategoryId, i64>,
}

/// Image/label persistence service.
pub trait LabelStore: Send + Sync {
    /// Labels currently stored for an image.
    fn fetch_labels(&self, image_id: &str) -> Result<Vec<Label>, StoreError>;

    /// Replace every label of an image with `labels`.
    fn replace_labels(&self, image_id: &str, labels: &[Label]) -> Result<SaveAck, StoreError>;
}

/// Read-only source of the category list.
pub trait CategoryProvider {
    fn categories(&self) -> Result<Vec<Category>, StoreError>;
}

fn category_counts(labels: &[Label]) -> HashMap<CategoryId, i64> {
    let mut counts = HashMap::new();
    for category_id in labels.iter().filter_map(|l| l.category_id.clone()) {
        *counts.entry(category_id).or_insert(0) += 1;
    }
    counts
}

/// Per-category difference `after - before`, without zero entries.
fn count_deltas(before: &[Label], after: &[Label]) -> HashMap<CategoryId, i64> {
    let before = category_counts(before);
    let mut deltas = category_counts(after);
    for (id, count) in before {
        *deltas.entry(id).or_insert(0) -= count;
    }
    deltas.retain(|_, delta| *delta != 0);
    deltas
}

/// Label store backed by a dataset directory.
#[derive(Debug, Clone)]
pub struct FileLabelStore {
    root: PathBuf,
}

impl FileLabelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn labels_path(&self, image_id: &str) -> PathBuf {
        self.root.join("labels").join(format!("{image_id}.json"))
    }

    fn categories_path(&self) -> PathBuf {
        self.root.join("categories.yaml")
    }

    /// Path of an image file of the dataset.
    pub fn image_path(&self, image_id: &str) -> Result<PathBuf, StoreError> {
        let path = self.root.join(image_id);
        if path.is_file() {
            Ok(path)
        } else {
            Err(StoreError::ImageNotFound {
                id: image_id.to_string(),
            })
        }
    }

    /// Images of the dataset, sorted by id.
    pub fn list_images(&self) -> Result<Vec<ImageInfo>, StoreError> {
        let mut images = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false);
            if !is_image {
                continue;
            }
            let Some(id) = path.file_name().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            match image::image_dimensions(&path) {
                Ok((width, height)) => {
                    images.push(ImageInfo::new(id, path.to_string_lossy(), width, height));
                }
                Err(e) => log::warn!("Skipping unreadable image {}: {}", path.display(), e),
            }
        }
        images.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(images)
    }

    /// Write through a sibling `<name>.tmp` file renamed over `path`.
    fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Serialized `categories.yaml` with `deltas` applied, or `None` when
    /// there is nothing to update.
    fn updated_categories(&self, deltas: &HashMap<CategoryId, i64>) -> Result<Option<String>, StoreError> {
        if deltas.is_empty() || !self.categories_path().exists() {
            return Ok(None);
        }
        let mut categories = self.categories()?;
        for category in &mut categories {
            if let Some(delta) = deltas.get(&category.id) {
                category.labels_count = (category.labels_count as i64 + delta).max(0) as u64;
            }
        }
        Ok(Some(serde_yaml::to_string(&categories)?))
    }
}

impl LabelStore for FileLabelStore {
    fn fetch_labels(&self, image_id: &str) -> Result<Vec<Label>, StoreError> {
        let path = self.labels_path(image_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&path)?;
        let doc: LabelsDocument = serde_json::from_str(&json)?;
        log::debug!("Fetched {} label(s) for {}", doc.labels.len(), image_id);
        Ok(doc.labels)
    }

    fn replace_labels(&self, image_id: &str, labels: &[Label]) -> Result<SaveAck, StoreError> {
        let previous = self.fetch_labels(image_id)?;
        let doc = LabelsDocument {
            labels: labels.to_vec(),
        };
        let json = serde_json::to_string_pretty(&doc)?;

        // Everything that can be rejected is checked before the first write.
        let deltas = count_deltas(&previous, labels);
        let categories = self.updated_categories(&deltas)?;

        Self::write_atomic(&self.labels_path(image_id), &json)?;
        log::info!("Stored {} label(s) for {}", labels.len(), image_id);

        if let Some(yaml) = categories {
            if let Err(e) = Self::write_atomic(&self.categories_path(), &yaml) {
                log::warn!("Stored labels for {} but category counts were not updated: {}", image_id, e);
            }
        }

        Ok(SaveAck {
            image_id: image_id.to_string(),
            labels_saved: labels.len(),
            count_deltas: deltas,
        })
    }
}

impl CategoryProvider for FileLabelStore {
    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let path = self.categories_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let yaml = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&yaml)?)
    }
}

/// In-memory label store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryLabelStore {
    labels: Mutex<HashMap<String, Vec<Label>>>,
    categories: Vec<Category>,
    failing: AtomicBool,
}

impl MemoryLabelStore {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    /// Make every subsequent save fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn insert(&self, image_id: &str, labels: Vec<Label>) {
        if let Ok(mut map) = self.labels.lock() {
            map.insert(image_id.to_string(), labels);
        }
    }
}

impl LabelStore for MemoryLabelStore {
    fn fetch_labels(&self, image_id: &str) -> Result<Vec<Label>, StoreError> {
        let map = self
            .labels
            .lock()
            .map_err(|_| std::io::Error::other("label store lock poisoned"))?;
        Ok(map.get(image_id).cloned().unwrap_or_default())
    }

    fn replace_labels(&self, image_id: &str, labels: &[Label]) -> Result<SaveAck, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("store unavailable").into());
        }
        let mut map = self
            .labels
            .lock()
            .map_err(|_| std::io::Error::other("label store lock poisoned"))?;
        let previous = map.insert(image_id.to_string(), labels.to_vec()).unwrap_or_default();

        Ok(SaveAck {
            image_id: image_id.to_string(),
            labels_saved: labels.len(),
            count_deltas: count_deltas(&previous, labels),
        })
    }
}

impl CategoryProvider for MemoryLabelStore {
    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.categories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rect;

    fn label(category: &str) -> Label {
        Label::new(Some(category.to_string()), Rect::new(0.1, 0.1, 0.2, 0.2))
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLabelStore::new(dir.path());

        assert!(store.fetch_labels("a.png").unwrap().is_empty());

        let labels = vec![label("cat"), label("dog")];
        let ack = store.replace_labels("a.png", &labels).unwrap();
        assert_eq!(ack.labels_saved, 2);
        assert_eq!(store.fetch_labels("a.png").unwrap(), labels);
    }

    #[test]
    fn test_file_store_full_replace() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLabelStore::new(dir.path());

        store.replace_labels("a.png", &[label("cat"), label("cat")]).unwrap();
        let ack = store.replace_labels("a.png", &[label("dog")]).unwrap();

        assert_eq!(store.fetch_labels("a.png").unwrap().len(), 1);
        assert_eq!(ack.count_deltas.get("cat"), Some(&-2));
        assert_eq!(ack.count_deltas.get("dog"), Some(&1));
    }

    #[test]
    fn test_file_store_updates_category_counts() {
        let dir = tempfile::tempdir().unwrap();
        let categories = vec![Category::new("cat", "cat"), Category::new("dog", "dog")];
        std::fs::write(
            dir.path().join("categories.yaml"),
            serde_yaml::to_string(&categories).unwrap(),
        )
        .unwrap();
        let store = FileLabelStore::new(dir.path());

        store.replace_labels("a.png", &[label("cat"), label("cat")]).unwrap();
        let counts: Vec<u64> = store.categories().unwrap().iter().map(|c| c.labels_count).collect();
        assert_eq!(counts, vec![2, 0]);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .chain(std::fs::read_dir(dir.path().join("labels")).unwrap())
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_corrupt_categories_reject_save_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLabelStore::new(dir.path());
        let stored = vec![label("cat")];
        store.replace_labels("a.png", &stored).unwrap();

        std::fs::write(dir.path().join("categories.yaml"), "::: not yaml [").unwrap();

        let result = store.replace_labels("a.png", &[label("dog"), label("dog")]);
        assert!(matches!(result, Err(StoreError::Yaml(_))));
        assert_eq!(store.fetch_labels("a.png").unwrap(), stored);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("categories.yaml")).unwrap(),
            "::: not yaml ["
        );
    }

    #[test]
    fn test_unchanged_counts_skip_categories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLabelStore::new(dir.path());
        std::fs::write(dir.path().join("categories.yaml"), "::: not yaml [").unwrap();

        // Same category counts before and after: the category file is not read.
        store.replace_labels("a.png", &[]).unwrap();
        assert!(store.fetch_labels("a.png").unwrap().is_empty());
    }

    #[test]
    fn test_list_images_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::new(4, 3).save(dir.path().join("b.png")).unwrap();
        image::RgbImage::new(2, 2).save(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let store = FileLabelStore::new(dir.path());
        let images = store.list_images().unwrap();

        let ids: Vec<&str> = images.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a.png", "b.png"]);
        assert_eq!((images[1].width, images[1].height), (4, 3));
        assert!(store.image_path("a.png").is_ok());
        assert!(matches!(
            store.image_path("missing.png"),
            Err(StoreError::ImageNotFound { .. })
        ));
    }

    #[test]
    fn test_memory_store_failure() {
        let store = MemoryLabelStore::default();
        store.set_failing(true);
        assert!(store.replace_labels("x", &[label("cat")]).is_err());
        store.set_failing(false);
        assert!(store.replace_labels("x", &[label("cat")]).is_ok());
        assert_eq!(store.fetch_labels("x").unwrap().len(), 1);
    }
}
