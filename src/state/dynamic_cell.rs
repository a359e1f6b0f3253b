//! Embedded widget draft.
//!
//! A dynamic cell's source is either a built-in gallery entry or a custom
//! URL. Non-empty custom text always wins over the last gallery pick.

#[cfg(test)]
#[path = "dynamic_cell_test.rs"]
mod dynamic_cell_test;

use super::ValidationError;
use crate::net::types::{CellContent, CellDraft, DynamicContent};

/// Dynamic cells are created 2x2.
pub const DYNAMIC_CELL_SIZE: u32 = 2;

/// One built-in widget offered in the gallery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryEntry {
    pub name: String,
    pub src: String,
}

impl GalleryEntry {
    #[must_use]
    pub fn new(name: &str, src: &str) -> Self {
        Self { name: name.to_owned(), src: src.to_owned() }
    }
}

/// Widgets served by the backend itself.
#[must_use]
pub fn builtin_gallery() -> Vec<GalleryEntry> {
    vec![
        GalleryEntry::new("mininote", "/cells/mininote"),
        GalleryEntry::new("weather", "/cells/weather"),
    ]
}

#[derive(Clone, Debug)]
pub struct DynamicCellBuilder {
    gallery: Vec<GalleryEntry>,
    last_selected: Option<String>,
    custom: String,
    preview_src: String,
}

impl DynamicCellBuilder {
    #[must_use]
    pub fn new(gallery: Vec<GalleryEntry>) -> Self {
        Self { gallery, last_selected: None, custom: String::new(), preview_src: String::new() }
    }

    #[must_use]
    pub fn gallery(&self) -> &[GalleryEntry] {
        &self.gallery
    }

    /// Pick a gallery entry. Clears the custom field. Returns `None` for an
    /// out-of-range index.
    pub fn select_gallery(&mut self, index: usize) -> Option<&GalleryEntry> {
        let entry = self.gallery.get(index)?;
        self.custom.clear();
        self.last_selected = Some(entry.src.clone());
        self.preview_src.clone_from(&entry.src);
        Some(entry)
    }

    /// Update the custom URL field; the preview follows it.
    pub fn set_custom(&mut self, src: &str) {
        src.clone_into(&mut self.custom);
        src.clone_into(&mut self.preview_src);
    }

    #[must_use]
    pub fn custom(&self) -> &str {
        &self.custom
    }

    #[must_use]
    pub fn last_selected(&self) -> Option<&str> {
        self.last_selected.as_deref()
    }

    /// URL loaded in the live preview frame.
    #[must_use]
    pub fn preview_src(&self) -> &str {
        &self.preview_src
    }

    /// The source Finish would use.
    #[must_use]
    pub fn resolved_src(&self) -> Option<&str> {
        let custom = self.custom.trim();
        if custom.is_empty() {
            self.last_selected.as_deref()
        } else {
            Some(custom)
        }
    }

    /// Build the 2x2 dynamic cell.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDynamicSource`] when neither a gallery
    /// entry nor custom text was provided.
    pub fn draft(&self) -> Result<CellDraft, ValidationError> {
        let src = self.resolved_src().ok_or(ValidationError::EmptyDynamicSource)?;
        Ok(CellDraft {
            w: DYNAMIC_CELL_SIZE,
            h: DYNAMIC_CELL_SIZE,
            content: CellContent::Dynamic(DynamicContent { src: src.to_owned() }),
        })
    }

    pub fn reset(&mut self) {
        self.last_selected = None;
        self.custom.clear();
        self.preview_src.clear();
    }
}

impl Default for DynamicCellBuilder {
    fn default() -> Self {
        Self::new(builtin_gallery())
    }
}
