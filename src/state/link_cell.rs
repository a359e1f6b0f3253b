//! Link tile draft.
//!
//! DESIGN
//! ======
//! The builder holds the link field, the preview image and the suggested
//! swatch, and delegates the tile color to a [`ColorPicker`]. The preview is
//! derived from the picker on every read, so picker changes from any source
//! re-color it and flip the light-artwork flag without extra wiring.
//!
//! A non-empty link that fails validation blocks [`LinkCellBuilder::draft`].

#[cfg(test)]
#[path = "link_cell_test.rs"]
mod link_cell_test;

use super::ValidationError;
use super::color_picker::{ColorPicker, SwatchPicker};
use super::icon_search::FriendlyIcon;
use crate::net::types::{CellContent, CellDraft, LinkContent};
use crate::util::color::{DEFAULT_CELL_COLOR, is_dark};
use crate::util::url::is_valid_link;

/// Transparent 1x1 GIF shown before an icon is chosen.
pub const BLANK_PREVIEW_IMAGE: &str = "data:image/gif;base64,R0lGODlhAQABAAD/ACwAAAAAAQABAAACADs=";

/// Link tiles are created 1x1.
pub const LINK_CELL_SIZE: u32 = 1;

/// What the preview tile currently shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkPreview {
    pub background: String,
    pub image_src: String,
    /// Artwork renders light over a dark background.
    pub light_artwork: bool,
}

pub struct LinkCellBuilder {
    link: String,
    link_invalid: bool,
    image_src: String,
    suggested: Option<String>,
    picker: Box<dyn ColorPicker>,
}

impl LinkCellBuilder {
    #[must_use]
    pub fn new(picker: Box<dyn ColorPicker>) -> Self {
        let mut builder = Self {
            link: String::new(),
            link_invalid: false,
            image_src: BLANK_PREVIEW_IMAGE.to_owned(),
            suggested: None,
            picker,
        };
        builder.picker.set_color(DEFAULT_CELL_COLOR);
        builder
    }

    /// Update the link field. Returns whether the value is acceptable.
    pub fn set_link(&mut self, link: &str) -> bool {
        link.clone_into(&mut self.link);
        self.link_invalid = !is_valid_link(link);
        !self.link_invalid
    }

    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Whether the link field is flagged.
    #[must_use]
    pub fn link_invalid(&self) -> bool {
        self.link_invalid
    }

    /// Take a search result as the tile artwork and suggest its color.
    pub fn select_icon(&mut self, icon: &FriendlyIcon) {
        self.suggested = Some(icon.hex.clone());
        self.picker.set_color(&icon.hex);
        self.image_src.clone_from(&icon.url);
    }

    /// Re-apply the suggested swatch. Returns `false` when nothing was suggested yet.
    pub fn apply_suggested_color(&mut self) -> bool {
        match &self.suggested {
            Some(hex) => {
                self.picker.set_color(hex);
                true
            }
            None => false,
        }
    }

    /// Manual pick from the color picker.
    pub fn pick_color(&mut self, hex: &str) {
        self.picker.set_color(hex);
    }

    /// Color of the suggested swatch.
    #[must_use]
    pub fn suggested_color(&self) -> &str {
        self.suggested.as_deref().unwrap_or(DEFAULT_CELL_COLOR)
    }

    #[must_use]
    pub fn preview(&self) -> LinkPreview {
        let background = self.picker.hex_string();
        let light_artwork = is_dark(&background);
        LinkPreview { background, image_src: self.image_src.clone(), light_artwork }
    }

    pub fn picker_mut(&mut self) -> &mut dyn ColorPicker {
        self.picker.as_mut()
    }

    /// Build the tile from the current fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLink`] when the link field is flagged.
    pub fn draft(&self) -> Result<CellDraft, ValidationError> {
        if self.link_invalid {
            return Err(ValidationError::InvalidLink { link: self.link.clone() });
        }
        Ok(CellDraft {
            w: LINK_CELL_SIZE,
            h: LINK_CELL_SIZE,
            content: CellContent::Link(LinkContent {
                icon_url: self.image_src.clone(),
                link: self.link.trim().to_owned(),
                bg_color: self.picker.hex_string(),
            }),
        })
    }

    /// Back to the default color, a blank link and the blank preview image.
    pub fn reset(&mut self) {
        self.link.clear();
        self.link_invalid = false;
        self.suggested = None;
        BLANK_PREVIEW_IMAGE.clone_into(&mut self.image_src);
        self.picker.set_color(DEFAULT_CELL_COLOR);
    }
}

impl Default for LinkCellBuilder {
    fn default() -> Self {
        Self::new(Box::new(SwatchPicker::new()))
    }
}
