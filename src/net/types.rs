//! Wire DTOs for the grid endpoints.
//!
//! DESIGN
//! ======
//! `CellContent` is an internally tagged union keyed on `type`, so decoding
//! checks the tag before any variant field is trusted. Content that does not
//! decode is dropped to `None` on the owning cell instead of failing the whole
//! grid.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

/// Column count of a freshly created account grid.
pub const DEFAULT_GRID_COLUMNS: u32 = 10;
/// Row count of a freshly created account grid.
pub const DEFAULT_GRID_ROWS: u32 = 5;

/// The full persisted layout for one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Column count of the live engine configuration.
    pub col: u32,
    /// Row count of the live engine configuration.
    pub row: u32,
    /// Cells in engine order.
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            col: DEFAULT_GRID_COLUMNS,
            row: DEFAULT_GRID_ROWS,
            cells: Vec::new(),
        }
    }
}

/// One positioned widget slot. Geometry is in grid units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub w: u32,
    pub h: u32,
    pub x: u32,
    pub y: u32,
    /// Widget content; `None` renders an empty cell.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_content_lenient"
    )]
    pub content: Option<CellContent>,
}

impl Cell {
    #[must_use]
    pub fn new(w: u32, h: u32, x: u32, y: u32) -> Self {
        Self { w, h, x, y, content: None }
    }

    #[must_use]
    pub fn with_content(mut self, content: CellContent) -> Self {
        self.content = Some(content);
        self
    }
}

/// Content carried by a cell, discriminated by the `type` tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CellContent {
    /// External-link icon tile.
    #[serde(rename = "l")]
    Link(LinkContent),
    /// Embedded-URL mini app.
    #[serde(rename = "d")]
    Dynamic(DynamicContent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkContent {
    /// Image shown on the tile.
    #[serde(rename = "iconUrl")]
    pub icon_url: String,
    /// Destination opened when the tile is clicked.
    pub link: String,
    /// Tile background as `#rrggbb`.
    #[serde(rename = "bgColor")]
    pub bg_color: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicContent {
    /// URL of the embedded widget page.
    pub src: String,
}

/// A cell produced by one of the builders that has not been placed yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellDraft {
    pub w: u32,
    pub h: u32,
    pub content: CellContent,
}

/// Response of `GET /grid/search_icon`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconResponse {
    /// Brand icons.
    #[serde(default)]
    pub si: Vec<BrandIcon>,
    /// Generic icons.
    #[serde(default)]
    pub fa: Vec<GenericIcon>,
}

/// Brand icon candidate. `hex` has no leading `#`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandIcon {
    pub slug: String,
    pub hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Generic icon candidate. The source has no per-icon color.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericIcon {
    pub name: String,
}

fn deserialize_content_lenient<'de, D>(deserializer: D) -> Result<Option<CellContent>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(value) = raw else {
        return Ok(None);
    };
    match serde_json::from_value::<CellContent>(value) {
        Ok(content) => Ok(Some(content)),
        Err(e) => {
            tracing::warn!(error = %e, "dropping undecodable cell content");
            Ok(None)
        }
    }
}
