//! Conversion between live engine items and the wire [`Grid`].
//!
//! DESIGN
//! ======
//! Serialization walks the engine's reported order, skips placeholders and
//! reads geometry through the attribute fallbacks. Each item's content marker
//! is decoded on its own: a marker that fails to decode is logged and the cell
//! is kept with empty content, so one broken cell never blocks a save.

#[cfg(test)]
#[path = "serializer_test.rs"]
mod serializer_test;

use crate::engine::{EngineError, ItemId, ItemSpec, LayoutEngine, read_geometry};
use crate::net::types::{Cell, CellContent, CellDraft, Grid};

/// A content marker on one item that did not decode as [`CellContent`].
#[derive(Debug, thiserror::Error)]
#[error("cell {item} has malformed content: {source}")]
pub struct ContentParseError {
    pub item: ItemId,
    #[source]
    pub source: serde_json::Error,
}

/// Snapshot the engine into a [`Grid`].
pub fn serialize<E: LayoutEngine + ?Sized>(engine: &E) -> Grid {
    let cells = engine
        .grid_items()
        .into_iter()
        .filter(|id| !engine.is_placeholder(*id))
        .map(|id| {
            let geo = read_geometry(engine, id);
            let content = match read_content(engine, id) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(error = %e, "serializing cell without content");
                    None
                }
            };
            Cell { w: geo.w, h: geo.h, x: geo.x, y: geo.y, content }
        })
        .collect();

    Grid { col: engine.column(), row: engine.row(), cells }
}

/// Decode the content marker of one item. No marker means no content.
///
/// # Errors
///
/// Returns [`ContentParseError`] when a marker is present but is not a valid
/// tagged [`CellContent`].
pub fn read_content<E: LayoutEngine + ?Sized>(engine: &E, id: ItemId) -> Result<Option<CellContent>, ContentParseError> {
    let Some(marker) = engine.content_marker(id) else {
        return Ok(None);
    };
    if marker.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<CellContent>(&marker)
        .map(Some)
        .map_err(|source| ContentParseError { item: id, source })
}

/// Encode content as the marker embedded on an engine item.
///
/// # Errors
///
/// Returns an error if the content cannot be encoded as JSON.
pub fn content_marker(content: &CellContent) -> Result<String, serde_json::Error> {
    serde_json::to_string(content)
}

/// Recreate engine items for every cell of a loaded grid, at their stored positions.
///
/// # Errors
///
/// Returns the first engine error; cells before it stay inserted.
pub fn load_grid<E: LayoutEngine + ?Sized>(engine: &mut E, grid: &Grid) -> Result<Vec<ItemId>, EngineError> {
    grid.cells
        .iter()
        .map(|cell| {
            let content_marker = cell.content.as_ref().map(content_marker).transpose()?;
            engine.add_item(ItemSpec {
                w: cell.w,
                h: cell.h,
                position: Some((cell.x, cell.y)),
                content_marker,
                placeholder: false,
            })
        })
        .collect()
}

/// Insert a freshly built cell, letting the engine choose its position.
///
/// # Errors
///
/// Returns [`EngineError::NoSpace`] when the draft does not fit anywhere.
pub fn place_draft<E: LayoutEngine + ?Sized>(engine: &mut E, draft: &CellDraft) -> Result<ItemId, EngineError> {
    let marker = content_marker(&draft.content)?;
    engine.add_item(ItemSpec {
        w: draft.w,
        h: draft.h,
        position: None,
        content_marker: Some(marker),
        placeholder: false,
    })
}
