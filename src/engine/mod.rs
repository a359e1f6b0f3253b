//! Grid-layout engine seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! Dragging, resizing and placement belong to an external layout engine. The
//! session only needs the narrow capability described by [`LayoutEngine`]:
//! ordered item listing, per-item geometry attributes, the embedded content
//! marker, an interaction toggle, drag lifecycle events and the live
//! column/row configuration. [`memory::MemoryEngine`] is a headless
//! implementation used by the CLI and the tests.
//!
//! Geometry attributes are raw strings, as the engine stores them. Reading
//! them back through [`read_geometry`] applies the `w=h=1, x=y=0` defaults
//! for missing or malformed values.

pub mod memory;

use uuid::Uuid;

/// Identifier of a live engine item.
pub type ItemId = Uuid;

/// Callback invoked on drag start/stop.
pub type DragListener = Box<dyn FnMut(DragPhase, ItemId)>;

/// One of the four per-item geometry attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryAttr {
    W,
    H,
    X,
    Y,
}

impl GeometryAttr {
    pub const ALL: [Self; 4] = [Self::W, Self::H, Self::X, Self::Y];

    /// Attribute name on the engine item.
    #[must_use]
    pub fn attr_name(self) -> &'static str {
        match self {
            Self::W => "gs-w",
            Self::H => "gs-h",
            Self::X => "gs-x",
            Self::Y => "gs-y",
        }
    }

    /// Value assumed when the attribute is missing or unparseable.
    #[must_use]
    pub fn fallback(self) -> u32 {
        match self {
            Self::W | Self::H => 1,
            Self::X | Self::Y => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Start,
    Stop,
}

/// Resolved item geometry in grid units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub w: u32,
    pub h: u32,
    pub x: u32,
    pub y: u32,
}

impl Geometry {
    /// Whether this footprint covers the slot at `(col, row)`.
    #[must_use]
    pub fn covers(&self, col: u32, row: u32) -> bool {
        col >= self.x && col < self.x.saturating_add(self.w) && row >= self.y && row < self.y.saturating_add(self.h)
    }
}

/// Description of an item to insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSpec {
    pub w: u32,
    pub h: u32,
    /// Explicit `(x, y)`; `None` asks the engine to auto-place.
    pub position: Option<(u32, u32)>,
    /// Serialized `CellContent` JSON embedded on the item.
    pub content_marker: Option<String>,
    /// Transient filler that is never serialized.
    pub placeholder: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no free {w}x{h} area left in the grid")]
    NoSpace { w: u32, h: u32 },
    #[error("unknown grid item {0}")]
    UnknownItem(ItemId),
    #[error("grid interaction is disabled")]
    Disabled,
    #[error("failed to encode cell content: {0}")]
    Marker(#[from] serde_json::Error),
}

/// The external drag-and-resize grid capability.
pub trait LayoutEngine {
    /// Live items in engine order.
    fn grid_items(&self) -> Vec<ItemId>;

    /// Raw geometry attribute of an item, if set.
    fn attr(&self, id: ItemId, attr: GeometryAttr) -> Option<String>;

    /// Set a geometry attribute.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownItem`] if `id` is not live.
    fn set_attr(&mut self, id: ItemId, attr: GeometryAttr, value: u32) -> Result<(), EngineError>;

    /// Serialized content marker embedded on the item, if any.
    fn content_marker(&self, id: ItemId) -> Option<String>;

    /// Whether the item is a placeholder filler.
    fn is_placeholder(&self, id: ItemId) -> bool;

    /// Insert an item.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoSpace`] when auto-placement finds no free area.
    fn add_item(&mut self, spec: ItemSpec) -> Result<ItemId, EngineError>;

    /// Remove an item.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownItem`] if `id` is not live.
    fn remove_item(&mut self, id: ItemId) -> Result<(), EngineError>;

    /// Allow dragging and resizing.
    fn enable(&mut self);

    /// Lock the layout.
    fn disable(&mut self);

    fn is_enabled(&self) -> bool;

    /// Live column count.
    fn column(&self) -> u32;

    /// Live row count.
    fn row(&self) -> u32;

    /// Subscribe to drag start/stop.
    fn on_drag(&mut self, listener: DragListener);
}

/// Read one attribute, falling back on missing or malformed values.
pub fn read_attr<E: LayoutEngine + ?Sized>(engine: &E, id: ItemId, attr: GeometryAttr) -> u32 {
    match engine.attr(id, attr).map(|raw| raw.trim().parse::<u32>()) {
        Some(Ok(value)) => value,
        _ => attr.fallback(),
    }
}

/// Read all four geometry attributes of an item.
pub fn read_geometry<E: LayoutEngine + ?Sized>(engine: &E, id: ItemId) -> Geometry {
    Geometry {
        w: read_attr(engine, id, GeometryAttr::W),
        h: read_attr(engine, id, GeometryAttr::H),
        x: read_attr(engine, id, GeometryAttr::X),
        y: read_attr(engine, id, GeometryAttr::Y),
    }
}

/// Row-major occupancy of the live `column x row` area.
///
/// Placeholders are counted only when `include_placeholders` is set, and
/// `exclude` leaves one item out (the one being moved).
pub fn occupancy<E: LayoutEngine + ?Sized>(engine: &E, include_placeholders: bool, exclude: Option<ItemId>) -> Vec<bool> {
    let (cols, rows) = (engine.column(), engine.row());
    let mut taken = vec![false; (cols as usize) * (rows as usize)];
    for id in engine.grid_items() {
        if Some(id) == exclude || (!include_placeholders && engine.is_placeholder(id)) {
            continue;
        }
        let geo = read_geometry(engine, id);
        for row in geo.y..geo.y.saturating_add(geo.h).min(rows) {
            for col in geo.x..geo.x.saturating_add(geo.w).min(cols) {
                taken[(row as usize) * (cols as usize) + col as usize] = true;
            }
        }
    }
    taken
}

/// Whether a `w x h` footprint at `(x, y)` lies inside the area and on free slots only.
#[must_use]
pub fn fits_at(taken: &[bool], cols: u32, rows: u32, (x, y): (u32, u32), w: u32, h: u32) -> bool {
    if w == 0 || h == 0 || x.saturating_add(w) > cols || y.saturating_add(h) > rows {
        return false;
    }
    (y..y + h).all(|row| (x..x + w).all(|col| taken.get((row as usize) * (cols as usize) + col as usize) == Some(&false)))
}

/// First row-major origin where a `w x h` footprint fits into free slots.
#[must_use]
pub fn first_fit(taken: &[bool], cols: u32, rows: u32, w: u32, h: u32) -> Option<(u32, u32)> {
    if w == 0 || h == 0 || w > cols || h > rows {
        return None;
    }
    (0..=(rows - h))
        .flat_map(|y| (0..=(cols - w)).map(move |x| (x, y)))
        .find(|&origin| fits_at(taken, cols, rows, origin, w, h))
}
