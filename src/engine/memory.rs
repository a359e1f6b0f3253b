//! Headless in-memory layout engine.
//!
//! Items are kept in insertion order, which is the order `grid_items`
//! reports. Geometry is stored as raw attribute strings so malformed values
//! can exist exactly as they would on a real engine item. Auto-placement
//! takes the first row-major slot whose footprint is free, counting
//! placeholders as occupied.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::HashMap;

use uuid::Uuid;

use super::{
    DragListener, DragPhase, EngineError, GeometryAttr, ItemId, ItemSpec, LayoutEngine, first_fit, fits_at,
    occupancy, read_geometry,
};

struct MemoryItem {
    id: ItemId,
    attrs: HashMap<GeometryAttr, String>,
    content_marker: Option<String>,
    placeholder: bool,
}

pub struct MemoryEngine {
    items: Vec<MemoryItem>,
    column: u32,
    row: u32,
    enabled: bool,
    dragging: Option<ItemId>,
    listeners: Vec<DragListener>,
}

impl MemoryEngine {
    /// Create an empty, interaction-enabled engine.
    #[must_use]
    pub fn new(column: u32, row: u32) -> Self {
        Self {
            items: Vec::new(),
            column,
            row,
            enabled: true,
            dragging: None,
            listeners: Vec::new(),
        }
    }

    /// Change the live column count.
    pub fn set_column(&mut self, column: u32) {
        self.column = column;
    }

    /// Change the live row count.
    pub fn set_row(&mut self, row: u32) {
        self.row = row;
    }

    /// Number of live items, placeholders included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Overwrite or clear a raw attribute string.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownItem`] if `id` is not live.
    pub fn set_raw_attr(&mut self, id: ItemId, attr: GeometryAttr, raw: Option<&str>) -> Result<(), EngineError> {
        let item = self.item_mut(id)?;
        match raw {
            Some(value) => item.attrs.insert(attr, value.to_owned()),
            None => item.attrs.remove(&attr),
        };
        Ok(())
    }

    /// Overwrite or clear the embedded content marker.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownItem`] if `id` is not live.
    pub fn set_content_marker(&mut self, id: ItemId, marker: Option<String>) -> Result<(), EngineError> {
        self.item_mut(id)?.content_marker = marker;
        Ok(())
    }

    /// Pick up an item. Fires [`DragPhase::Start`].
    ///
    /// # Errors
    ///
    /// Fails when interaction is disabled or the item is unknown.
    pub fn begin_drag(&mut self, id: ItemId) -> Result<(), EngineError> {
        if !self.enabled {
            return Err(EngineError::Disabled);
        }
        self.item_mut(id)?;
        self.dragging = Some(id);
        self.emit(DragPhase::Start, id);
        Ok(())
    }

    /// Drop the dragged item at `(x, y)`. Fires [`DragPhase::Stop`].
    ///
    /// The move is applied only when the target footprint is free; otherwise
    /// the item stays where it was. Returns whether it moved.
    ///
    /// # Errors
    ///
    /// Fails when no drag is in progress for `id`.
    pub fn end_drag(&mut self, id: ItemId, x: u32, y: u32) -> Result<bool, EngineError> {
        if self.dragging != Some(id) {
            return Err(EngineError::UnknownItem(id));
        }
        self.dragging = None;

        let geo = read_geometry(self, id);
        let taken = occupancy(self, true, Some(id));
        let fits = fits_at(&taken, self.column, self.row, (x, y), geo.w, geo.h);
        if fits {
            self.set_attr(id, GeometryAttr::X, x)?;
            self.set_attr(id, GeometryAttr::Y, y)?;
        }
        self.emit(DragPhase::Stop, id);
        Ok(fits)
    }

    fn emit(&mut self, phase: DragPhase, id: ItemId) {
        for listener in &mut self.listeners {
            listener(phase, id);
        }
    }

    fn item(&self, id: ItemId) -> Option<&MemoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut MemoryItem, EngineError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(EngineError::UnknownItem(id))
    }
}

impl LayoutEngine for MemoryEngine {
    fn grid_items(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    fn attr(&self, id: ItemId, attr: GeometryAttr) -> Option<String> {
        self.item(id).and_then(|item| item.attrs.get(&attr).cloned())
    }

    fn set_attr(&mut self, id: ItemId, attr: GeometryAttr, value: u32) -> Result<(), EngineError> {
        self.item_mut(id)?.attrs.insert(attr, value.to_string());
        Ok(())
    }

    fn content_marker(&self, id: ItemId) -> Option<String> {
        self.item(id).and_then(|item| item.content_marker.clone())
    }

    fn is_placeholder(&self, id: ItemId) -> bool {
        self.item(id).is_some_and(|item| item.placeholder)
    }

    fn add_item(&mut self, spec: ItemSpec) -> Result<ItemId, EngineError> {
        let (x, y) = match spec.position {
            Some(position) => position,
            None => {
                let taken = occupancy(self, true, None);
                first_fit(&taken, self.column, self.row, spec.w, spec.h)
                    .ok_or(EngineError::NoSpace { w: spec.w, h: spec.h })?
            }
        };

        let id = Uuid::new_v4();
        let attrs = HashMap::from([
            (GeometryAttr::W, spec.w.to_string()),
            (GeometryAttr::H, spec.h.to_string()),
            (GeometryAttr::X, x.to_string()),
            (GeometryAttr::Y, y.to_string()),
        ]);
        self.items.push(MemoryItem {
            id,
            attrs,
            content_marker: spec.content_marker,
            placeholder: spec.placeholder,
        });
        Ok(id)
    }

    fn remove_item(&mut self, id: ItemId) -> Result<(), EngineError> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Err(EngineError::UnknownItem(id));
        }
        if self.dragging == Some(id) {
            self.dragging = None;
        }
        Ok(())
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn column(&self) -> u32 {
        self.column
    }

    fn row(&self) -> u32 {
        self.row
    }

    fn on_drag(&mut self, listener: DragListener) {
        self.listeners.push(listener);
    }
}
