//! Placeholder filler cells shown outside edit mode.

#[cfg(test)]
#[path = "placeholders_test.rs"]
mod placeholders_test;

use crate::engine::{EngineError, ItemSpec, LayoutEngine, occupancy};

/// Remove every placeholder item. Returns how many were removed.
///
/// # Errors
///
/// Propagates engine removal failures.
pub fn remove_placeholders<E: LayoutEngine + ?Sized>(engine: &mut E) -> Result<usize, EngineError> {
    let placeholders: Vec<_> = engine
        .grid_items()
        .into_iter()
        .filter(|id| engine.is_placeholder(*id))
        .collect();
    for id in &placeholders {
        engine.remove_item(*id)?;
    }
    Ok(placeholders.len())
}

/// Cover every free `1x1` slot of the live area with a placeholder.
/// Returns how many were added.
///
/// # Errors
///
/// Propagates engine insertion failures.
pub fn fill_with_placeholders<E: LayoutEngine + ?Sized>(engine: &mut E) -> Result<usize, EngineError> {
    let cols = engine.column();
    let taken = occupancy(engine, true, None);
    let mut added = 0;
    for (idx, _) in taken.iter().enumerate().filter(|(_, taken)| !**taken) {
        let (x, y) = slot_position(idx, cols);
        engine.add_item(ItemSpec {
            w: 1,
            h: 1,
            position: Some((x, y)),
            content_marker: None,
            placeholder: true,
        })?;
        added += 1;
    }
    tracing::debug!(added, "filled grid with placeholders");
    Ok(added)
}

fn slot_position(idx: usize, cols: u32) -> (u32, u32) {
    let cols = cols.max(1) as usize;
    let x = u32::try_from(idx % cols).unwrap_or(u32::MAX);
    let y = u32::try_from(idx / cols).unwrap_or(u32::MAX);
    (x, y)
}
