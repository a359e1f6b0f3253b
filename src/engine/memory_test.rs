use std::sync::{Arc, Mutex};

use super::*;

fn auto(w: u32, h: u32) -> ItemSpec {
    ItemSpec { w, h, position: None, content_marker: None, placeholder: false }
}

fn at(w: u32, h: u32, x: u32, y: u32) -> ItemSpec {
    ItemSpec { position: Some((x, y)), ..auto(w, h) }
}

fn position(engine: &MemoryEngine, id: ItemId) -> (u32, u32) {
    let geo = read_geometry(engine, id);
    (geo.x, geo.y)
}

// =============================================================
// Insertion / order
// =============================================================

#[test]
fn new_engine_is_empty_and_enabled() {
    let engine = MemoryEngine::new(10, 5);
    assert!(engine.is_empty());
    assert!(engine.is_enabled());
    assert_eq!((engine.column(), engine.row()), (10, 5));
}

#[test]
fn grid_items_follow_insertion_order() {
    let mut engine = MemoryEngine::new(10, 5);
    let a = engine.add_item(at(1, 1, 5, 0)).unwrap();
    let b = engine.add_item(at(1, 1, 0, 0)).unwrap();
    let c = engine.add_item(at(1, 1, 2, 2)).unwrap();
    assert_eq!(engine.grid_items(), vec![a, b, c]);
}

#[test]
fn add_item_stores_geometry_and_marker() {
    let mut engine = MemoryEngine::new(10, 5);
    let id = engine
        .add_item(ItemSpec { content_marker: Some(r#"{"type":"d","src":"/a"}"#.to_owned()), ..at(2, 2, 1, 1) })
        .unwrap();
    assert_eq!(engine.attr(id, GeometryAttr::W).as_deref(), Some("2"));
    assert_eq!(engine.attr(id, GeometryAttr::Y).as_deref(), Some("1"));
    assert_eq!(engine.content_marker(id).as_deref(), Some(r#"{"type":"d","src":"/a"}"#));
    assert!(!engine.is_placeholder(id));
}

// =============================================================
// Auto-placement
// =============================================================

#[test]
fn auto_placement_fills_row_major() {
    let mut engine = MemoryEngine::new(3, 2);
    let a = engine.add_item(auto(1, 1)).unwrap();
    let b = engine.add_item(auto(2, 1)).unwrap();
    let c = engine.add_item(auto(1, 1)).unwrap();
    assert_eq!(position(&engine, a), (0, 0));
    assert_eq!(position(&engine, b), (1, 0));
    assert_eq!(position(&engine, c), (0, 1));
}

#[test]
fn auto_placement_reports_no_space() {
    let mut engine = MemoryEngine::new(2, 2);
    engine.add_item(at(2, 1, 0, 0)).unwrap();
    engine.add_item(at(1, 1, 0, 1)).unwrap();
    let err = engine.add_item(auto(2, 2)).unwrap_err();
    assert!(matches!(err, EngineError::NoSpace { w: 2, h: 2 }));
    assert_eq!(engine.len(), 2);
}

#[test]
fn auto_placement_respects_live_row_count() {
    let mut engine = MemoryEngine::new(2, 1);
    engine.add_item(auto(2, 1)).unwrap();
    assert!(engine.add_item(auto(1, 1)).is_err());
    engine.set_row(2);
    assert!(engine.add_item(auto(1, 1)).is_ok());
}

// =============================================================
// Removal / raw attributes
// =============================================================

#[test]
fn remove_unknown_item_errors() {
    let mut engine = MemoryEngine::new(2, 2);
    let id = engine.add_item(auto(1, 1)).unwrap();
    engine.remove_item(id).unwrap();
    assert!(matches!(engine.remove_item(id), Err(EngineError::UnknownItem(_))));
}

#[test]
fn raw_attributes_can_be_corrupted_and_cleared() {
    let mut engine = MemoryEngine::new(2, 2);
    let id = engine.add_item(auto(1, 1)).unwrap();
    engine.set_raw_attr(id, GeometryAttr::H, Some("tall")).unwrap();
    engine.set_raw_attr(id, GeometryAttr::W, None).unwrap();
    assert_eq!(engine.attr(id, GeometryAttr::H).as_deref(), Some("tall"));
    assert_eq!(engine.attr(id, GeometryAttr::W), None);
}

// =============================================================
// Drag lifecycle
// =============================================================

#[test]
fn drag_emits_start_and_stop() {
    let mut engine = MemoryEngine::new(4, 4);
    let id = engine.add_item(auto(1, 1)).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.on_drag(Box::new(move |phase, item| sink.lock().unwrap().push((phase, item))));

    engine.begin_drag(id).unwrap();
    assert!(engine.end_drag(id, 3, 3).unwrap());

    assert_eq!(*seen.lock().unwrap(), vec![(DragPhase::Start, id), (DragPhase::Stop, id)]);
    assert_eq!(position(&engine, id), (3, 3));
}

#[test]
fn drag_onto_occupied_slot_keeps_position() {
    let mut engine = MemoryEngine::new(4, 1);
    let a = engine.add_item(auto(1, 1)).unwrap();
    engine.add_item(at(2, 1, 2, 0)).unwrap();

    engine.begin_drag(a).unwrap();
    assert!(!engine.end_drag(a, 3, 0).unwrap());
    assert_eq!(position(&engine, a), (0, 0));
}

#[test]
fn drag_past_edge_is_refused() {
    let mut engine = MemoryEngine::new(3, 3);
    let a = engine.add_item(auto(2, 2)).unwrap();
    engine.begin_drag(a).unwrap();
    assert!(!engine.end_drag(a, 2, 0).unwrap());
}

#[test]
fn drag_requires_enabled_engine() {
    let mut engine = MemoryEngine::new(2, 2);
    let id = engine.add_item(auto(1, 1)).unwrap();
    engine.disable();
    assert!(matches!(engine.begin_drag(id), Err(EngineError::Disabled)));
}

#[test]
fn end_drag_without_begin_errors() {
    let mut engine = MemoryEngine::new(2, 2);
    let id = engine.add_item(auto(1, 1)).unwrap();
    assert!(engine.end_drag(id, 1, 1).is_err());
}
