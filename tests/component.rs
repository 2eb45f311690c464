//! Dock component tests
//!
//! Adding, moving, closing and persisting panels across groups.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{fixture, panel_ids, params};
use dockyard::component::{AddPanelOptions, MovePanel, SerializedDock};
use dockyard::{DockError, Position};
use serde_json::json;

fn event_log(fx: &common::Fixture) -> Rc<RefCell<Vec<String>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    let _ = fx
        .component
        .on_did_add_panel()
        .subscribe(move |p| l.borrow_mut().push(format!("add:{}", p.id())));
    let l = log.clone();
    let _ = fx
        .component
        .on_did_remove_panel()
        .subscribe(move |p| l.borrow_mut().push(format!("remove:{}", p.id())));
    log
}

// ========================================================================
// Adding panels
// ========================================================================

#[test]
fn test_add_panel_creates_first_group() {
    let fx = fixture();
    let log = event_log(&fx);
    let panel = fx
        .component
        .add_panel(
            AddPanelOptions::new("a", "default")
                .title("Alpha")
                .params(params(json!({ "n": 1 }))),
        )
        .unwrap();

    assert_eq!(fx.component.groups().len(), 1);
    assert_eq!(panel.title().as_deref(), Some("Alpha"));
    assert_eq!(panel.params().unwrap(), params(json!({ "n": 1 })));
    assert!(panel.api().is_active());
    assert!(fx.component.active_group().unwrap().is_active());
    assert_eq!(*log.borrow(), vec!["add:a"]);

    let parts = fx.parts.borrow();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].inits.borrow()[0].container_api.options().parent_element.tag(), "div");
}

#[test]
fn test_group_elements_mount_in_parent() {
    let fx = fixture();
    let group = fx.component.add_group();
    let parent = fx.component.api().options().parent_element.clone();
    assert!(parent.contains_child(group.element()));
}

#[test]
fn test_add_panel_with_tab_component() {
    let fx = fixture();
    let panel = fx
        .component
        .add_panel(AddPanelOptions::new("a", "default").tab_component("tab"))
        .unwrap();
    assert_eq!(panel.header().unwrap().id(), "tab");
    assert_eq!(panel.content().unwrap().id(), "default");
}

#[test]
fn test_add_panel_errors() {
    let fx = fixture();
    fx.component
        .add_panel(AddPanelOptions::new("a", "default"))
        .unwrap();

    assert!(matches!(
        fx.component.add_panel(AddPanelOptions::new("a", "default")),
        Err(DockError::DuplicatePanel(_))
    ));
    assert!(matches!(
        fx.component.add_panel(AddPanelOptions::new("b", "missing")),
        Err(DockError::UnknownComponent(_))
    ));
    assert!(matches!(
        fx.component
            .add_panel(AddPanelOptions::new("c", "default").in_group("nope")),
        Err(DockError::UnknownGroup(_))
    ));
}

// ========================================================================
// Moving panels
// ========================================================================

#[test]
fn test_move_to_center_of_other_group() {
    let fx = fixture();
    let log = event_log(&fx);
    let c = &fx.component;
    c.add_panel(AddPanelOptions::new("a", "default")).unwrap();
    c.add_panel(AddPanelOptions::new("b", "default")).unwrap();
    let second = c.add_group();
    c.add_panel(AddPanelOptions::new("c", "default").in_group(second.id()))
        .unwrap();
    let first = c.groups()[0].clone();
    let moved = c.panel("a").unwrap();

    c.move_panel(MovePanel {
        source_group: first.id().to_string(),
        item_id: "a".to_string(),
        target_group: second.id().to_string(),
        position: Position::Center,
        index: Some(1),
    })
    .unwrap();

    assert_eq!(panel_ids(&first), vec!["b"]);
    assert_eq!(panel_ids(&second), vec!["c", "a"]);
    assert!(Rc::ptr_eq(&moved, &second.panel("a").unwrap()));
    assert_eq!(moved.group().unwrap().id(), second.id());
    assert!(!moved.is_disposed());
    assert!(
        log.borrow().iter().all(|e| e.starts_with("add:")),
        "moves must not fire add/remove: {:?}",
        log.borrow()
    );
}

#[test]
fn test_move_to_edge_creates_neighbour_group() {
    let fx = fixture();
    let c = &fx.component;
    c.add_panel(AddPanelOptions::new("a", "default")).unwrap();
    c.add_panel(AddPanelOptions::new("b", "default")).unwrap();
    let group = c.groups()[0].clone();

    c.move_panel(MovePanel {
        source_group: group.id().to_string(),
        item_id: "b".to_string(),
        target_group: group.id().to_string(),
        position: Position::Left,
        index: None,
    })
    .unwrap();

    let groups = c.groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(panel_ids(&groups[0]), vec!["b"]);
    assert_eq!(panel_ids(&groups[1]), vec!["a"]);
    assert!(Rc::ptr_eq(&c.active_group().unwrap(), &groups[0]));
}

#[test]
fn test_move_last_panel_removes_source_group() {
    let fx = fixture();
    let c = &fx.component;
    c.add_panel(AddPanelOptions::new("a", "default")).unwrap();
    let second = c.add_group();
    c.add_panel(AddPanelOptions::new("b", "default").in_group(second.id()))
        .unwrap();
    let first = c.groups()[0].clone();

    c.move_panel(MovePanel {
        source_group: first.id().to_string(),
        item_id: "a".to_string(),
        target_group: second.id().to_string(),
        position: Position::Right,
        index: None,
    })
    .unwrap();

    let groups = c.groups();
    assert_eq!(groups.len(), 2);
    assert!(first.is_disposed());
    assert_eq!(panel_ids(&groups[0]), vec!["b"]);
    assert_eq!(panel_ids(&groups[1]), vec!["a"]);
    assert!(!c.panel("a").unwrap().is_disposed());
}

#[test]
fn test_reorder_within_group() {
    let fx = fixture();
    let c = &fx.component;
    for id in ["a", "b", "c"] {
        c.add_panel(AddPanelOptions::new(id, "default")).unwrap();
    }
    let group = c.groups()[0].clone();

    c.move_panel(MovePanel {
        source_group: group.id().to_string(),
        item_id: "c".to_string(),
        target_group: group.id().to_string(),
        position: Position::Center,
        index: Some(0),
    })
    .unwrap();

    assert_eq!(panel_ids(&group), vec!["c", "a", "b"]);
}

#[test]
fn test_move_unknown_panel_errors() {
    let fx = fixture();
    let c = &fx.component;
    c.add_panel(AddPanelOptions::new("a", "default")).unwrap();
    let group = c.groups()[0].clone();

    let result = c.move_panel(MovePanel {
        source_group: group.id().to_string(),
        item_id: "ghost".to_string(),
        target_group: group.id().to_string(),
        position: Position::Center,
        index: None,
    });
    assert!(matches!(result, Err(DockError::UnknownPanel(_))));
}

// ========================================================================
// Removing panels
// ========================================================================

#[test]
fn test_close_panel_honours_veto() {
    let fx = fixture();
    let log = event_log(&fx);
    let c = &fx.component;
    let panel = c.add_panel(AddPanelOptions::new("a", "default")).unwrap();
    c.add_panel(AddPanelOptions::new("b", "default")).unwrap();

    panel.api().set_try_close(|| Ok(false));
    assert!(!c.close_panel("a").unwrap());
    assert!(c.panel("a").is_some());

    panel.api().clear_try_close();
    assert!(c.close_panel("a").unwrap());
    assert!(c.panel("a").is_none());
    assert!(panel.is_disposed());
    assert_eq!(fx.parts.borrow()[0].dispose_count.get(), 1);
    assert_eq!(log.borrow().last().map(String::as_str), Some("remove:a"));
}

#[test]
fn test_remove_last_panel_removes_group() {
    let fx = fixture();
    let c = &fx.component;
    c.add_panel(AddPanelOptions::new("a", "default")).unwrap();
    c.remove_panel("a").unwrap();
    assert!(c.groups().is_empty());
    assert!(c.active_group().is_none());
    assert!(matches!(c.remove_panel("a"), Err(DockError::UnknownPanel(_))));
}

#[test]
fn test_remove_panel_reports_part_dispose_failure() {
    let fx = fixture();
    let log = event_log(&fx);
    let c = &fx.component;
    let panel = c.add_panel(AddPanelOptions::new("a", "failing")).unwrap();

    match c.remove_panel("a") {
        Err(DockError::Dispose { panel_id, errors }) => {
            assert_eq!(panel_id, "a");
            assert_eq!(errors.len(), 1);
        }
        other => panic!("expected dispose error, got {:?}", other),
    }
    assert!(panel.is_disposed());
    assert!(c.panel("a").is_none());
    assert_eq!(log.borrow().last().map(String::as_str), Some("remove:a"));
}

#[test]
fn test_close_panel_with_failing_part_still_closes() {
    let fx = fixture();
    let c = &fx.component;
    let panel = c.add_panel(AddPanelOptions::new("a", "failing")).unwrap();
    c.add_panel(AddPanelOptions::new("b", "default")).unwrap();

    assert!(c.close_panel("a").unwrap());
    assert!(panel.is_disposed());
    assert_eq!(fx.parts.borrow()[0].dispose_count.get(), 1);
}

#[test]
fn test_set_active_group_moves_focus() {
    let fx = fixture();
    let c = &fx.component;
    let a = c.add_panel(AddPanelOptions::new("a", "default")).unwrap();
    let second = c.add_group();
    let b = c
        .add_panel(AddPanelOptions::new("b", "default").in_group(second.id()))
        .unwrap();
    assert!(b.api().is_focused());
    assert!(!a.api().is_focused());

    let first = c.groups()[0].clone();
    c.set_active_group(first.id()).unwrap();
    assert!(a.api().is_focused());
    assert!(!b.api().is_focused());
    assert!(matches!(
        c.set_active_group("nope"),
        Err(DockError::UnknownGroup(_))
    ));
}

// ========================================================================
// Persistence
// ========================================================================

#[test]
fn test_layout_round_trips_through_json() {
    let fx = fixture();
    let c = &fx.component;
    c.add_panel(AddPanelOptions::new("a", "default").title("A"))
        .unwrap();
    let b = c
        .add_panel(AddPanelOptions::new("b", "default").tab_component("tab"))
        .unwrap();
    b.api().set_state_value("scroll", json!(7));
    let second = c.add_group();
    c.add_panel(AddPanelOptions::new("c", "default").in_group(second.id()))
        .unwrap();
    c.groups()[0].set_active_panel("a").unwrap();

    let saved = c.to_json().unwrap();
    let text = serde_json::to_string(&saved).unwrap();
    let parsed: SerializedDock = serde_json::from_str(&text).unwrap();

    c.from_json(&parsed).unwrap();
    let groups = c.groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(panel_ids(&groups[0]), vec!["a", "b"]);
    assert_eq!(panel_ids(&groups[1]), vec!["c"]);
    assert!(groups[0].is_panel_active("a"));
    assert_eq!(c.active_group().unwrap().id(), groups[1].id());

    let restored = c.panel("b").unwrap();
    assert!(!Rc::ptr_eq(&restored, &b));
    assert!(b.is_disposed());
    assert_eq!(restored.api().get_state(), params(json!({ "scroll": 7 })));
    assert_eq!(restored.header().unwrap().id(), "tab");
    assert_eq!(c.to_json().unwrap(), saved);
}

#[test]
fn test_dispose_releases_everything() {
    let fx = fixture();
    let c = &fx.component;
    let a = c.add_panel(AddPanelOptions::new("a", "default")).unwrap();
    c.dispose();
    assert!(a.is_disposed());
    assert!(c.groups().is_empty());
    c.dispose();
}

fn serialized_group(id: &str, panels: serde_json::Value) -> serde_json::Value {
    json!({ "id": id, "panels": panels })
}

fn serialized_panel(id: &str, content: &str) -> serde_json::Value {
    json!({ "id": id, "contentId": content, "title": id })
}

#[test]
fn test_failed_restore_keeps_current_layout() {
    let fx = fixture();
    let c = &fx.component;
    let keep = c.add_panel(AddPanelOptions::new("keep", "default")).unwrap();
    let before = c.to_json().unwrap();

    let data: SerializedDock = serde_json::from_value(json!({
        "groups": [
            serialized_group("g", json!([
                serialized_panel("ok", "default"),
                serialized_panel("bad", "missing")
            ]))
        ]
    }))
    .unwrap();

    assert!(matches!(
        c.from_json(&data),
        Err(DockError::UnknownComponent(name)) if name == "missing"
    ));
    assert!(!keep.is_disposed());
    assert!(c.panel("keep").is_some());
    assert_eq!(c.to_json().unwrap(), before);
}

#[test]
fn test_restore_rejects_unknown_active_panel() {
    let fx = fixture();
    let c = &fx.component;
    c.add_panel(AddPanelOptions::new("keep", "default")).unwrap();

    let data: SerializedDock = serde_json::from_value(json!({
        "groups": [{
            "id": "g",
            "panels": [serialized_panel("a", "default")],
            "activePanel": "ghost"
        }]
    }))
    .unwrap();

    assert!(matches!(c.from_json(&data), Err(DockError::UnknownPanel(_))));
    assert!(c.panel("keep").is_some());
}

#[test]
fn test_restore_rejects_duplicate_ids() {
    let fx = fixture();
    let c = &fx.component;

    let duplicate_groups: SerializedDock = serde_json::from_value(json!({
        "groups": [
            serialized_group("g", json!([serialized_panel("a", "default")])),
            serialized_group("g", json!([serialized_panel("b", "default")]))
        ]
    }))
    .unwrap();
    assert!(matches!(
        c.from_json(&duplicate_groups),
        Err(DockError::DuplicateGroup(id)) if id == "g"
    ));

    let duplicate_panels: SerializedDock = serde_json::from_value(json!({
        "groups": [
            serialized_group("g1", json!([serialized_panel("dup", "default")])),
            serialized_group("g2", json!([serialized_panel("dup", "default")]))
        ]
    }))
    .unwrap();
    assert!(matches!(
        c.from_json(&duplicate_panels),
        Err(DockError::DuplicatePanel(id)) if id == "dup"
    ));
    assert!(c.groups().is_empty());
}
