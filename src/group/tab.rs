//! A panel's entry in a group's tab strip
//!
//! The tab is both a drag source (its panel can be dragged out) and a drop
//! target (another panel can be dropped onto it). Drag state machine:
//!
//! ```text
//! Idle --dragstart--> Dragging { session } --dragend--> Idle
//! ```
//!
//! Drag end always clears the registry entry of the session, whether or not
//! a drop happened.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::DockContext;
use crate::dom::{DragEvent, DropEffect, Element, PointerEvent, TEXT_PLAIN};
use crate::droptarget::{DragPayload, DragSessionId, Droptarget, DroptargetOptions, Position};
use crate::event::{Emitter, Event};
use crate::lifecycle::{CompositeDisposable, Disposable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabChangedEvent {
    Click,
}

/// A panel dropped onto this tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabDropEvent {
    /// Group the dragged panel comes from
    pub group_id: String,
    /// The dragged panel
    pub item_id: String,
    pub target: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        session: DragSessionId,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }
}

pub struct Tab {
    id: String,
    group_id: String,
    element: Element,
    content: RefCell<Option<Element>>,
    drag_state: Rc<RefCell<DragState>>,
    droptarget: Rc<Droptarget>,
    ctx: Rc<DockContext>,
    on_changed: Emitter<TabChangedEvent>,
    on_dropped: Emitter<TabDropEvent>,
    disposables: CompositeDisposable,
}

impl Tab {
    pub fn new(id: impl Into<String>, group_id: impl Into<String>, ctx: Rc<DockContext>) -> Self {
        let element = Element::with_class("tab");
        element.set_draggable(true);

        let drag_state = Rc::new(RefCell::new(DragState::Idle));
        let dragging = drag_state.clone();
        let droptarget = Rc::new(Droptarget::new(
            element.clone(),
            DroptargetOptions::new(ctx.accessor_id.clone())
                .edge_threshold(ctx.config.drop_edge_threshold)
                .disabled_when(move || dragging.borrow().is_dragging()),
            ctx.registry.clone(),
        ));

        let tab = Self {
            id: id.into(),
            group_id: group_id.into(),
            element,
            content: RefCell::new(None),
            drag_state,
            droptarget,
            ctx,
            on_changed: Emitter::new(),
            on_dropped: Emitter::new(),
            disposables: CompositeDisposable::new(),
        };

        let on_dropped = tab.on_dropped.clone();
        let registry = tab.ctx.registry.clone();
        let tasks = tab.ctx.tasks.clone();
        let accessor_id = tab.ctx.accessor_id.clone();
        tab.disposables
            .add(tab.droptarget.on_did_change().subscribe(move |event| {
                let Some(payload) =
                    DragPayload::read(&event.data_transfer, &registry, &accessor_id)
                else {
                    return;
                };
                let on_dropped = on_dropped.clone();
                let target = event.position;
                // Let the native drop finish before anything is re-parented
                tasks.defer("tab-dropped", move || {
                    on_dropped.fire(TabDropEvent {
                        group_id: payload.group_id,
                        item_id: payload.item_id,
                        target,
                    });
                });
            }));

        tab.disposables.add(tab.on_changed.clone());
        tab.disposables.add(tab.on_dropped.clone());
        tab.disposables.add(tab.droptarget.clone());
        tab
    }

    /// Id of the panel this tab represents
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn droptarget(&self) -> &Droptarget {
        &self.droptarget
    }

    pub fn drag_state(&self) -> DragState {
        self.drag_state.borrow().clone()
    }

    pub fn has_active_drag_event(&self) -> bool {
        self.drag_state.borrow().is_dragging()
    }

    pub fn on_changed(&self) -> Event<TabChangedEvent> {
        self.on_changed.event()
    }

    pub fn on_dropped(&self) -> Event<TabDropEvent> {
        self.on_dropped.event()
    }

    pub fn set_active(&self, is_active: bool) {
        self.element.toggle_class("active-tab", is_active);
        self.element.toggle_class("inactive-tab", !is_active);
    }

    /// Replace the tab's rendered content
    pub fn set_content(&self, content: Element) {
        let previous = self.content.borrow_mut().replace(content.clone());
        if let Some(previous) = previous {
            self.element.remove_child(&previous);
        }
        self.element.append_child(&content);
    }

    // ========================================================================
    // Native event handlers
    // ========================================================================

    pub fn handle_pointer_down(&self, event: &PointerEvent) {
        if event.default_prevented {
            return;
        }
        self.on_changed.fire(TabChangedEvent::Click);
    }

    pub fn handle_drag_start(&self, event: &mut DragEvent) {
        // A drag start without a matching drag end must not leak its session
        let stale = std::mem::take(&mut *self.drag_state.borrow_mut());
        if let DragState::Dragging { session } = stale {
            tracing::debug!(tab_id = %self.id, %session, "replacing unfinished drag session");
            self.ctx.registry.remove_data(&session);
        }

        let session = self.ctx.registry.begin_session(&self.ctx.accessor_id);

        // Ghost image; styling inherited from the tab strip is lost once the
        // clone is detached, so size and colour are pinned explicitly
        let drag_image = self.element.clone_node(true);
        let bounds = self.element.bounds();
        drag_image.set_style("height", format!("{}px", bounds.height));
        drag_image.set_style("width", format!("{}px", bounds.width));
        drag_image.set_style("color", self.ctx.config.drag_image_color.clone());
        self.ctx.body.append_child(&drag_image);
        event
            .data_transfer
            .set_drag_image(drag_image.clone(), event.offset_x, event.offset_y);

        let body = self.ctx.body.clone();
        self.ctx.tasks.defer("remove-drag-image", move || {
            body.remove_child(&drag_image);
        });

        let data = DragPayload::new(self.id.clone(), self.group_id.clone()).to_json();
        self.ctx.registry.set_data(&session, data.clone());
        event.data_transfer.set_data(TEXT_PLAIN, data);
        event.data_transfer.effect_allowed = DropEffect::Move;

        tracing::debug!(tab_id = %self.id, group_id = %self.group_id, %session, "drag started");
        *self.drag_state.borrow_mut() = DragState::Dragging { session };
    }

    pub fn handle_drag_end(&self, _event: &DragEvent) {
        // Drop fires before drag end, so the payload is no longer needed
        let state = std::mem::take(&mut *self.drag_state.borrow_mut());
        if let DragState::Dragging { session } = state {
            self.ctx.registry.remove_data(&session);
            tracing::debug!(tab_id = %self.id, %session, "drag ended");
        }
    }
}

impl Disposable for Tab {
    fn dispose(&self) {
        // An in-flight drag still owns its registry entry
        let state = std::mem::take(&mut *self.drag_state.borrow_mut());
        if let DragState::Dragging { session } = state {
            self.ctx.registry.remove_data(&session);
        }
        self.disposables.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::dom::Rect;
    use std::cell::Cell;

    fn context() -> Rc<DockContext> {
        Rc::new(DockContext::new("dock", LayoutConfig::default()))
    }

    #[test]
    fn test_new_tab_is_draggable_and_idle() {
        let tab = Tab::new("panel-1", "group-1", context());
        assert!(tab.element().is_draggable());
        assert!(tab.element().has_class("tab"));
        assert_eq!(tab.drag_state(), DragState::Idle);
        assert!(!tab.has_active_drag_event());
    }

    #[test]
    fn test_pointer_down_respects_default_prevented() {
        let tab = Tab::new("p", "g", context());
        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        let _sub = tab.on_changed().subscribe(move |_| c.set(c.get() + 1));

        tab.handle_pointer_down(&PointerEvent {
            default_prevented: true,
            ..PointerEvent::default()
        });
        assert_eq!(clicks.get(), 0);

        tab.handle_pointer_down(&PointerEvent::default());
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_drag_image_is_sized_and_removed_next_turn() {
        let ctx = context();
        let tab = Tab::new("p", "g", ctx.clone());
        tab.element().set_bounds(Rect::new(0.0, 0.0, 120.0, 35.0));

        let mut event = DragEvent::at(4.0, 6.0);
        tab.handle_drag_start(&mut event);

        let image = event.data_transfer.drag_image().unwrap();
        assert_eq!(image.element.style("width").as_deref(), Some("120px"));
        assert_eq!(image.element.style("height").as_deref(), Some("35px"));
        assert_eq!((image.offset_x, image.offset_y), (4.0, 6.0));
        assert!(ctx.body.contains_child(&image.element));

        ctx.tasks.run_pending();
        assert_eq!(ctx.body.child_count(), 0);
    }

    #[test]
    fn test_set_active_toggles_classes() {
        let tab = Tab::new("p", "g", context());
        tab.set_active(true);
        assert!(tab.element().has_class("active-tab"));
        assert!(!tab.element().has_class("inactive-tab"));
        tab.set_active(false);
        assert!(!tab.element().has_class("active-tab"));
        assert!(tab.element().has_class("inactive-tab"));
    }

    #[test]
    fn test_set_content_replaces_previous() {
        let tab = Tab::new("p", "g", context());
        let first = Element::with_class("label");
        let second = Element::with_class("label");
        tab.set_content(first.clone());
        tab.set_content(second.clone());
        assert!(!tab.element().contains_child(&first));
        assert!(tab.element().contains_child(&second));
    }

    #[test]
    fn test_repeated_drag_start_does_not_leak() {
        let ctx = context();
        let tab = Tab::new("p", "g", ctx.clone());
        tab.handle_drag_start(&mut DragEvent::default());
        tab.handle_drag_start(&mut DragEvent::default());
        assert_eq!(ctx.registry.len(), 1);

        tab.handle_drag_end(&DragEvent::default());
        assert!(ctx.registry.is_empty());
    }

    #[test]
    fn test_dispose_mid_drag_clears_registry() {
        let ctx = context();
        let tab = Tab::new("p", "g", ctx.clone());
        tab.handle_drag_start(&mut DragEvent::default());
        tab.dispose();
        assert!(ctx.registry.is_empty());
    }
}
