//! Drop zones
//!
//! A [`Droptarget`] watches drag events delivered to one element, overlays a
//! drop zone while a compatible drag hovers it, resolves which part of the
//! element the pointer is over, and reports a [`DroptargetEvent`] on drop.
//!
//! Directional targets split the element into four edge bands plus the
//! center; non-directional targets only ever resolve to [`Position::Center`].

mod data_transfer;

pub use data_transfer::{DragPayload, DragRegistry, DragSessionId, DRAG_TYPE};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dom::{DataTransfer, DragEvent, Element, TEXT_PLAIN};
use crate::event::{Emitter, Event};
use crate::lifecycle::{CompositeDisposable, Disposable};

/// Where on a target element a drop lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

impl Position {
    /// Selection class applied to the overlay for this position
    fn selection_class(self) -> Option<&'static str> {
        match self {
            Position::Top => Some("top"),
            Position::Bottom => Some("bottom"),
            Position::Left => Some("left"),
            Position::Right => Some("right"),
            Position::Center => None,
        }
    }

    /// Resolve a pointer offset inside `width` x `height`
    ///
    /// `threshold` is the edge band as a percentage of each dimension.
    pub fn from_offset(x: f32, y: f32, width: f32, height: f32, threshold: f32) -> Position {
        if width <= 0.0 || height <= 0.0 {
            return Position::Center;
        }
        let xp = 100.0 * x / width;
        let yp = 100.0 * y / height;

        if xp > 100.0 - threshold {
            Position::Right
        } else if xp < threshold {
            Position::Left
        } else if yp < threshold {
            Position::Top
        } else if yp > 100.0 - threshold {
            Position::Bottom
        } else {
            Position::Center
        }
    }
}

/// A drop resolved against a target
#[derive(Debug, Clone)]
pub struct DroptargetEvent {
    pub position: Position,
    pub data_transfer: DataTransfer,
}

pub struct DroptargetOptions {
    /// Resolve edge positions rather than always `Center`
    pub is_directional: bool,
    /// Accessor id of the owning component; drags it started are accepted
    pub id: String,
    /// Edge band in percent of the element size
    pub edge_threshold: f32,
    /// Consulted on every event; a disabled target ignores drags
    pub is_disabled: Box<dyn Fn() -> bool>,
}

impl DroptargetOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            is_directional: false,
            id: id.into(),
            edge_threshold: 20.0,
            is_disabled: Box::new(|| false),
        }
    }

    pub fn directional(mut self, is_directional: bool) -> Self {
        self.is_directional = is_directional;
        self
    }

    pub fn edge_threshold(mut self, percent: f32) -> Self {
        self.edge_threshold = percent;
        self
    }

    pub fn disabled_when(mut self, is_disabled: impl Fn() -> bool + 'static) -> Self {
        self.is_disabled = Box::new(is_disabled);
        self
    }
}

pub struct Droptarget {
    element: Element,
    options: DroptargetOptions,
    registry: Rc<DragRegistry>,
    overlay: RefCell<Option<Element>>,
    position: Cell<Option<Position>>,
    on_did_change: Emitter<DroptargetEvent>,
    disposables: CompositeDisposable,
}

impl Droptarget {
    pub fn new(element: Element, options: DroptargetOptions, registry: Rc<DragRegistry>) -> Self {
        let on_did_change = Emitter::new();
        let disposables = CompositeDisposable::new();
        disposables.add(on_did_change.clone());

        Self {
            element,
            options,
            registry,
            overlay: RefCell::new(None),
            position: Cell::new(None),
            on_did_change,
            disposables,
        }
    }

    pub fn on_did_change(&self) -> Event<DroptargetEvent> {
        self.on_did_change.event()
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Position the pointer currently resolves to, while a drag hovers
    pub fn state(&self) -> Option<Position> {
        self.position.get()
    }

    pub fn is_showing_overlay(&self) -> bool {
        self.overlay.borrow().is_some()
    }

    fn is_disabled(&self) -> bool {
        (self.options.is_disabled)()
    }

    fn accepts(&self, event: &DragEvent) -> bool {
        self.registry.has_accessor(&self.options.id) || event.data_transfer.has_type(TEXT_PLAIN)
    }

    pub fn handle_drag_enter(&self, event: &DragEvent) {
        if self.is_disabled() || !self.accepts(event) {
            return;
        }
        if self.overlay.borrow().is_none() {
            let overlay = Element::with_class("drop-target-dropzone");
            let selection = Element::with_class("drop-target-selection");
            overlay.append_child(&selection);
            self.element.append_child(&overlay);
            *self.overlay.borrow_mut() = Some(overlay);
        }
        self.handle_drag_over(event);
    }

    pub fn handle_drag_over(&self, event: &DragEvent) {
        let Some(overlay) = self.overlay.borrow().clone() else {
            return;
        };
        if self.is_disabled() {
            self.remove_overlay();
            return;
        }

        let position = if self.options.is_directional {
            let bounds = self.element.bounds();
            Position::from_offset(
                event.offset_x,
                event.offset_y,
                bounds.width,
                bounds.height,
                self.options.edge_threshold,
            )
        } else {
            Position::Center
        };

        for selection in overlay.children() {
            for class in ["top", "bottom", "left", "right"] {
                selection.toggle_class(class, position.selection_class() == Some(class));
            }
        }
        self.position.set(Some(position));
    }

    pub fn handle_drag_leave(&self, _event: &DragEvent) {
        self.remove_overlay();
    }

    pub fn handle_drop(&self, event: &DragEvent) {
        let position = self.position.get();
        self.remove_overlay();

        if self.is_disabled() {
            return;
        }
        let Some(position) = position else {
            return;
        };

        tracing::debug!(target_id = %self.options.id, ?position, "drop on target");
        self.on_did_change.fire(DroptargetEvent {
            position,
            data_transfer: event.data_transfer.clone(),
        });
    }

    fn remove_overlay(&self) {
        let overlay = self.overlay.borrow_mut().take();
        if let Some(overlay) = overlay {
            self.element.remove_child(&overlay);
        }
        self.position.set(None);
    }
}

impl Disposable for Droptarget {
    fn dispose(&self) {
        self.remove_overlay();
        self.disposables.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Rect;

    fn target(directional: bool) -> (Droptarget, Rc<DragRegistry>) {
        let element = Element::with_class("content");
        element.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        let registry = Rc::new(DragRegistry::new());
        let options = DroptargetOptions::new("dock").directional(directional);
        (Droptarget::new(element, options, registry.clone()), registry)
    }

    fn native_drag(x: f32, y: f32) -> DragEvent {
        let mut transfer = DataTransfer::new();
        transfer.set_data(TEXT_PLAIN, DragPayload::new("p", "g").to_json());
        DragEvent::at(x, y).with_data_transfer(transfer)
    }

    #[test]
    fn test_position_from_offset() {
        assert_eq!(Position::from_offset(90.0, 50.0, 100.0, 100.0, 20.0), Position::Right);
        assert_eq!(Position::from_offset(10.0, 50.0, 100.0, 100.0, 20.0), Position::Left);
        assert_eq!(Position::from_offset(50.0, 10.0, 100.0, 100.0, 20.0), Position::Top);
        assert_eq!(Position::from_offset(50.0, 90.0, 100.0, 100.0, 20.0), Position::Bottom);
        assert_eq!(Position::from_offset(50.0, 50.0, 100.0, 100.0, 20.0), Position::Center);
        assert_eq!(Position::from_offset(5.0, 5.0, 0.0, 0.0, 20.0), Position::Center);
    }

    #[test]
    fn test_directional_drop_reports_edge() {
        let (target, _registry) = target(true);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = target
            .on_did_change()
            .subscribe(move |e| sink.borrow_mut().push(e.position));

        target.handle_drag_enter(&native_drag(50.0, 50.0));
        assert!(target.is_showing_overlay());
        assert_eq!(target.state(), Some(Position::Center));

        target.handle_drag_over(&native_drag(95.0, 50.0));
        assert_eq!(target.state(), Some(Position::Right));

        target.handle_drop(&native_drag(95.0, 50.0));
        assert!(!target.is_showing_overlay());
        assert_eq!(target.element().child_count(), 0);
        assert_eq!(*seen.borrow(), vec![Position::Right]);
    }

    #[test]
    fn test_non_directional_always_center() {
        let (target, _registry) = target(false);
        target.handle_drag_enter(&native_drag(1.0, 1.0));
        assert_eq!(target.state(), Some(Position::Center));
    }

    #[test]
    fn test_unrecognized_drag_is_ignored() {
        let (target, _registry) = target(true);
        target.handle_drag_enter(&DragEvent::at(50.0, 50.0));
        assert!(!target.is_showing_overlay());
    }

    #[test]
    fn test_registry_session_makes_drag_recognizable() {
        let (target, registry) = target(true);
        let session = registry.begin_session("dock");
        registry.set_data(&session, "x");

        target.handle_drag_enter(&DragEvent::at(50.0, 50.0));
        assert!(target.is_showing_overlay());
    }

    #[test]
    fn test_drop_without_hover_does_not_fire() {
        let (target, _registry) = target(true);
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let _sub = target.on_did_change().subscribe(move |_| flag.set(true));

        target.handle_drop(&native_drag(50.0, 50.0));
        assert!(!fired.get());
    }

    #[test]
    fn test_drag_leave_clears_overlay() {
        let (target, _registry) = target(true);
        target.handle_drag_enter(&native_drag(50.0, 50.0));
        target.handle_drag_leave(&DragEvent::default());
        assert!(!target.is_showing_overlay());
        assert_eq!(target.state(), None);
    }
}
