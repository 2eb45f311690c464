//! Headless element tree
//!
//! The layout engine never renders. It keeps a small retained tree of
//! elements (class list, inline style, bounds, children) that a host maps
//! onto whatever it actually draws with. Elements are shared handles: cloning
//! an [`Element`] clones the handle, [`Element::clone_node`] copies the node.

mod events;

pub use events::{DataTransfer, DragEvent, DragImage, DropEffect, PointerEvent, TEXT_PLAIN};

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

// ============================================================================
// Geometry
// ============================================================================

/// Rectangle for layout calculations
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

// ============================================================================
// Element
// ============================================================================

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: String,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    draggable: bool,
    bounds: Rect,
    children: Vec<Element>,
}

/// Shared handle to a node in the element tree
#[derive(Debug, Clone)]
pub struct Element(Rc<RefCell<ElementData>>);

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Element {}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            tag: tag.to_string(),
            ..ElementData::default()
        })))
    }

    /// `div` with the given class name already applied
    pub fn with_class(class_name: &str) -> Self {
        let element = Self::new("div");
        element.set_class_name(class_name);
        element
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    /// Space-separated class list, as a DOM `className` would read
    pub fn class_name(&self) -> String {
        self.0.borrow().classes.join(" ")
    }

    pub fn set_class_name(&self, class_name: &str) {
        self.0.borrow_mut().classes = class_name.split_whitespace().map(str::to_string).collect();
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.0.borrow_mut().classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.retain(|c| c != class);
    }

    /// Add `class` when `enabled`, remove it otherwise
    pub fn toggle_class(&self, class: &str, enabled: bool) {
        if enabled {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.0.borrow().style.get(property).cloned()
    }

    pub fn set_style(&self, property: &str, value: impl Into<String>) {
        self.0
            .borrow_mut()
            .style
            .insert(property.to_string(), value.into());
    }

    pub fn is_draggable(&self) -> bool {
        self.0.borrow().draggable
    }

    pub fn set_draggable(&self, draggable: bool) {
        self.0.borrow_mut().draggable = draggable;
    }

    /// Last known on-screen bounds, as reported by the host
    pub fn bounds(&self) -> Rect {
        self.0.borrow().bounds
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.0.borrow_mut().bounds = bounds;
    }

    pub fn append_child(&self, child: &Element) {
        self.0.borrow_mut().children.push(child.clone());
    }

    /// Insert `child` before the child currently at `index`, or append when
    /// `index` is past the end. A child already present is moved.
    pub fn insert_child(&self, index: usize, child: &Element) {
        let mut data = self.0.borrow_mut();
        if let Some(existing) = data.children.iter().position(|c| c == child) {
            data.children.remove(existing);
        }
        let at = index.min(data.children.len());
        data.children.insert(at, child.clone());
    }

    /// Detach `child`; returns false when it was not a direct child
    pub fn remove_child(&self, child: &Element) -> bool {
        let mut data = self.0.borrow_mut();
        match data.children.iter().position(|c| c == child) {
            Some(index) => {
                data.children.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn contains_child(&self, child: &Element) -> bool {
        self.0.borrow().children.iter().any(|c| c == child)
    }

    /// Copy this node; `deep` copies the subtree as well
    pub fn clone_node(&self, deep: bool) -> Element {
        let data = self.0.borrow();
        let children = if deep {
            data.children.iter().map(|c| c.clone_node(true)).collect()
        } else {
            Vec::new()
        };
        Element(Rc::new(RefCell::new(ElementData {
            tag: data.tag.clone(),
            classes: data.classes.clone(),
            style: data.style.clone(),
            draggable: data.draggable,
            bounds: data.bounds,
            children,
        })))
    }
}
