//! Native input events as the host reports them

use std::collections::BTreeMap;

use super::Element;

/// MIME type of the drag payload on the native channel
pub const TEXT_PLAIN: &str = "text/plain";

/// A pointer press on an element
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerEvent {
    pub client_x: f32,
    pub client_y: f32,
    /// Something upstream already handled this press
    pub default_prevented: bool,
}

/// Operations a drag source allows on drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropEffect {
    #[default]
    Uninitialized,
    None,
    Copy,
    Move,
    Link,
    All,
}

/// Ghost image shown under the pointer while dragging
#[derive(Debug, Clone)]
pub struct DragImage {
    pub element: Element,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// The untyped, string-keyed channel a drag carries between source and target
#[derive(Debug, Clone, Default)]
pub struct DataTransfer {
    data: BTreeMap<String, String>,
    pub effect_allowed: DropEffect,
    drag_image: Option<DragImage>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, format: &str, data: impl Into<String>) {
        self.data.insert(format.to_string(), data.into());
    }

    /// Data for `format`; empty when absent, as on the web platform
    pub fn get_data(&self, format: &str) -> String {
        self.data.get(format).cloned().unwrap_or_default()
    }

    pub fn has_type(&self, format: &str) -> bool {
        self.data.contains_key(format)
    }

    pub fn types(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    pub fn clear_data(&mut self) {
        self.data.clear();
    }

    pub fn set_drag_image(&mut self, element: Element, offset_x: f32, offset_y: f32) {
        self.drag_image = Some(DragImage {
            element,
            offset_x,
            offset_y,
        });
    }

    pub fn drag_image(&self) -> Option<&DragImage> {
        self.drag_image.as_ref()
    }
}

/// Any of dragstart, dragenter, dragover, dragleave, drop or dragend
///
/// Offsets are relative to the element the event is delivered to.
#[derive(Debug, Clone, Default)]
pub struct DragEvent {
    pub offset_x: f32,
    pub offset_y: f32,
    pub data_transfer: DataTransfer,
}

impl DragEvent {
    pub fn at(offset_x: f32, offset_y: f32) -> Self {
        Self {
            offset_x,
            offset_y,
            data_transfer: DataTransfer::new(),
        }
    }

    pub fn with_data_transfer(mut self, data_transfer: DataTransfer) -> Self {
        self.data_transfer = data_transfer;
        self
    }
}
