//! Panels and their parts
//!
//! A [`GroupPanel`] is the addressable unit of the layout: it lives in one
//! group at a time, owns a header part (the tab content) and a content part
//! (the body), and carries a [`GroupPanelApi`] that mirrors its state.
//!
//! Parts are external collaborators. The engine only drives them through
//! the [`PanelPart`] contract: init once, forward updates and visibility,
//! dispose with the panel.

mod group_panel;
mod serialize;

pub use group_panel::GroupPanel;
pub use serialize::SerializedGroupPanel;

use std::rc::Rc;

use crate::api::{ContainerApi, GroupPanelApi};
use crate::group::Group;

/// Opaque key-value bag passed through to parts untouched
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// Payload of a parameter update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelUpdateEvent {
    pub params: Parameters,
}

/// Anything that accepts parameter updates
pub trait Panel {
    fn id(&self) -> &str;
    fn update(&self, event: &PanelUpdateEvent);
}

/// Renderer of a panel's header or content
pub trait PanelPart {
    fn id(&self) -> &str;
    fn init(&self, params: &PartInitParams);
    fn update(&self, event: &PanelUpdateEvent);
    fn set_visible(&self, is_visible: bool, group: &Group);
    fn dispose(&self) -> anyhow::Result<()>;
}

/// Context handed to a part's `init`
#[derive(Clone)]
pub struct PartInitParams {
    pub params: Parameters,
    pub title: String,
    pub suppress_closable: bool,
    pub state: Option<Parameters>,
    pub api: Rc<GroupPanelApi>,
    pub container_api: ContainerApi,
}

/// Everything a panel is initialized with
#[derive(Clone, Default)]
pub struct PanelInitParams {
    pub params: Parameters,
    pub title: String,
    pub suppress_closable: bool,
    /// Seeds the API's state bag
    pub state: Option<Parameters>,
    pub header_part: Option<Rc<dyn PanelPart>>,
    pub content_part: Option<Rc<dyn PanelPart>>,
}

impl PanelInitParams {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_params(mut self, params: Parameters) -> Self {
        self.params = params;
        self
    }

    pub fn with_state(mut self, state: Parameters) -> Self {
        self.state = Some(state);
        self
    }

    pub fn suppress_closable(mut self, suppress: bool) -> Self {
        self.suppress_closable = suppress;
        self
    }

    pub fn with_header(mut self, part: Rc<dyn PanelPart>) -> Self {
        self.header_part = Some(part);
        self
    }

    pub fn with_content(mut self, part: Rc<dyn PanelPart>) -> Self {
        self.content_part = Some(part);
        self
    }

    /// Rebuild init params from a serialized panel and freshly created parts
    pub fn from_serialized(
        serialized: &SerializedGroupPanel,
        header_part: Option<Rc<dyn PanelPart>>,
        content_part: Option<Rc<dyn PanelPart>>,
    ) -> Self {
        Self {
            params: serialized.props.clone(),
            title: serialized.title.clone(),
            suppress_closable: serialized.suppress_closable,
            state: Some(serialized.state.clone()),
            header_part,
            content_part,
        }
    }
}
