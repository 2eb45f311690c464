//! Panel and container APIs
//!
//! - `PanelApi`: state mirror shared by every panel-like object
//! - `GroupPanelApi`: `PanelApi` plus group membership, title, dirty flag,
//!   state bag and close veto
//! - `ContainerApi`: what parts may observe of the top-level container

mod container_api;
mod group_panel_api;
mod panel_api;

pub use container_api::{ContainerApi, ContainerOptions};
pub use group_panel_api::{GroupChangedEvent, GroupPanelApi, TitleEvent, TryCloseHook};
pub use panel_api::{
    ActiveEvent, DimensionsEvent, FocusEvent, HiddenEvent, PanelApi, VisibilityEvent,
};
