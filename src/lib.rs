//! Dockyard - headless dockable panel layout
//!
//! This crate provides the core of a tabbed, dockable panel layout: an event
//! bus, disposable resource graphs, panel APIs, tabbed groups with drag and
//! drop, and the component that moves panels between groups.

pub mod api;
pub mod component;
pub mod config;
pub mod config_paths;
pub mod context;
pub mod dom;
pub mod droptarget;
pub mod error;
pub mod event;
pub mod group;
pub mod lifecycle;
pub mod panel;
pub mod scheduler;
pub mod tracing;

// Re-export commonly used types
pub use api::{ContainerApi, GroupPanelApi, PanelApi};
pub use component::{AddPanelOptions, DockComponent, MovePanel, SerializedDock};
pub use config::LayoutConfig;
pub use context::DockContext;
pub use droptarget::{DragPayload, DragRegistry, Droptarget, Position};
pub use error::DockError;
pub use event::{Emitter, Event};
pub use group::{Group, GroupChangeEvent, GroupChangeKind, Tab};
pub use lifecycle::{CompositeDisposable, Disposable, MutableDisposable, Subscription};
pub use panel::{GroupPanel, PanelInitParams, PanelPart, Parameters};
pub use scheduler::TaskQueue;
