//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dockyard::api::{ContainerApi, ContainerOptions};
use dockyard::component::DockComponent;
use dockyard::dom::Element;
use dockyard::event::Emitter;
use dockyard::group::Group;
use dockyard::panel::{PanelPart, PanelUpdateEvent, Parameters, PartInitParams};
use dockyard::{DockContext, LayoutConfig};

/// A part that records every call made to it
#[derive(Default)]
pub struct RecordingPart {
    pub id: String,
    pub inits: RefCell<Vec<PartInitParams>>,
    pub updates: RefCell<Vec<Parameters>>,
    pub visibility: RefCell<Vec<(bool, String)>>,
    pub dispose_count: Cell<usize>,
    /// Make `dispose` report an error
    pub fail_dispose: Cell<bool>,
}

impl RecordingPart {
    pub fn new(id: &str) -> Rc<Self> {
        Rc::new(Self {
            id: id.to_string(),
            ..Self::default()
        })
    }

    pub fn failing(id: &str) -> Rc<Self> {
        let part = Self::new(id);
        part.fail_dispose.set(true);
        part
    }

    pub fn last_visible(&self) -> Option<bool> {
        self.visibility.borrow().last().map(|(v, _)| *v)
    }
}

impl PanelPart for RecordingPart {
    fn id(&self) -> &str {
        &self.id
    }

    fn init(&self, params: &PartInitParams) {
        self.inits.borrow_mut().push(params.clone());
    }

    fn update(&self, event: &PanelUpdateEvent) {
        self.updates.borrow_mut().push(event.params.clone());
    }

    fn set_visible(&self, is_visible: bool, group: &Group) {
        self.visibility
            .borrow_mut()
            .push((is_visible, group.id().to_string()));
    }

    fn dispose(&self) -> anyhow::Result<()> {
        self.dispose_count.set(self.dispose_count.get() + 1);
        if self.fail_dispose.get() {
            anyhow::bail!("{} refused to dispose", self.id);
        }
        Ok(())
    }
}

pub fn context() -> Rc<DockContext> {
    Rc::new(DockContext::new("dock-1", LayoutConfig::default()))
}

/// A container API not backed by any component
pub fn detached_container_api() -> ContainerApi {
    ContainerApi::new(
        Emitter::new().event(),
        Emitter::new().event(),
        Rc::new(ContainerOptions::new(Element::new("div"))),
    )
}

/// Build a `key -> value` parameter bag from JSON
pub fn params(value: serde_json::Value) -> Parameters {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// A component with `"default"` and `"failing"` content parts and a `"tab"`
/// header part registered; every created part is recorded in `parts`
pub struct Fixture {
    pub ctx: Rc<DockContext>,
    pub component: Rc<DockComponent>,
    pub parts: Rc<RefCell<Vec<Rc<RecordingPart>>>>,
}

pub fn fixture() -> Fixture {
    let ctx = context();
    let component = DockComponent::new(ctx.clone(), ContainerOptions::new(Element::new("div")));
    let parts: Rc<RefCell<Vec<Rc<RecordingPart>>>> = Rc::new(RefCell::new(Vec::new()));

    for (name, is_tab) in [("default", false), ("tab", true)] {
        let parts = parts.clone();
        let factory = move |name: &str| -> Option<Rc<dyn PanelPart>> {
            let part = RecordingPart::new(name);
            parts.borrow_mut().push(part.clone());
            Some(part)
        };
        if is_tab {
            component.register_tab_component(name, factory);
        } else {
            component.register_component(name, factory);
        }
    }

    // Content part whose dispose always fails
    let failing = parts.clone();
    component.register_component("failing", move |name: &str| -> Option<Rc<dyn PanelPart>> {
        let part = RecordingPart::failing(name);
        failing.borrow_mut().push(part.clone());
        Some(part)
    });

    Fixture {
        ctx,
        component,
        parts,
    }
}

pub fn panel_ids(group: &Group) -> Vec<String> {
    group.panels().iter().map(|p| p.id().to_string()).collect()
}
