//! The slice of the dock component handed to panel parts

use std::rc::Rc;

use crate::dom::Element;
use crate::event::Event;
use crate::panel::GroupPanel;

/// Options a component was created with
#[derive(Debug, Clone)]
pub struct ContainerOptions {
    /// Element the component mounts its groups into
    pub parent_element: Element,
}

impl ContainerOptions {
    pub fn new(parent_element: Element) -> Self {
        Self { parent_element }
    }
}

/// Subscribe-only view of the top-level container
#[derive(Clone)]
pub struct ContainerApi {
    on_did_add_panel: Event<Rc<GroupPanel>>,
    on_did_remove_panel: Event<Rc<GroupPanel>>,
    options: Rc<ContainerOptions>,
}

impl ContainerApi {
    pub fn new(
        on_did_add_panel: Event<Rc<GroupPanel>>,
        on_did_remove_panel: Event<Rc<GroupPanel>>,
        options: Rc<ContainerOptions>,
    ) -> Self {
        Self {
            on_did_add_panel,
            on_did_remove_panel,
            options,
        }
    }

    /// Fired after a panel enters the container (not on moves between groups)
    pub fn on_did_add_panel(&self) -> Event<Rc<GroupPanel>> {
        self.on_did_add_panel.clone()
    }

    /// Fired after a panel leaves the container (not on moves between groups)
    pub fn on_did_remove_panel(&self) -> Event<Rc<GroupPanel>> {
        self.on_did_remove_panel.clone()
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }
}
