//! Services shared by every group and tab of one component

use std::rc::Rc;

use crate::config::LayoutConfig;
use crate::dom::Element;
use crate::droptarget::DragRegistry;
use crate::scheduler::TaskQueue;

/// Injected collaborators of a dock component
///
/// Two components may share a registry and task queue (drags between them
/// then resolve through the same store) as long as their accessor ids differ.
pub struct DockContext {
    /// Identifies the owning component in drag sessions
    pub accessor_id: String,
    pub registry: Rc<DragRegistry>,
    pub tasks: Rc<TaskQueue>,
    /// Where transient elements (drag ghosts) are attached
    pub body: Element,
    pub config: LayoutConfig,
}

impl DockContext {
    /// Context with its own registry, task queue and body element
    pub fn new(accessor_id: impl Into<String>, config: LayoutConfig) -> Self {
        Self {
            accessor_id: accessor_id.into(),
            registry: Rc::new(DragRegistry::new()),
            tasks: Rc::new(TaskQueue::new()),
            body: Element::new("body"),
            config,
        }
    }

    pub fn with_registry(mut self, registry: Rc<DragRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_tasks(mut self, tasks: Rc<TaskQueue>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn with_body(mut self, body: Element) -> Self {
        self.body = body;
        self
    }
}
