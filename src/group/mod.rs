//! Tabbed panel groups
//!
//! A [`Group`] holds an ordered list of panels, shows one tab per panel, and
//! enforces that at most one panel is active at a time. It is the authority
//! on activeness: a panel may only *request* to become active (through its
//! API); the group decides and notifies every member.
//!
//! Groups own their member panels for as long as they are members. A panel
//! refers back to its group weakly.

mod tab;

pub use tab::{DragState, Tab, TabChangedEvent, TabDropEvent};

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::context::DockContext;
use crate::dom::{Element, Rect};
use crate::droptarget::{DragPayload, Droptarget, DroptargetOptions, Position};
use crate::error::DockError;
use crate::event::{Emitter, Event};
use crate::lifecycle::{CompositeDisposable, Disposable};
use crate::panel::GroupPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupChangeKind {
    AddPanel,
    RemovePanel,
    /// The group's active panel changed
    PanelActive,
    /// The group itself gained or lost focus
    GroupActive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupChangeEvent {
    pub kind: GroupChangeKind,
    pub panel_id: Option<String>,
}

/// A panel dropped somewhere on this group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDropEvent {
    /// Group the dragged panel comes from
    pub source_group_id: String,
    /// The dragged panel
    pub item_id: String,
    /// This group
    pub target_group_id: String,
    pub position: Position,
    /// Tab index the panel was dropped onto, for drops on the tab strip
    pub index: Option<usize>,
}

/// One tab strip entry and the subscriptions tying it to its panel
struct TabEntry {
    tab: Rc<Tab>,
    subscriptions: CompositeDisposable,
}

impl TabEntry {
    fn dispose(&self) {
        self.subscriptions.dispose();
        self.tab.dispose();
    }
}

pub struct Group {
    id: String,
    this: Weak<Group>,
    ctx: Rc<DockContext>,
    element: Element,
    tab_strip: Element,
    body: Element,
    panels: RefCell<Vec<Rc<GroupPanel>>>,
    tabs: RefCell<Vec<TabEntry>>,
    active_panel: RefCell<Option<Rc<GroupPanel>>>,
    is_active: Cell<bool>,
    tab_height: Cell<f32>,
    size: Cell<(f32, f32)>,
    droptarget: Rc<Droptarget>,
    on_did_group_change: Emitter<GroupChangeEvent>,
    on_drop: Emitter<GroupDropEvent>,
    disposables: CompositeDisposable,
    disposed: Cell<bool>,
}

impl Group {
    pub fn new(id: impl Into<String>, ctx: Rc<DockContext>) -> Rc<Self> {
        let id = id.into();
        let element = Element::with_class("groupview");
        let tab_strip = Element::with_class("tabs-and-actions-container");
        let body = Element::with_class("content-container");
        element.append_child(&tab_strip);
        element.append_child(&body);

        let droptarget = Rc::new(Droptarget::new(
            body.clone(),
            DroptargetOptions::new(ctx.accessor_id.clone())
                .directional(true)
                .edge_threshold(ctx.config.drop_edge_threshold),
            ctx.registry.clone(),
        ));

        let group = Rc::new_cyclic(|this| Self {
            id,
            this: this.clone(),
            tab_height: Cell::new(ctx.config.tab_height),
            ctx,
            element,
            tab_strip,
            body,
            panels: RefCell::new(Vec::new()),
            tabs: RefCell::new(Vec::new()),
            active_panel: RefCell::new(None),
            is_active: Cell::new(false),
            size: Cell::new((0.0, 0.0)),
            droptarget,
            on_did_group_change: Emitter::new(),
            on_drop: Emitter::new(),
            disposables: CompositeDisposable::new(),
            disposed: Cell::new(false),
        });

        let this = group.this.clone();
        group
            .disposables
            .add(group.droptarget.on_did_change().subscribe(move |event| {
                let Some(group) = this.upgrade() else {
                    return;
                };
                let Some(payload) = DragPayload::read(
                    &event.data_transfer,
                    &group.ctx.registry,
                    &group.ctx.accessor_id,
                ) else {
                    return;
                };
                group.defer_drop(GroupDropEvent {
                    source_group_id: payload.group_id,
                    item_id: payload.item_id,
                    target_group_id: group.id.clone(),
                    position: event.position,
                    index: None,
                });
            }));

        group.disposables.add(group.droptarget.clone());
        group.disposables.add(group.on_did_group_change.clone());
        group.disposables.add(group.on_drop.clone());
        group
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Drop zone covering the group body
    pub fn droptarget(&self) -> &Droptarget {
        &self.droptarget
    }

    pub fn on_did_group_change(&self) -> Event<GroupChangeEvent> {
        self.on_did_group_change.event()
    }

    /// Fired (on the next task-queue turn) when a panel is dropped on this group
    pub fn on_drop(&self) -> Event<GroupDropEvent> {
        self.on_drop.event()
    }

    pub fn tab_height(&self) -> f32 {
        self.tab_height.get()
    }

    pub fn set_tab_height(&self, height: f32) {
        self.tab_height.set(height);
    }

    /// Whether this group has focus within its component
    pub fn is_active(&self) -> bool {
        self.is_active.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub fn panels(&self) -> Vec<Rc<GroupPanel>> {
        self.panels.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.panels.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.borrow().is_empty()
    }

    pub fn contains_panel(&self, panel_id: &str) -> bool {
        self.index_of(panel_id).is_some()
    }

    pub fn index_of(&self, panel_id: &str) -> Option<usize> {
        self.panels.borrow().iter().position(|p| p.id() == panel_id)
    }

    pub fn panel(&self, panel_id: &str) -> Option<Rc<GroupPanel>> {
        self.panels
            .borrow()
            .iter()
            .find(|p| p.id() == panel_id)
            .cloned()
    }

    pub fn active_panel(&self) -> Option<Rc<GroupPanel>> {
        self.active_panel.borrow().clone()
    }

    pub fn is_panel_active(&self, panel_id: &str) -> bool {
        self.active_panel
            .borrow()
            .as_ref()
            .is_some_and(|p| p.id() == panel_id)
    }

    pub fn tab(&self, panel_id: &str) -> Option<Rc<Tab>> {
        self.tabs
            .borrow()
            .iter()
            .find(|entry| entry.tab.id() == panel_id)
            .map(|entry| entry.tab.clone())
    }

    fn rc(&self) -> Option<Rc<Group>> {
        self.this.upgrade()
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Add `panel` (or move it, if already a member) at `index` and activate it
    pub fn open_panel(&self, panel: Rc<GroupPanel>, index: Option<usize>) {
        let existing = self.index_of(panel.id());
        let len = self.len();
        let index = index
            .unwrap_or(existing.unwrap_or(len))
            .min(if existing.is_some() { len - 1 } else { len });

        match existing {
            Some(from) if from != index => {
                let mut panels = self.panels.borrow_mut();
                let moved = panels.remove(from);
                panels.insert(index, moved);
                drop(panels);
                self.reorder_tab(from, index);
            }
            Some(_) => {}
            None => {
                self.panels.borrow_mut().insert(index, panel.clone());
                self.insert_tab(&panel, index);
                // AddPanel listeners must already see the new membership
                if let Some(group) = self.rc() {
                    panel.attach_group(&group);
                }
                tracing::debug!(group_id = %self.id, panel_id = %panel.id(), index, "panel added");
                self.on_did_group_change.fire(GroupChangeEvent {
                    kind: GroupChangeKind::AddPanel,
                    panel_id: Some(panel.id().to_string()),
                });
            }
        }

        self.do_set_active_panel(Some(panel));
    }

    /// Detach a panel without disposing it
    ///
    /// If it was active, its left neighbour (or the new first panel) becomes
    /// active.
    pub fn remove_panel(&self, panel_id: &str) -> Option<Rc<GroupPanel>> {
        let index = self.index_of(panel_id)?;
        let panel = self.panels.borrow_mut().remove(index);

        let entry = {
            let mut tabs = self.tabs.borrow_mut();
            tabs.iter()
                .position(|entry| entry.tab.id() == panel_id)
                .map(|i| tabs.remove(i))
        };
        if let Some(entry) = entry {
            self.tab_strip.remove_child(entry.tab.element());
            entry.dispose();
        }

        let was_active = self.is_panel_active(panel_id);
        if was_active {
            *self.active_panel.borrow_mut() = None;
            panel.api().notify_active_change(false);
        }

        tracing::debug!(group_id = %self.id, panel_id, "panel removed");
        self.on_did_group_change.fire(GroupChangeEvent {
            kind: GroupChangeKind::RemovePanel,
            panel_id: Some(panel_id.to_string()),
        });

        if was_active {
            let next = {
                let panels = self.panels.borrow();
                panels.get(index.saturating_sub(1)).cloned()
            };
            self.do_set_active_panel(next);
        }

        Some(panel)
    }

    /// Close a panel through its veto hook
    ///
    /// Returns `Ok(false)` and leaves the panel in place when the hook
    /// declines or fails. On `Ok(true)` the panel is removed and disposed.
    pub fn close_panel(&self, panel_id: &str) -> Result<bool, DockError> {
        let panel = self
            .panel(panel_id)
            .ok_or_else(|| DockError::UnknownPanel(panel_id.to_string()))?;

        match panel.close() {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(group_id = %self.id, panel_id, "close vetoed");
                return Ok(false);
            }
            Err(e) => {
                tracing::warn!(group_id = %self.id, panel_id, "close hook failed, keeping panel: {:#}", e);
                return Ok(false);
            }
        }

        self.remove_panel(panel_id);
        if let Err(e) = panel.try_dispose() {
            tracing::warn!(group_id = %self.id, "{}", e);
        }
        Ok(true)
    }

    /// Make the member `panel_id` the active panel
    pub fn set_active_panel(&self, panel_id: &str) -> Result<(), DockError> {
        let panel = self
            .panel(panel_id)
            .ok_or_else(|| DockError::UnknownPanel(panel_id.to_string()))?;
        self.do_set_active_panel(Some(panel));
        Ok(())
    }

    pub fn move_to_next(&self) {
        self.cycle(1);
    }

    pub fn move_to_previous(&self) {
        self.cycle(-1);
    }

    fn cycle(&self, step: isize) {
        let next = {
            let panels = self.panels.borrow();
            if panels.len() < 2 {
                return;
            }
            let current = self
                .active_panel()
                .and_then(|active| panels.iter().position(|p| p.id() == active.id()))
                .unwrap_or(0);
            let len = panels.len() as isize;
            let index = (current as isize + step).rem_euclid(len) as usize;
            panels[index].clone()
        };
        self.do_set_active_panel(Some(next));
    }

    /// Give or take focus for the whole group
    pub fn set_active(&self, is_active: bool) {
        self.is_active.set(is_active);
        self.element.toggle_class("active-group", is_active);
        self.element.toggle_class("inactive-group", !is_active);

        self.on_did_group_change.fire(GroupChangeEvent {
            kind: GroupChangeKind::GroupActive,
            panel_id: None,
        });
        self.sync_members();
    }

    /// Lay out the active panel in a `width` x `height` area
    pub fn layout(&self, width: f32, height: f32) {
        self.size.set((width, height));
        let tab_height = self.tab_height().min(height);
        self.element.set_bounds(Rect::new(0.0, 0.0, width, height));
        self.tab_strip
            .set_bounds(Rect::new(0.0, 0.0, width, tab_height));
        self.body.set_bounds(Rect::new(
            0.0,
            tab_height,
            width,
            (height - tab_height).max(0.0),
        ));
        if let Some(active) = self.active_panel() {
            active.layout(width, height);
        }
    }

    fn do_set_active_panel(&self, panel: Option<Rc<GroupPanel>>) {
        let previous = self.active_panel.replace(panel.clone());
        let changed = match (&previous, &panel) {
            (Some(a), Some(b)) => !Rc::ptr_eq(a, b),
            (None, None) => false,
            _ => true,
        };

        if changed {
            if let Some(previous) = &previous {
                previous.api().notify_active_change(false);
            }
            if let Some(panel) = &panel {
                panel.api().notify_active_change(true);
            }
            for entry in self.tabs.borrow().iter() {
                let is_active = panel.as_ref().is_some_and(|p| p.id() == entry.tab.id());
                entry.tab.set_active(is_active);
            }
            self.on_did_group_change.fire(GroupChangeEvent {
                kind: GroupChangeKind::PanelActive,
                panel_id: panel.as_ref().map(|p| p.id().to_string()),
            });
        }

        self.sync_members();

        let (width, height) = self.size.get();
        if let Some(panel) = panel {
            if width > 0.0 || height > 0.0 {
                panel.layout(width, height);
            }
        }
    }

    /// Re-run `set_visible` on every member
    fn sync_members(&self) {
        let Some(group) = self.rc() else {
            return;
        };
        for panel in self.panels() {
            panel.set_visible(self.is_active(), &group);
        }
    }

    // ========================================================================
    // Tab strip
    // ========================================================================

    fn insert_tab(&self, panel: &Rc<GroupPanel>, index: usize) {
        let tab = Rc::new(Tab::new(panel.id(), self.id.clone(), self.ctx.clone()));
        let subscriptions = CompositeDisposable::new();

        let this = self.this.clone();
        let panel_id = panel.id().to_string();
        subscriptions.add(tab.on_changed().subscribe(move |event| match event {
            TabChangedEvent::Click => {
                if let Some(group) = this.upgrade() {
                    if let Err(e) = group.set_active_panel(&panel_id) {
                        tracing::debug!(group_id = %group.id, "tab click ignored: {}", e);
                    }
                }
            }
        }));

        let this = self.this.clone();
        let tab_id = panel.id().to_string();
        subscriptions.add(tab.on_dropped().subscribe(move |event| {
            if let Some(group) = this.upgrade() {
                group.on_drop.fire(GroupDropEvent {
                    source_group_id: event.group_id.clone(),
                    item_id: event.item_id.clone(),
                    target_group_id: group.id.clone(),
                    position: event.target,
                    index: group.index_of(&tab_id),
                });
            }
        }));

        // An API-level activation request is decided here
        let this = self.this.clone();
        let panel_id = panel.id().to_string();
        subscriptions.add(panel.api().on_active_change().subscribe(move |_| {
            if let Some(group) = this.upgrade() {
                if let Err(e) = group.set_active_panel(&panel_id) {
                    tracing::debug!(group_id = %group.id, "activation request ignored: {}", e);
                }
            }
        }));

        let mut tabs = self.tabs.borrow_mut();
        let index = index.min(tabs.len());
        self.tab_strip.insert_child(index, tab.element());
        tabs.insert(index, TabEntry { tab, subscriptions });
    }

    /// Move a tab within the strip; the element order follows `tabs`
    fn reorder_tab(&self, from: usize, to: usize) {
        let mut tabs = self.tabs.borrow_mut();
        if from < tabs.len() {
            let entry = tabs.remove(from);
            let at = to.min(tabs.len());
            self.tab_strip.insert_child(at, entry.tab.element());
            tabs.insert(at, entry);
        }
    }

    /// Element holding the tabs, in panel order
    pub fn tab_strip(&self) -> &Element {
        &self.tab_strip
    }

    /// Element holding the active panel's content
    pub fn body(&self) -> &Element {
        &self.body
    }

    fn defer_drop(&self, event: GroupDropEvent) {
        let on_drop = self.on_drop.clone();
        // Let the native drop finish before anything is re-parented
        self.ctx
            .tasks
            .defer("group-dropped", move || on_drop.fire(event));
    }

    /// Dispose the tab strip and every member panel
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }

        let tabs = std::mem::take(&mut *self.tabs.borrow_mut());
        for entry in tabs {
            entry.dispose();
        }
        self.active_panel.borrow_mut().take();
        let panels = std::mem::take(&mut *self.panels.borrow_mut());
        for panel in panels {
            if let Err(e) = panel.try_dispose() {
                tracing::warn!(group_id = %self.id, "{}", e);
            }
        }

        self.disposables.dispose();
        tracing::debug!(group_id = %self.id, "group disposed");
    }
}

impl Disposable for Group {
    fn dispose(&self) {
        Group::dispose(self);
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let panel_ids: Vec<String> = self.panels().iter().map(|p| p.id().to_string()).collect();
        f.debug_struct("Group")
            .field("id", &self.id)
            .field("panels", &panel_ids)
            .field("active", &self.active_panel().map(|p| p.id().to_string()))
            .field("is_active", &self.is_active.get())
            .finish()
    }
}
