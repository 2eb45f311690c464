//! Top-level dock component
//!
//! Owns an ordered list of groups and routes drops between them. The split
//! geometry of a grid layout is left to the embedder: a group created by an
//! edge drop is placed next to its target in [`DockComponent::groups`], and
//! the embedder decides how that order maps onto the screen.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::api::{ContainerApi, ContainerOptions};
use crate::context::DockContext;
use crate::droptarget::Position;
use crate::error::DockError;
use crate::event::{Emitter, Event};
use crate::group::{Group, GroupDropEvent};
use crate::lifecycle::{CompositeDisposable, Disposable};
use crate::panel::{GroupPanel, PanelInitParams, PanelPart, Parameters, SerializedGroupPanel};

/// Builds a part for a registered component name
pub type PartFactory = Rc<dyn Fn(&str) -> Option<Rc<dyn PanelPart>>>;

/// Request to create a panel
#[derive(Debug, Clone, Default)]
pub struct AddPanelOptions {
    pub id: String,
    /// Registered content component
    pub component: String,
    /// Registered tab component; the tab renders plain text when `None`
    pub tab_component: Option<String>,
    pub title: Option<String>,
    pub params: Parameters,
    pub suppress_closable: bool,
    /// Group to open the panel in; the active group when `None`
    pub group_id: Option<String>,
    pub index: Option<usize>,
}

impl AddPanelOptions {
    pub fn new(id: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component: component.into(),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn params(mut self, params: Parameters) -> Self {
        self.params = params;
        self
    }

    pub fn tab_component(mut self, component: impl Into<String>) -> Self {
        self.tab_component = Some(component.into());
        self
    }

    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

/// Request to move a panel between (or within) groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePanel {
    pub source_group: String,
    pub item_id: String,
    pub target_group: String,
    pub position: Position,
    pub index: Option<usize>,
}

impl From<GroupDropEvent> for MovePanel {
    fn from(event: GroupDropEvent) -> Self {
        Self {
            source_group: event.source_group_id,
            item_id: event.item_id,
            target_group: event.target_group_id,
            position: event.position,
            index: event.index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedGroup {
    pub id: String,
    pub panels: Vec<SerializedGroupPanel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_panel: Option<String>,
}

/// Persisted shape of a whole component
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedDock {
    pub groups: Vec<SerializedGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_group: Option<String>,
}

struct GroupEntry {
    group: Rc<Group>,
    subscriptions: CompositeDisposable,
}

pub struct DockComponent {
    this: Weak<DockComponent>,
    ctx: Rc<DockContext>,
    api: ContainerApi,
    groups: RefCell<Vec<GroupEntry>>,
    active_group: RefCell<Option<Rc<Group>>>,
    components: RefCell<HashMap<String, PartFactory>>,
    tab_components: RefCell<HashMap<String, PartFactory>>,
    next_group_id: Cell<usize>,
    on_did_add_panel: Emitter<Rc<GroupPanel>>,
    on_did_remove_panel: Emitter<Rc<GroupPanel>>,
    on_did_add_group: Emitter<Rc<Group>>,
    on_did_remove_group: Emitter<Rc<Group>>,
    on_did_active_group_change: Emitter<Option<Rc<Group>>>,
    disposables: CompositeDisposable,
    disposed: Cell<bool>,
}

impl DockComponent {
    pub fn new(ctx: Rc<DockContext>, options: ContainerOptions) -> Rc<Self> {
        let on_did_add_panel = Emitter::new();
        let on_did_remove_panel = Emitter::new();
        let api = ContainerApi::new(
            on_did_add_panel.event(),
            on_did_remove_panel.event(),
            Rc::new(options),
        );

        let component = Rc::new_cyclic(|this| Self {
            this: this.clone(),
            ctx,
            api,
            groups: RefCell::new(Vec::new()),
            active_group: RefCell::new(None),
            components: RefCell::new(HashMap::new()),
            tab_components: RefCell::new(HashMap::new()),
            next_group_id: Cell::new(1),
            on_did_add_panel,
            on_did_remove_panel,
            on_did_add_group: Emitter::new(),
            on_did_remove_group: Emitter::new(),
            on_did_active_group_change: Emitter::new(),
            disposables: CompositeDisposable::new(),
            disposed: Cell::new(false),
        });

        component.disposables.add(component.on_did_add_panel.clone());
        component.disposables.add(component.on_did_remove_panel.clone());
        component.disposables.add(component.on_did_add_group.clone());
        component.disposables.add(component.on_did_remove_group.clone());
        component
            .disposables
            .add(component.on_did_active_group_change.clone());

        tracing::debug!(accessor_id = %component.ctx.accessor_id, "dock component created");
        component
    }

    pub fn api(&self) -> ContainerApi {
        self.api.clone()
    }

    pub fn context(&self) -> &Rc<DockContext> {
        &self.ctx
    }

    pub fn on_did_add_panel(&self) -> Event<Rc<GroupPanel>> {
        self.on_did_add_panel.event()
    }

    pub fn on_did_remove_panel(&self) -> Event<Rc<GroupPanel>> {
        self.on_did_remove_panel.event()
    }

    pub fn on_did_add_group(&self) -> Event<Rc<Group>> {
        self.on_did_add_group.event()
    }

    pub fn on_did_remove_group(&self) -> Event<Rc<Group>> {
        self.on_did_remove_group.event()
    }

    pub fn on_did_active_group_change(&self) -> Event<Option<Rc<Group>>> {
        self.on_did_active_group_change.event()
    }

    // ========================================================================
    // Part registry
    // ========================================================================

    /// Register the content part factory for `name`
    pub fn register_component(
        &self,
        name: impl Into<String>,
        factory: impl Fn(&str) -> Option<Rc<dyn PanelPart>> + 'static,
    ) {
        self.components
            .borrow_mut()
            .insert(name.into(), Rc::new(factory));
    }

    /// Register the header part factory for `name`
    pub fn register_tab_component(
        &self,
        name: impl Into<String>,
        factory: impl Fn(&str) -> Option<Rc<dyn PanelPart>> + 'static,
    ) {
        self.tab_components
            .borrow_mut()
            .insert(name.into(), Rc::new(factory));
    }

    fn create_part(
        registry: &RefCell<HashMap<String, PartFactory>>,
        name: &str,
    ) -> Result<Rc<dyn PanelPart>, DockError> {
        let factory = registry
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| DockError::UnknownComponent(name.to_string()))?;
        factory(name).ok_or_else(|| DockError::UnknownComponent(name.to_string()))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn groups(&self) -> Vec<Rc<Group>> {
        self.groups
            .borrow()
            .iter()
            .map(|entry| entry.group.clone())
            .collect()
    }

    pub fn group(&self, group_id: &str) -> Option<Rc<Group>> {
        self.groups
            .borrow()
            .iter()
            .find(|entry| entry.group.id() == group_id)
            .map(|entry| entry.group.clone())
    }

    fn group_index(&self, group_id: &str) -> Option<usize> {
        self.groups
            .borrow()
            .iter()
            .position(|entry| entry.group.id() == group_id)
    }

    pub fn active_group(&self) -> Option<Rc<Group>> {
        self.active_group.borrow().clone()
    }

    pub fn panels(&self) -> Vec<Rc<GroupPanel>> {
        self.groups().iter().flat_map(|g| g.panels()).collect()
    }

    pub fn panel(&self, panel_id: &str) -> Option<Rc<GroupPanel>> {
        self.groups().iter().find_map(|g| g.panel(panel_id))
    }

    fn group_of(&self, panel_id: &str) -> Option<Rc<Group>> {
        self.groups()
            .into_iter()
            .find(|g| g.contains_panel(panel_id))
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Append an empty group
    pub fn add_group(&self) -> Rc<Group> {
        let index = self.groups.borrow().len();
        self.insert_group(index)
    }

    fn insert_group(&self, index: usize) -> Rc<Group> {
        let id = loop {
            let n = self.next_group_id.get();
            self.next_group_id.set(n + 1);
            let id = format!("group-{}", n);
            if self.group_index(&id).is_none() {
                break id;
            }
        };
        self.insert_group_with_id(index, id)
    }

    fn insert_group_with_id(&self, index: usize, id: String) -> Rc<Group> {
        let group = Group::new(id, self.ctx.clone());
        let subscriptions = CompositeDisposable::new();

        let this = self.this.clone();
        subscriptions.add(group.on_drop().subscribe(move |event| {
            if let Some(component) = this.upgrade() {
                if let Err(e) = component.move_panel(MovePanel::from(event.clone())) {
                    tracing::warn!("drop ignored: {}", e);
                }
            }
        }));

        self.api.options().parent_element.append_child(group.element());
        {
            let mut groups = self.groups.borrow_mut();
            let index = index.min(groups.len());
            groups.insert(
                index,
                GroupEntry {
                    group: group.clone(),
                    subscriptions,
                },
            );
        }

        tracing::debug!(group_id = %group.id(), index, "group added");
        self.on_did_add_group.fire(group.clone());
        group
    }

    /// Remove and dispose a group, with every panel still in it
    pub fn remove_group(&self, group_id: &str) -> Result<(), DockError> {
        let entry = {
            let mut groups = self.groups.borrow_mut();
            let index = groups
                .iter()
                .position(|entry| entry.group.id() == group_id)
                .ok_or_else(|| DockError::UnknownGroup(group_id.to_string()))?;
            groups.remove(index)
        };

        entry.subscriptions.dispose();
        self.api
            .options()
            .parent_element
            .remove_child(entry.group.element());

        let panels = entry.group.panels();
        entry.group.dispose();
        for panel in panels {
            self.on_did_remove_panel.fire(panel);
        }

        let was_active = self
            .active_group()
            .is_some_and(|g| Rc::ptr_eq(&g, &entry.group));
        if was_active {
            let fallback = self.groups().into_iter().last();
            self.do_set_active_group(fallback);
        }

        tracing::debug!(group_id, "group removed");
        self.on_did_remove_group.fire(entry.group);
        Ok(())
    }

    fn remove_group_if_empty(&self, group: &Group) {
        if group.is_empty() {
            if let Err(e) = self.remove_group(group.id()) {
                tracing::debug!("empty group already gone: {}", e);
            }
        }
    }

    /// Give focus to `group_id`, taking it from the previously active group
    pub fn set_active_group(&self, group_id: &str) -> Result<(), DockError> {
        let group = self
            .group(group_id)
            .ok_or_else(|| DockError::UnknownGroup(group_id.to_string()))?;
        self.do_set_active_group(Some(group));
        Ok(())
    }

    fn do_set_active_group(&self, group: Option<Rc<Group>>) {
        let previous = self.active_group.replace(group.clone());
        let unchanged = match (&previous, &group) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        if let Some(previous) = &previous {
            if !previous.is_disposed() {
                previous.set_active(false);
            }
        }
        if let Some(group) = &group {
            group.set_active(true);
        }
        self.on_did_active_group_change.fire(group);
    }

    // ========================================================================
    // Panels
    // ========================================================================

    /// Create, initialize and open a panel
    pub fn add_panel(&self, options: AddPanelOptions) -> Result<Rc<GroupPanel>, DockError> {
        if self.panel(&options.id).is_some() {
            return Err(DockError::DuplicatePanel(options.id));
        }

        let content = Self::create_part(&self.components, &options.component)?;
        let header = match &options.tab_component {
            Some(name) => Some(Self::create_part(&self.tab_components, name)?),
            None => None,
        };

        let group = match &options.group_id {
            Some(group_id) => self
                .group(group_id)
                .ok_or_else(|| DockError::UnknownGroup(group_id.clone()))?,
            None => match self.active_group().or_else(|| self.groups().into_iter().next()) {
                Some(group) => group,
                None => self.add_group(),
            },
        };

        let panel = GroupPanel::new(options.id.clone(), self.api());
        let mut init = PanelInitParams::new(options.title.unwrap_or_else(|| options.id.clone()))
            .with_params(options.params)
            .suppress_closable(options.suppress_closable)
            .with_content(content);
        init.header_part = header;
        panel.init(init)?;

        group.open_panel(panel.clone(), options.index);
        self.do_set_active_group(Some(group));

        tracing::info!(panel_id = %panel.id(), "panel added");
        self.on_did_add_panel.fire(panel.clone());
        Ok(panel)
    }

    /// Remove and dispose a panel without consulting its close hook
    pub fn remove_panel(&self, panel_id: &str) -> Result<(), DockError> {
        let group = self
            .group_of(panel_id)
            .ok_or_else(|| DockError::UnknownPanel(panel_id.to_string()))?;
        let Some(panel) = group.remove_panel(panel_id) else {
            return Err(DockError::UnknownPanel(panel_id.to_string()));
        };

        let result = panel.try_dispose();
        self.on_did_remove_panel.fire(panel);
        self.remove_group_if_empty(&group);
        result
    }

    /// Close a panel through its veto hook; `Ok(false)` if it declined
    pub fn close_panel(&self, panel_id: &str) -> Result<bool, DockError> {
        let group = self
            .group_of(panel_id)
            .ok_or_else(|| DockError::UnknownPanel(panel_id.to_string()))?;
        let Some(panel) = group.panel(panel_id) else {
            return Err(DockError::UnknownPanel(panel_id.to_string()));
        };

        if !group.close_panel(panel_id)? {
            return Ok(false);
        }
        self.on_did_remove_panel.fire(panel);
        self.remove_group_if_empty(&group);
        Ok(true)
    }

    /// Move a panel into a group, or beside it for edge positions
    ///
    /// The panel keeps its identity, parts and state. Groups emptied by the
    /// move are removed. No add/remove panel events fire.
    pub fn move_panel(&self, request: MovePanel) -> Result<(), DockError> {
        let MovePanel {
            source_group,
            item_id,
            target_group,
            position,
            index,
        } = request;

        let source = self
            .group(&source_group)
            .ok_or_else(|| DockError::UnknownGroup(source_group.clone()))?;
        let target = self
            .group(&target_group)
            .ok_or_else(|| DockError::UnknownGroup(target_group.clone()))?;
        if !source.contains_panel(&item_id) {
            return Err(DockError::UnknownPanel(item_id));
        }

        let destination = match position {
            Position::Center => {
                if Rc::ptr_eq(&source, &target) {
                    // Reorder within the group
                    if let Some(panel) = source.panel(&item_id) {
                        source.open_panel(panel, index);
                    }
                    return Ok(());
                }
                target
            }
            Position::Left | Position::Top | Position::Right | Position::Bottom => {
                if Rc::ptr_eq(&source, &target) && source.len() == 1 {
                    // Splitting a group off itself with its only panel
                    return Ok(());
                }
                let target_index = self
                    .group_index(target.id())
                    .ok_or_else(|| DockError::UnknownGroup(target_group.clone()))?;
                let insert_at = match position {
                    Position::Left | Position::Top => target_index,
                    _ => target_index + 1,
                };
                self.insert_group(insert_at)
            }
        };

        let Some(panel) = source.remove_panel(&item_id) else {
            return Err(DockError::UnknownPanel(item_id));
        };
        let index = if position == Position::Center { index } else { None };
        destination.open_panel(panel, index);

        tracing::debug!(
            panel_id = %item_id,
            from = %source.id(),
            to = %destination.id(),
            ?position,
            "panel moved"
        );

        self.do_set_active_group(Some(destination));
        self.remove_group_if_empty(&source);
        Ok(())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Export every group and panel, in group order
    pub fn to_json(&self) -> Result<SerializedDock, DockError> {
        let mut groups = Vec::new();
        for group in self.groups() {
            let panels = group
                .panels()
                .iter()
                .map(|panel| panel.to_json())
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(SerializedGroup {
                id: group.id().to_string(),
                panels,
                active_panel: group.active_panel().map(|p| p.id().to_string()),
            });
        }

        Ok(SerializedDock {
            groups,
            active_group: self.active_group().map(|g| g.id().to_string()),
        })
    }

    /// Replace the current layout with a serialized one
    ///
    /// Parts are rebuilt from the registered factories, keyed by each
    /// panel's `contentId` and `tabId`. Ids and parts are checked before
    /// anything is torn down, so on error the current layout is untouched.
    pub fn from_json(&self, data: &SerializedDock) -> Result<(), DockError> {
        Self::validate(data)?;

        let mut restored = Vec::with_capacity(data.groups.len());
        for serialized_group in &data.groups {
            let mut panels = Vec::with_capacity(serialized_group.panels.len());
            for serialized in &serialized_group.panels {
                let content = serialized
                    .content_id
                    .as_deref()
                    .map(|name| Self::create_part(&self.components, name))
                    .transpose()?;
                let header = serialized
                    .tab_id
                    .as_deref()
                    .map(|name| Self::create_part(&self.tab_components, name))
                    .transpose()?;
                panels.push(PanelInitParams::from_serialized(serialized, header, content));
            }
            restored.push(panels);
        }

        self.clear();

        for (serialized_group, panels) in data.groups.iter().zip(restored) {
            let index = self.groups.borrow().len();
            let group = self.insert_group_with_id(index, serialized_group.id.clone());

            for (serialized, init) in serialized_group.panels.iter().zip(panels) {
                let panel = GroupPanel::new(serialized.id.clone(), self.api());
                panel.init(init)?;
                group.open_panel(panel.clone(), None);
                self.on_did_add_panel.fire(panel);
            }

            if let Some(active) = &serialized_group.active_panel {
                group.set_active_panel(active)?;
            }
        }

        let active = data
            .active_group
            .as_deref()
            .and_then(|id| self.group(id))
            .or_else(|| self.groups().into_iter().last());
        self.do_set_active_group(active);

        tracing::info!(groups = data.groups.len(), "layout restored");
        Ok(())
    }

    /// Reject layouts whose ids could not all be addressed once restored
    fn validate(data: &SerializedDock) -> Result<(), DockError> {
        let mut group_ids = HashSet::new();
        let mut panel_ids = HashSet::new();

        for group in &data.groups {
            if !group_ids.insert(group.id.as_str()) {
                return Err(DockError::DuplicateGroup(group.id.clone()));
            }
            for panel in &group.panels {
                if !panel_ids.insert(panel.id.as_str()) {
                    return Err(DockError::DuplicatePanel(panel.id.clone()));
                }
            }
            if let Some(active) = &group.active_panel {
                if !group.panels.iter().any(|p| &p.id == active) {
                    return Err(DockError::UnknownPanel(active.clone()));
                }
            }
        }
        Ok(())
    }

    /// Remove every group and panel
    pub fn clear(&self) {
        for group in self.groups() {
            if let Err(e) = self.remove_group(group.id()) {
                tracing::warn!("clear: {}", e);
            }
        }
    }

    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.clear();
        self.disposables.dispose();
        tracing::debug!(accessor_id = %self.ctx.accessor_id, "dock component disposed");
    }
}

impl Disposable for DockComponent {
    fn dispose(&self) {
        DockComponent::dispose(self);
    }
}

impl std::fmt::Debug for DockComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockComponent")
            .field("accessor_id", &self.ctx.accessor_id)
            .field("groups", &self.groups())
            .finish()
    }
}
