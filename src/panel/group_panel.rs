//! A panel hosted in a tabbed group

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::api::{ContainerApi, GroupPanelApi};
use crate::error::DockError;
use crate::group::{Group, GroupChangeKind};
use crate::lifecycle::{CompositeDisposable, Disposable, MutableDisposable};
use crate::tracing::PanelSnapshot;

use super::{
    Panel, PanelInitParams, PanelPart, PanelUpdateEvent, Parameters, PartInitParams,
    SerializedGroupPanel,
};

/// Stored init parameters; `None` on the panel until `init` runs
#[derive(Debug, Clone)]
struct PanelParams {
    params: Parameters,
    title: String,
    suppress_closable: bool,
}

pub struct GroupPanel {
    id: String,
    this: Weak<GroupPanel>,
    api: Rc<GroupPanelApi>,
    container_api: ContainerApi,
    group: RefCell<Weak<Group>>,
    params: RefCell<Option<PanelParams>>,
    header: RefCell<Option<Rc<dyn PanelPart>>>,
    content: RefCell<Option<Rc<dyn PanelPart>>>,
    group_subscription: MutableDisposable,
    disposables: CompositeDisposable,
    disposed: Cell<bool>,
}

impl GroupPanel {
    pub fn new(id: impl Into<String>, container_api: ContainerApi) -> Rc<Self> {
        let id = id.into();
        let panel = Rc::new_cyclic(|this| Self {
            api: Rc::new(GroupPanelApi::new(id.clone())),
            id,
            this: this.clone(),
            container_api,
            group: RefCell::new(Weak::new()),
            params: RefCell::new(None),
            header: RefCell::new(None),
            content: RefCell::new(None),
            group_subscription: MutableDisposable::new(),
            disposables: CompositeDisposable::new(),
            disposed: Cell::new(false),
        });

        panel.api.initialize(&panel);

        let this = panel.this.clone();
        panel
            .disposables
            .add(panel.api.on_did_title_change().subscribe(move |event| {
                if let Some(panel) = this.upgrade() {
                    panel.apply_title(&event.title);
                }
            }));

        panel
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn api(&self) -> &Rc<GroupPanelApi> {
        &self.api
    }

    pub fn group(&self) -> Option<Rc<Group>> {
        self.group.borrow().upgrade()
    }

    pub fn header(&self) -> Option<Rc<dyn PanelPart>> {
        self.header.borrow().clone()
    }

    pub fn content(&self) -> Option<Rc<dyn PanelPart>> {
        self.content.borrow().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.params.borrow().is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Current tab title; `None` before `init`
    pub fn title(&self) -> Option<String> {
        self.params.borrow().as_ref().map(|p| p.title.clone())
    }

    /// Current parameter bag; `None` before `init`
    pub fn params(&self) -> Option<Parameters> {
        self.params.borrow().as_ref().map(|p| p.params.clone())
    }

    pub fn suppress_closable(&self) -> bool {
        self.params
            .borrow()
            .as_ref()
            .is_some_and(|p| p.suppress_closable)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// One-time initialization with parts and initial parameters
    pub fn init(&self, params: PanelInitParams) -> Result<(), DockError> {
        if self.is_initialized() {
            tracing::error!(panel_id = %self.id, "panel initialized twice");
            return Err(DockError::AlreadyInitialized(self.id.clone()));
        }

        let PanelInitParams {
            params,
            title,
            suppress_closable,
            state,
            header_part,
            content_part,
        } = params;

        *self.params.borrow_mut() = Some(PanelParams {
            params: params.clone(),
            title: title.clone(),
            suppress_closable,
        });
        *self.content.borrow_mut() = content_part.clone();
        *self.header.borrow_mut() = header_part.clone();

        if let Some(state) = state.clone() {
            self.api.set_state(state);
        }

        let part_params = PartInitParams {
            params,
            title,
            suppress_closable,
            state,
            api: self.api.clone(),
            container_api: self.container_api.clone(),
        };
        if let Some(content) = content_part {
            content.init(&part_params);
        }
        if let Some(header) = header_part {
            header.init(&part_params);
        }

        tracing::debug!(panel_id = %self.id, "panel initialized");
        Ok(())
    }

    /// Shallow-merge `event.params` into the stored bag and forward to parts
    pub fn update(&self, event: &PanelUpdateEvent) {
        {
            let mut stored = self.params.borrow_mut();
            let Some(stored) = stored.as_mut() else {
                tracing::debug!(panel_id = %self.id, "update before init ignored");
                return;
            };
            for (key, value) in &event.params {
                stored.params.insert(key.clone(), value.clone());
            }
        }

        if let Some(content) = self.content() {
            content.update(event);
        }
        if let Some(header) = self.header() {
            header.update(event);
        }
    }

    fn apply_title(&self, title: &str) {
        match self.params.borrow_mut().as_mut() {
            Some(stored) => stored.title = title.to_string(),
            None => return,
        }

        let mut params = Parameters::new();
        params.insert("title".to_string(), serde_json::Value::from(title));
        if let Some(content) = self.content() {
            content.update(&PanelUpdateEvent {
                params: params.clone(),
            });
        }
        if let Some(header) = self.header() {
            header.update(&PanelUpdateEvent { params });
        }
    }

    /// Attach the panel to `group` and resynchronize focus and visibility
    ///
    /// Replaces the subscription to the previous group's change stream, so
    /// the panel only ever reacts to the group it is in.
    pub fn set_visible(&self, is_group_active: bool, group: &Rc<Group>) {
        let before = PanelSnapshot::from_api(&self.api);

        self.attach_group(group);

        let this = self.this.clone();
        let watched = Rc::downgrade(group);
        self.group_subscription
            .set(group.on_did_group_change().subscribe(move |event| {
                if !matches!(
                    event.kind,
                    GroupChangeKind::PanelActive | GroupChangeKind::GroupActive
                ) {
                    return;
                }
                if let (Some(panel), Some(group)) = (this.upgrade(), watched.upgrade()) {
                    panel.refresh_visibility(&group);
                }
            }));

        self.api.notify_focus_change(is_group_active);
        self.refresh_visibility(group);

        let is_panel_active = group.is_panel_active(&self.id);
        if let Some(header) = self.header() {
            header.set_visible(is_panel_active, group);
        }
        if let Some(content) = self.content() {
            content.set_visible(is_panel_active, group);
        }

        if let Some(diff) = before.diff(&PanelSnapshot::from_api(&self.api)) {
            tracing::debug!(panel_id = %self.id, group_id = %group.id(), "{}", diff);
        }
    }

    /// Point the panel (and its API) at `group` without touching visibility
    pub(crate) fn attach_group(&self, group: &Rc<Group>) {
        *self.group.borrow_mut() = Rc::downgrade(group);
        self.api.set_group(group);
    }

    /// Fire visibility only when it differs from the current value
    fn refresh_visibility(&self, group: &Group) {
        let is_visible = group.is_panel_active(&self.id);
        if self.api.is_visible() != is_visible {
            self.api.notify_visibility_change(is_visible);
        }
    }

    /// Size the content area; the group's tab strip height is deducted
    pub fn layout(&self, width: f32, height: f32) {
        let tab_height = self.group().map(|g| g.tab_height()).unwrap_or(0.0);
        self.api
            .notify_dimensions_change(width, (height - tab_height).max(0.0));
    }

    /// Ask the panel whether it may close
    ///
    /// Without a veto hook the answer is always yes.
    pub fn close(&self) -> anyhow::Result<bool> {
        self.api.try_close().unwrap_or(Ok(true))
    }

    pub fn focus(&self) {
        self.api.focus();
    }

    pub fn set_dirty(&self, is_dirty: bool) {
        self.api.set_dirty(is_dirty);
    }

    /// Export the persisted shape of this panel
    pub fn to_json(&self) -> Result<SerializedGroupPanel, DockError> {
        let params = self.params.borrow();
        let params = params
            .as_ref()
            .ok_or_else(|| DockError::NotInitialized(self.id.clone()))?;

        Ok(SerializedGroupPanel {
            id: self.id.clone(),
            content_id: self.content().map(|part| part.id().to_string()),
            tab_id: self.header().map(|part| part.id().to_string()),
            props: params.params.clone(),
            title: params.title.clone(),
            suppress_closable: params.suppress_closable,
            state: self.api.get_state(),
        })
    }

    /// Release the API, the group subscription and both parts
    ///
    /// Every release runs even when a part fails; failures are reported
    /// together afterwards. Safe before `init` and on repeated calls.
    pub fn try_dispose(&self) -> Result<(), DockError> {
        if self.disposed.replace(true) {
            return Ok(());
        }

        self.api.dispose();
        self.group_subscription.dispose();
        self.disposables.dispose();

        let mut errors = Vec::new();
        let header = self.header.borrow_mut().take();
        let content = self.content.borrow_mut().take();
        for part in [header, content].into_iter().flatten() {
            if let Err(e) = part.dispose() {
                tracing::warn!(panel_id = %self.id, part_id = part.id(), "part dispose failed: {:#}", e);
                errors.push(e);
            }
        }

        tracing::debug!(panel_id = %self.id, "panel disposed");
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DockError::Dispose {
                panel_id: self.id.clone(),
                errors,
            })
        }
    }
}

impl Panel for GroupPanel {
    fn id(&self) -> &str {
        &self.id
    }

    fn update(&self, event: &PanelUpdateEvent) {
        GroupPanel::update(self, event);
    }
}

impl Disposable for GroupPanel {
    fn dispose(&self) {
        if let Err(e) = self.try_dispose() {
            tracing::warn!("{}", e);
        }
    }
}

impl std::fmt::Debug for GroupPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupPanel")
            .field("id", &self.id)
            .field("params", &self.params.borrow())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}
