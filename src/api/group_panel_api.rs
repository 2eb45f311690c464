//! API of a panel that lives in a group
//!
//! Extends [`PanelApi`] with what only makes sense inside a tabbed group:
//! the group back-reference, the tab title, the dirty flag, an opaque state
//! bag persisted with the panel, and the close veto hook.

use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::{Rc, Weak};

use crate::event::{Emitter, Event};
use crate::group::Group;
use crate::lifecycle::{CompositeDisposable, Disposable};
use crate::panel::Parameters;

use super::PanelApi;

/// Fired when the panel is re-parented to another group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupChangedEvent {
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEvent {
    pub title: String,
}

/// Veto hook consulted before a panel is closed
///
/// `Ok(true)` allows the close. `Ok(false)` and `Err` both keep the panel.
pub type TryCloseHook = Rc<dyn Fn() -> anyhow::Result<bool>>;

pub struct GroupPanelApi {
    api: PanelApi,
    group: RefCell<Weak<Group>>,
    title: Rc<RefCell<Option<String>>>,
    is_dirty: Rc<Cell<bool>>,
    state: Rc<RefCell<Parameters>>,
    try_close: RefCell<Option<TryCloseHook>>,

    on_did_group_change: Emitter<GroupChangedEvent>,
    on_did_title_change: Emitter<TitleEvent>,
    on_did_dirty_change: Emitter<bool>,
    on_did_state_change: Emitter<Parameters>,
    disposables: CompositeDisposable,
}

impl GroupPanelApi {
    pub fn new(id: impl Into<String>) -> Self {
        let api = Self {
            api: PanelApi::new(id),
            group: RefCell::new(Weak::new()),
            title: Rc::new(RefCell::new(None)),
            is_dirty: Rc::new(Cell::new(false)),
            state: Rc::new(RefCell::new(Parameters::new())),
            try_close: RefCell::new(None),
            on_did_group_change: Emitter::new(),
            on_did_title_change: Emitter::new(),
            on_did_dirty_change: Emitter::new(),
            on_did_state_change: Emitter::new(),
            disposables: CompositeDisposable::new(),
        };

        let title = api.title.clone();
        api.disposables
            .add(api.on_did_title_change.event().subscribe(move |e| {
                *title.borrow_mut() = Some(e.title.clone());
            }));
        let is_dirty = api.is_dirty.clone();
        api.disposables
            .add(api.on_did_dirty_change.event().subscribe(move |dirty| {
                is_dirty.set(*dirty);
            }));
        let state = api.state.clone();
        api.disposables
            .add(api.on_did_state_change.event().subscribe(move |next| {
                *state.borrow_mut() = next.clone();
            }));

        api.disposables.add(api.on_did_group_change.clone());
        api.disposables.add(api.on_did_title_change.clone());
        api.disposables.add(api.on_did_dirty_change.clone());
        api.disposables.add(api.on_did_state_change.clone());

        api
    }

    /// The underlying panel-level API
    pub fn panel_api(&self) -> &PanelApi {
        &self.api
    }

    // ========================================================================
    // Group
    // ========================================================================

    /// The group the panel currently belongs to
    pub fn group(&self) -> Option<Rc<Group>> {
        self.group.borrow().upgrade()
    }

    /// Re-parent the panel; notifies only when the group actually changes
    pub fn set_group(&self, group: &Rc<Group>) {
        let unchanged = self
            .group
            .borrow()
            .upgrade()
            .is_some_and(|current| Rc::ptr_eq(&current, group));
        if unchanged {
            return;
        }

        *self.group.borrow_mut() = Rc::downgrade(group);
        self.on_did_group_change.fire(GroupChangedEvent {
            group_id: group.id().to_string(),
        });
    }

    pub fn on_did_group_change(&self) -> Event<GroupChangedEvent> {
        self.on_did_group_change.event()
    }

    // ========================================================================
    // Title / dirty
    // ========================================================================

    pub fn title(&self) -> Option<String> {
        self.title.borrow().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.on_did_title_change.fire(TitleEvent {
            title: title.into(),
        });
    }

    pub fn on_did_title_change(&self) -> Event<TitleEvent> {
        self.on_did_title_change.event()
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty.get()
    }

    pub fn set_dirty(&self, is_dirty: bool) {
        self.on_did_dirty_change.fire(is_dirty);
    }

    pub fn on_did_dirty_change(&self) -> Event<bool> {
        self.on_did_dirty_change.event()
    }

    // ========================================================================
    // State bag
    // ========================================================================

    /// Opaque state persisted with the panel
    pub fn get_state(&self) -> Parameters {
        self.state.borrow().clone()
    }

    /// Replace the whole state bag
    pub fn set_state(&self, state: Parameters) {
        self.on_did_state_change.fire(state);
    }

    /// Set one key of the state bag, keeping the others
    pub fn set_state_value(&self, key: impl Into<String>, value: serde_json::Value) {
        let mut next = self.get_state();
        next.insert(key.into(), value);
        self.set_state(next);
    }

    pub fn on_did_state_change(&self) -> Event<Parameters> {
        self.on_did_state_change.event()
    }

    // ========================================================================
    // Close veto
    // ========================================================================

    pub fn set_try_close(&self, hook: impl Fn() -> anyhow::Result<bool> + 'static) {
        *self.try_close.borrow_mut() = Some(Rc::new(hook));
    }

    pub fn clear_try_close(&self) {
        *self.try_close.borrow_mut() = None;
    }

    /// Run the veto hook; `None` when no hook is installed
    pub fn try_close(&self) -> Option<anyhow::Result<bool>> {
        let hook = self.try_close.borrow().clone();
        hook.map(|hook| hook())
    }
}

impl Deref for GroupPanelApi {
    type Target = PanelApi;

    fn deref(&self) -> &PanelApi {
        &self.api
    }
}

impl Disposable for GroupPanelApi {
    fn dispose(&self) {
        self.api.dispose();
        self.disposables.dispose();
        *self.try_close.borrow_mut() = None;
    }
}
