//! Per-panel state mirror
//!
//! Each state field is written only by the API's own listener on the
//! matching did-change event. Whoever fires the event (the group, the panel,
//! the host) therefore updates the field and every external listener through
//! one code path, and a getter always reflects the last value fired on its
//! channel.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::event::{Emitter, Event};
use crate::lifecycle::{CompositeDisposable, Disposable, MutableDisposable};
use crate::panel::{Panel, PanelUpdateEvent, Parameters};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionsEvent {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    pub is_focused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEvent {
    pub is_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HiddenEvent {
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEvent {
    pub is_active: bool,
}

#[derive(Debug)]
struct ApiState {
    is_focused: Cell<bool>,
    is_active: Cell<bool>,
    is_visible: Cell<bool>,
    is_hidden: Cell<bool>,
    width: Cell<f32>,
    height: Cell<f32>,
}

impl Default for ApiState {
    fn default() -> Self {
        Self {
            is_focused: Cell::new(false),
            is_active: Cell::new(false),
            is_visible: Cell::new(true),
            is_hidden: Cell::new(false),
            width: Cell::new(0.0),
            height: Cell::new(0.0),
        }
    }
}

/// The contract every panel-like object exposes
pub struct PanelApi {
    id: String,
    state: Rc<ApiState>,

    on_did_dimensions_change: Emitter<DimensionsEvent>,
    on_did_focus_change: Emitter<FocusEvent>,
    on_focus_event: Emitter<()>,
    on_did_visibility_change: Emitter<VisibilityEvent>,
    on_did_hidden_change: Emitter<HiddenEvent>,
    on_did_active_change: Emitter<ActiveEvent>,
    on_active_change: Emitter<()>,
    on_update_parameters: Emitter<Parameters>,

    panel_updates: Rc<MutableDisposable>,
    disposables: CompositeDisposable,
}

impl PanelApi {
    pub fn new(id: impl Into<String>) -> Self {
        let api = Self {
            id: id.into(),
            state: Rc::new(ApiState::default()),
            on_did_dimensions_change: Emitter::replay(),
            on_did_focus_change: Emitter::replay(),
            on_focus_event: Emitter::new(),
            on_did_visibility_change: Emitter::replay(),
            on_did_hidden_change: Emitter::new(),
            on_did_active_change: Emitter::replay(),
            on_active_change: Emitter::new(),
            on_update_parameters: Emitter::new(),
            panel_updates: Rc::new(MutableDisposable::new()),
            disposables: CompositeDisposable::new(),
        };

        let state = api.state.clone();
        api.disposables
            .add(api.on_did_focus_change.event().subscribe(move |e| {
                state.is_focused.set(e.is_focused);
            }));
        let state = api.state.clone();
        api.disposables
            .add(api.on_did_active_change.event().subscribe(move |e| {
                state.is_active.set(e.is_active);
            }));
        let state = api.state.clone();
        api.disposables
            .add(api.on_did_visibility_change.event().subscribe(move |e| {
                state.is_visible.set(e.is_visible);
            }));
        let state = api.state.clone();
        api.disposables
            .add(api.on_did_hidden_change.event().subscribe(move |e| {
                state.is_hidden.set(e.is_hidden);
            }));
        let state = api.state.clone();
        api.disposables
            .add(api.on_did_dimensions_change.event().subscribe(move |e| {
                state.width.set(e.width);
                state.height.set(e.height);
            }));

        api.disposables.add(api.panel_updates.clone());
        api.disposables.add(api.on_did_dimensions_change.clone());
        api.disposables.add(api.on_did_focus_change.clone());
        api.disposables.add(api.on_focus_event.clone());
        api.disposables.add(api.on_did_visibility_change.clone());
        api.disposables.add(api.on_did_hidden_change.clone());
        api.disposables.add(api.on_did_active_change.clone());
        api.disposables.add(api.on_active_change.clone());
        api.disposables.add(api.on_update_parameters.clone());

        api
    }

    /// The id assigned when the panel was created
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the panel holds the current focus
    pub fn is_focused(&self) -> bool {
        self.state.is_focused.get()
    }

    /// Whether the panel is the active panel of its group
    pub fn is_active(&self) -> bool {
        self.state.is_active.get()
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_visible.get()
    }

    pub fn is_hidden(&self) -> bool {
        self.state.is_hidden.get()
    }

    /// Panel width in pixels
    pub fn width(&self) -> f32 {
        self.state.width.get()
    }

    /// Panel height in pixels
    pub fn height(&self) -> f32 {
        self.state.height.get()
    }

    // ========================================================================
    // Event streams
    // ========================================================================

    pub fn on_did_dimensions_change(&self) -> Event<DimensionsEvent> {
        self.on_did_dimensions_change.event()
    }

    pub fn on_did_focus_change(&self) -> Event<FocusEvent> {
        self.on_did_focus_change.event()
    }

    /// A request to move keyboard focus into the panel
    pub fn on_focus_event(&self) -> Event<()> {
        self.on_focus_event.event()
    }

    pub fn on_did_visibility_change(&self) -> Event<VisibilityEvent> {
        self.on_did_visibility_change.event()
    }

    pub fn on_did_hidden_change(&self) -> Event<HiddenEvent> {
        self.on_did_hidden_change.event()
    }

    pub fn on_did_active_change(&self) -> Event<ActiveEvent> {
        self.on_did_active_change.event()
    }

    /// A request to become the active panel; the group decides
    pub fn on_active_change(&self) -> Event<()> {
        self.on_active_change.event()
    }

    pub fn on_update_parameters(&self) -> Event<Parameters> {
        self.on_update_parameters.event()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Wire parameter updates to `panel`
    ///
    /// Replaces any previous wiring. Updates fired before this call are not
    /// replayed. The panel is held weakly.
    pub fn initialize<P: Panel + 'static>(&self, panel: &Rc<P>) {
        let panel: Weak<dyn Panel> = Rc::downgrade(panel) as Weak<dyn Panel>;
        let subscription = self.on_update_parameters.event().subscribe(move |params| {
            if let Some(panel) = panel.upgrade() {
                panel.update(&PanelUpdateEvent {
                    params: params.clone(),
                });
            }
        });
        self.panel_updates.set(subscription);
    }

    /// Ask the owning group to make this panel active
    ///
    /// Does not change `is_active` by itself.
    pub fn set_active(&self) {
        self.on_active_change.fire(());
    }

    /// Send a parameter bag to the panel; dropped when not yet initialized
    pub fn update_parameters(&self, params: Parameters) {
        self.on_update_parameters.fire(params);
    }

    pub fn set_hidden(&self, is_hidden: bool) {
        self.on_did_hidden_change.fire(HiddenEvent { is_hidden });
    }

    /// Ask the host to move keyboard focus into the panel
    pub fn focus(&self) {
        self.on_focus_event.fire(());
    }

    // Group-driven notifications. Each fires its did-change event; the
    // listener registered in `new` updates the field.

    pub fn notify_focus_change(&self, is_focused: bool) {
        self.on_did_focus_change.fire(FocusEvent { is_focused });
    }

    pub fn notify_active_change(&self, is_active: bool) {
        self.on_did_active_change.fire(ActiveEvent { is_active });
    }

    pub fn notify_visibility_change(&self, is_visible: bool) {
        self.on_did_visibility_change.fire(VisibilityEvent { is_visible });
    }

    pub fn notify_dimensions_change(&self, width: f32, height: f32) {
        self.on_did_dimensions_change
            .fire(DimensionsEvent { width, height });
    }
}

impl Disposable for PanelApi {
    fn dispose(&self) {
        self.disposables.dispose();
    }
}

impl std::fmt::Debug for PanelApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelApi")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingPanel {
        updates: RefCell<Vec<PanelUpdateEvent>>,
    }

    impl Panel for RecordingPanel {
        fn id(&self) -> &str {
            "recording"
        }

        fn update(&self, event: &PanelUpdateEvent) {
            self.updates.borrow_mut().push(event.clone());
        }
    }

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let api = PanelApi::new("p");
        assert_eq!(api.id(), "p");
        assert!(!api.is_focused());
        assert!(!api.is_active());
        assert!(api.is_visible());
        assert!(!api.is_hidden());
        assert_eq!(api.width(), 0.0);
        assert_eq!(api.height(), 0.0);
    }

    #[test]
    fn test_getters_track_last_fired_value() {
        let api = PanelApi::new("p");

        api.notify_focus_change(true);
        api.notify_active_change(true);
        api.notify_visibility_change(false);
        api.set_hidden(true);
        api.notify_dimensions_change(640.0, 480.0);
        assert!(api.is_focused());
        assert!(api.is_active());
        assert!(!api.is_visible());
        assert!(api.is_hidden());
        assert_eq!((api.width(), api.height()), (640.0, 480.0));

        api.notify_focus_change(false);
        api.notify_active_change(false);
        api.notify_visibility_change(true);
        api.set_hidden(false);
        api.notify_dimensions_change(10.0, 20.0);
        assert!(!api.is_focused());
        assert!(!api.is_active());
        assert!(api.is_visible());
        assert!(!api.is_hidden());
        assert_eq!((api.width(), api.height()), (10.0, 20.0));
    }

    #[test]
    fn test_set_active_is_only_a_request() {
        let api = PanelApi::new("p");
        let requests = Rc::new(Cell::new(0));
        let r = requests.clone();
        let _sub = api.on_active_change().subscribe(move |_| r.set(r.get() + 1));

        api.set_active();
        assert_eq!(requests.get(), 1);
        assert!(!api.is_active());
    }

    #[test]
    fn test_update_parameters_before_initialize_is_dropped() {
        let api = PanelApi::new("p");
        let panel = Rc::new(RecordingPanel {
            updates: RefCell::new(Vec::new()),
        });

        api.update_parameters(params(&[("early", "1")]));
        api.initialize(&panel);
        assert!(panel.updates.borrow().is_empty());

        api.update_parameters(params(&[("keyA", "valueA")]));
        let updates = panel.updates.borrow();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].params, params(&[("keyA", "valueA")]));
    }

    #[test]
    fn test_reinitialize_replaces_wiring() {
        let api = PanelApi::new("p");
        let first = Rc::new(RecordingPanel {
            updates: RefCell::new(Vec::new()),
        });
        let second = Rc::new(RecordingPanel {
            updates: RefCell::new(Vec::new()),
        });

        api.initialize(&first);
        api.initialize(&second);
        api.update_parameters(params(&[("k", "v")]));

        assert!(first.updates.borrow().is_empty());
        assert_eq!(second.updates.borrow().len(), 1);
        assert_eq!(api.on_update_parameters.listener_count(), 1);
    }

    #[test]
    fn test_replay_streams_deliver_current_state() {
        let api = PanelApi::new("p");
        api.notify_dimensions_change(100.0, 50.0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = api
            .on_did_dimensions_change()
            .subscribe(move |e| sink.borrow_mut().push(*e));
        assert_eq!(*seen.borrow(), vec![DimensionsEvent { width: 100.0, height: 50.0 }]);

        api.notify_dimensions_change(200.0, 50.0);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_hidden_stream_does_not_replay() {
        let api = PanelApi::new("p");
        api.set_hidden(true);

        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let _sub = api.on_did_hidden_change().subscribe(move |_| f.set(true));
        assert!(!fired.get());
    }

    #[test]
    fn test_dispose_silences_everything() {
        let api = PanelApi::new("p");
        api.dispose();
        api.notify_focus_change(true);
        api.dispose();
        assert!(!api.is_focused());
    }
}
