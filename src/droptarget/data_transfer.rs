//! Drag payload and the keyed registry that carries it
//!
//! A drag writes its payload twice: into the native [`DataTransfer`] channel
//! (readable at drop time, also across windows) and into a [`DragRegistry`]
//! keyed by drag session. The registry is what lets a drop target recognize a
//! drag from its own component during dragenter/dragover, when the native
//! channel only exposes its type list.
//!
//! Discipline: one writer per session. The tab that starts a drag writes the
//! entry and is also the one that removes it at drag end.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::{DataTransfer, TEXT_PLAIN};
use crate::error::DockError;

/// `type` tag of a panel drag payload
pub const DRAG_TYPE: &str = "group_drag";

/// Identifies which panel is leaving which group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub item_id: String,
    pub group_id: String,
}

impl DragPayload {
    pub fn new(item_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            kind: DRAG_TYPE.to_string(),
            item_id: item_id.into(),
            group_id: group_id.into(),
        }
    }

    pub fn to_json(&self) -> String {
        // Three string fields cannot fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a payload, rejecting anything that is not a panel drag
    pub fn from_json(data: &str) -> Result<Self, DockError> {
        let payload: DragPayload =
            serde_json::from_str(data).map_err(|e| DockError::MalformedPayload(e.to_string()))?;
        if payload.kind != DRAG_TYPE {
            return Err(DockError::MalformedPayload(format!(
                "unexpected drag type {:?}",
                payload.kind
            )));
        }
        Ok(payload)
    }

    /// Read the payload of a drop
    ///
    /// The native channel is authoritative. The registry entry of the
    /// accessor's in-flight session is only a fallback for hosts that do not
    /// carry `text/plain` through. Returns `None` (and logs) when neither
    /// yields a well-formed payload, so the caller aborts the drop.
    pub fn read(
        data_transfer: &DataTransfer,
        registry: &DragRegistry,
        accessor_id: &str,
    ) -> Option<Self> {
        let native = data_transfer.get_data(TEXT_PLAIN);
        let raw = if native.is_empty() {
            let fallback = registry
                .active_session(accessor_id)
                .and_then(|session| registry.get_data(&session));
            match fallback {
                Some(data) => data,
                None => {
                    tracing::warn!(accessor_id, "drop carried no drag payload");
                    return None;
                }
            }
        } else {
            native
        };

        match Self::from_json(&raw) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!(accessor_id, "ignoring drop: {}", e);
                None
            }
        }
    }
}

/// Key of one drag gesture in a [`DragRegistry`]
///
/// Combines the owning component's accessor id with a sequence number from
/// the registry, so two components sharing a registry never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DragSessionId {
    accessor_id: String,
    sequence: u64,
}

impl DragSessionId {
    pub fn accessor_id(&self) -> &str {
        &self.accessor_id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for DragSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.accessor_id, self.sequence)
    }
}

/// Session-keyed store of in-flight drag payloads
#[derive(Debug, Default)]
pub struct DragRegistry {
    entries: RefCell<HashMap<DragSessionId, String>>,
    next_sequence: Cell<u64>,
}

impl DragRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh session id for a drag started by `accessor_id`
    pub fn begin_session(&self, accessor_id: &str) -> DragSessionId {
        let sequence = self.next_sequence.get();
        self.next_sequence.set(sequence + 1);
        DragSessionId {
            accessor_id: accessor_id.to_string(),
            sequence,
        }
    }

    pub fn set_data(&self, session: &DragSessionId, data: impl Into<String>) {
        self.entries
            .borrow_mut()
            .insert(session.clone(), data.into());
    }

    pub fn get_data(&self, session: &DragSessionId) -> Option<String> {
        self.entries.borrow().get(session).cloned()
    }

    pub fn remove_data(&self, session: &DragSessionId) -> Option<String> {
        self.entries.borrow_mut().remove(session)
    }

    pub fn has_data(&self, session: &DragSessionId) -> bool {
        self.entries.borrow().contains_key(session)
    }

    /// Whether any drag started by `accessor_id` is in flight
    pub fn has_accessor(&self, accessor_id: &str) -> bool {
        self.entries
            .borrow()
            .keys()
            .any(|key| key.accessor_id == accessor_id)
    }

    /// Most recent in-flight session started by `accessor_id`
    pub fn active_session(&self, accessor_id: &str) -> Option<DragSessionId> {
        self.entries
            .borrow()
            .keys()
            .filter(|key| key.accessor_id == accessor_id)
            .max_by_key(|key| key.sequence)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
