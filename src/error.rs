//! Error types for layout operations
//!
//! Most of the engine reports failure as an inert no-op (an event with no
//! listener, an update before init). The variants here cover the operations
//! that have a caller able to act on the failure.

#[derive(Debug, thiserror::Error)]
pub enum DockError {
    #[error("panel {0} is already initialized")]
    AlreadyInitialized(String),
    #[error("panel {0} has not been initialized")]
    NotInitialized(String),
    #[error("unknown group: {0}")]
    UnknownGroup(String),
    #[error("group already exists: {0}")]
    DuplicateGroup(String),
    #[error("unknown panel: {0}")]
    UnknownPanel(String),
    #[error("panel already exists: {0}")]
    DuplicatePanel(String),
    #[error("no part registered for component: {0}")]
    UnknownComponent(String),
    #[error("malformed drag payload: {0}")]
    MalformedPayload(String),
    #[error("failed to release {} part(s) of panel {panel_id}", errors.len())]
    Dispose {
        panel_id: String,
        errors: Vec<anyhow::Error>,
    },
    #[error("configuration error: {0}")]
    Config(String),
}
