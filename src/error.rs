use thiserror::Error;

/// Failures raised by a [`ContentStore`](crate::store::ContentStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("store io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store data could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("store rejected write: {0}")]
    Conflict(String),
}

/// Failures that abort a whole engine run.
///
/// Per-item write failures are not represented here; they are logged and
/// reported on the item's outcome instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("simulation settings are missing")]
    SettingsMissing,
    #[error("simulation settings are unreadable: {0}")]
    SettingsUnreadable(#[source] StoreError),
    #[error("simulation settings are invalid: {0}")]
    SettingsInvalid(String),
    #[error("content item not found: {0}")]
    ItemNotFound(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn is_settings_failure(&self) -> bool {
        matches!(
            self,
            EngineError::SettingsMissing
                | EngineError::SettingsUnreadable(_)
                | EngineError::SettingsInvalid(_)
        )
    }
}
