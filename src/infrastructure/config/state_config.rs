use serde::{Deserialize, Serialize};

/// Session state persisted between runs.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Last opened group ID.
    #[serde(default)]
    pub last_group_id: Option<String>,
}
