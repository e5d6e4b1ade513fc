//! Sync targets and the settings keys they own

use serde::{Deserialize, Serialize};
use std::fmt;

/// Setting names and their defaults
pub mod settings {
    /// Title marker identifying blocking events
    pub const AUTOREJECT_NAME: &str = "autoreject_name";
    /// Comment attached to automatic declines
    pub const AUTOREJECT_REPLY: &str = "autoreject_reply";

    pub const DEFAULT_AUTOREJECT_NAME: &str = "(autoreject)";
    pub const DEFAULT_AUTOREJECT_REPLY: &str =
        "Automatic decline - unavailable. Please ask about scheduling during this block of time.";

    /// Value used when a setting has never been written
    pub fn default_value(name: &str) -> &'static str {
        match name {
            AUTOREJECT_NAME => DEFAULT_AUTOREJECT_NAME,
            AUTOREJECT_REPLY => DEFAULT_AUTOREJECT_REPLY,
            _ => "",
        }
    }
}

/// One calendar of one user, synced independently of all others
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncTarget {
    pub user_id: String,
    pub calendar_id: String,
}

impl SyncTarget {
    pub fn new(user_id: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            calendar_id: calendar_id.into(),
        }
    }

    /// Setting holding the oldest creation time eligible for decline
    pub fn sync_start_key(&self) -> String {
        format!("syncstart-{}", self.calendar_id)
    }

    /// Setting holding the persisted cursor
    pub fn sync_token_key(&self) -> String {
        format!("synctoken-{}", self.calendar_id)
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.calendar_id)
    }
}
