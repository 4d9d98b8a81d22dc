use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity. The username doubles as the public profile identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamp.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }

    /// Overwrite the self-editable profile fields.
    pub fn apply(&mut self, draft: ProfileDraft) {
        self.username = draft.username;
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.email = draft.email;
    }

    /// "First Last" when either name is set, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// The fields a user may change on their own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
