use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flat role tag. Roles are compared exactly; none implies another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Administrator,
    Teacher,
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Administrator => "administrator",
            UserRole::Teacher => "teacher",
            UserRole::Student => "student",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub role: UserRole,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub token_expiration: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(role: UserRole, name: &str, username: &str, password_hash: String) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            role,
            name: name.to_string(),
            username: username.to_string(),
            password_hash,
            token: None,
            token_expiration: None,
        }
    }

    /// A token with no recorded expiry is treated as already expired.
    pub fn token_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.token_expiration {
            Some(expiration) => expiration < now,
            None => true,
        }
    }
}
