use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

/// Credentials for one session. An empty username logs in anonymously.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl User {
    pub fn new<T: Into<String>, U: Into<String>>(username: T, password: U) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty()
    }
}

impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
