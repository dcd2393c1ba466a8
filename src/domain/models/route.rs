//! Navigation events delivered by the host router.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A route change: destination route name plus its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteChange {
    pub name: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl RouteChange {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Username whose page is being viewed, if any.
    pub fn viewed_username(&self) -> Option<&str> {
        self.params.get("username").map(String::as_str)
    }

    /// Whether this route is `username`'s own preferences page.
    pub fn is_own_preferences(&self, username: &str) -> bool {
        self.name.contains("preferences") && self.viewed_username() == Some(username)
    }
}
