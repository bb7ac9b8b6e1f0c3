//! Capability-based permission predicates evaluated before each resource operation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The five operations a resource exposes over HTTP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Create,
    Get,
    Edit,
    Delete,
}

impl Action {
    pub fn is_write(self) -> bool {
        matches!(self, Action::Create | Action::Edit | Action::Delete)
    }
}

/// Capability names required to read or write a resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default = "default_read")]
    pub read: String,
    #[serde(default = "default_write")]
    pub write: String,
}

fn default_read() -> String {
    "read".into()
}

fn default_write() -> String {
    "edit_others_posts".into()
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions {
            read: default_read(),
            write: default_write(),
        }
    }
}

impl Permissions {
    pub fn required_for(&self, action: Action) -> &str {
        if action.is_write() {
            &self.write
        } else {
            &self.read
        }
    }

    pub fn allows(&self, caps: &Capabilities, action: Action) -> bool {
        caps.has(self.required_for(action))
    }
}

/// Capabilities held by the caller, as supplied by the host's session layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities(HashSet<String>);

impl Capabilities {
    pub fn new<I, S>(caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Capabilities(caps.into_iter().map(Into::into).collect())
    }

    /// Parse a comma-separated list, ignoring blanks.
    pub fn parse(list: &str) -> Self {
        Capabilities::new(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn has(&self, cap: &str) -> bool {
        self.0.contains(cap)
    }
}
