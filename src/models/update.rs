//! Local news and advisory snippets

use serde::{Deserialize, Serialize};
use std::fmt;

/// A short event, advisory, or news item for the destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUpdate {
    pub text: String,
}

impl LocalUpdate {
    #[must_use]
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}

impl fmt::Display for LocalUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
