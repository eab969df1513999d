//! Verified session token.

use serde::{Deserialize, Serialize};

/// Claims of a session verified by the identity provider.
///
/// The gate only reads it; it lives for the evaluation of one request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct SessionToken {
    /// Stable user identifier, when the provider exposes one.
    pub subject: Option<String>,
    /// Role claim. Compared case-sensitively.
    pub role: Option<String>,
    /// Session expiry as reported by the provider.
    pub expires: Option<String>,
}

impl SessionToken {
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }

    /// True if the role claim equals `role` exactly.
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }
}
