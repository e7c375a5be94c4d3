//! User session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logged-in retailer, as returned by `verifyOTP` and kept on disk between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub email: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub city: String,
    pub session_token: String,
    /// RFC 3339 expiry issued by the server
    pub session_expiry: String,
    /// Set locally when the session is stored
    #[serde(default)]
    pub login_time: String,
}

impl UserSession {
    /// Parsed expiry; `None` when the server sent something unparsable
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.session_expiry)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Client-side expiry check. An unparsable expiry counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expiry) => now > expiry,
            None => true,
        }
    }

    /// Name used as the order's party name
    pub fn party_name(&self) -> &str {
        if self.business_name.is_empty() {
            &self.email
        } else {
            &self.business_name
        }
    }
}
