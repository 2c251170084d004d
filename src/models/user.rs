//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// Registration and credential handling live in the auth service; this
/// backend only reads profiles for existence checks and `/api/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque user ID issued at registration (also used as document ID)
    pub user_id: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Display name shown on the dashboard and in groups
    pub display_name: String,
    /// Profile picture URL
    pub profile_picture: Option<String>,
    /// When the user registered
    pub created_at: String,
    /// Last activity timestamp
    pub last_active: String,
}
