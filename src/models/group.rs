//! Group membership marker.

use serde::{Deserialize, Serialize};

/// Membership row written when a user joins a group.
///
/// Group creation and invite codes live in the groups service; this backend
/// only records the membership so `groups_joined` badge rules can count it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: String,
    pub group_id: String,
    pub joined_at: String,
}
