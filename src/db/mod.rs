//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ACTIVITIES: &str = "activities";
    /// Streak documents (keyed by user_id)
    pub const USER_STREAKS: &str = "user_streaks";
    /// Fact aggregates (keyed by user_id)
    pub const USER_FACTS: &str = "user_facts";
    /// Award records (keyed by `{user_id}_{badge_id}`)
    pub const USER_BADGES: &str = "user_badges";
    pub const NOTIFICATIONS: &str = "notifications";
    /// Membership markers (keyed by `{user_id}_{group_id}`)
    pub const GROUP_MEMBERS: &str = "group_members";
}
