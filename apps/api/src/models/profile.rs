use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user identity document. Created at signup, edited during onboarding,
/// never deleted for the lifetime of the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    /// The role the user is preparing for, e.g. "Backend Engineer".
    #[serde(default)]
    pub target_role: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
