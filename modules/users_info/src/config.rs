use serde::{Deserialize, Serialize};

/// Configuration for the users_info module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersInfoConfig {
    /// Populate the store with two demo users (ids 1 and 2) at start-up.
    #[serde(default = "default_seed_demo_users")]
    pub seed_demo_users: bool,
}

impl Default for UsersInfoConfig {
    fn default() -> Self {
        Self {
            seed_demo_users: default_seed_demo_users(),
        }
    }
}

fn default_seed_demo_users() -> bool {
    true
}
