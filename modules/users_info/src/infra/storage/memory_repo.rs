use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use crate::contract::model::{NewUser, User, UserUpdate};
use crate::domain::repo::{StoreError, UsersRepository};

/// Users seeded at process start.
const DEMO_USERS: [(&str, &str, &str); 2] = [
    ("Jane", "Doe", "jane.doe@example.com"),
    ("John", "Smith", "john.smith@example.com"),
];

#[derive(Debug)]
struct UserTable {
    // Ids only grow, so key order is insertion order.
    rows: BTreeMap<u64, User>,
    last_id: u64,
}

impl UserTable {
    fn email_taken(&self, email: &str, except: Option<u64>) -> bool {
        let wanted = email.to_lowercase();
        self.rows
            .values()
            .any(|u| Some(u.id) != except && u.email.to_lowercase() == wanted)
    }
}

/// Process-local user store. Every operation runs under a single lock, so the
/// uniqueness check and the mutation that follows it cannot interleave with
/// another writer.
#[derive(Debug)]
pub struct InMemoryUsersRepository {
    table: Mutex<UserTable>,
}

impl Default for InMemoryUsersRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(UserTable {
                rows: BTreeMap::new(),
                last_id: 0,
            }),
        }
    }

    /// Insert the demo users through the regular create path.
    pub async fn seed_demo_users(&self) -> Result<Vec<User>, StoreError> {
        let mut seeded = Vec::with_capacity(DEMO_USERS.len());
        for (first_name, last_name, email) in DEMO_USERS {
            let user = self
                .create(NewUser {
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    email: email.to_string(),
                })
                .await?;
            seeded.push(user);
        }
        debug!(count = seeded.len(), "Seeded demo users");
        Ok(seeded)
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn list(&self) -> Vec<User> {
        self.table.lock().rows.values().cloned().collect()
    }

    async fn get_by_id(&self, id: u64) -> Option<User> {
        self.table.lock().rows.get(&id).cloned()
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let email = new_user.email.trim().to_string();

        let mut table = self.table.lock();
        if table.email_taken(&email, None) {
            return Err(StoreError::Conflict { email });
        }

        table.last_id += 1;
        let user = User {
            id: table.last_id,
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            email,
            is_active: true,
            created_on_utc: Utc::now(),
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: u64, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let email = update.email.trim().to_string();

        let mut table = self.table.lock();
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if table.email_taken(&email, Some(id)) {
            return Err(StoreError::Conflict { email });
        }

        let Some(user) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        user.first_name = update.first_name.trim().to_string();
        user.last_name = update.last_name.trim().to_string();
        user.email = email;
        user.is_active = update.is_active;
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: u64) -> bool {
        self.table.lock().rows.remove(&id).is_some()
    }
}
