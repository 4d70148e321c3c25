use async_trait::async_trait;
use thiserror::Error;

use crate::contract::model::{NewUser, User, UserUpdate};

/// Failures the store itself decides on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another user already owns this email (compared case-insensitively).
    #[error("Email already exists")]
    Conflict { email: String },
}

/// Port for the domain layer: the user collection and its mutation rules.
///
/// Implementations own id assignment, whitespace trimming, timestamps and the
/// email uniqueness check, and must run each call atomically with respect to
/// the others. Absence is `None`/`false`, never an error.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Snapshot of all users in insertion order.
    async fn list(&self) -> Vec<User>;

    async fn get_by_id(&self, id: u64) -> Option<User>;

    /// Assign the next id, trim fields, stamp UTC now, mark active, append.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Replace names, email and active flag in place. `Ok(None)` when `id` is absent.
    async fn update(&self, id: u64, update: UserUpdate) -> Result<Option<User>, StoreError>;

    /// Returns true if a user was removed.
    async fn delete(&self, id: u64) -> bool;
}
