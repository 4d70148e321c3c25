use async_trait::async_trait;

use crate::contract::{
    error::UsersInfoError,
    model::{NewUser, User, UserUpdate},
};

/// Public API trait for the users_info module that other modules can use
#[async_trait]
pub trait UsersInfoApi: Send + Sync {
    /// All users in insertion order
    async fn list_users(&self) -> Result<Vec<User>, UsersInfoError>;

    async fn get_user(&self, id: u64) -> Result<User, UsersInfoError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, UsersInfoError>;

    /// Replace names, email and active flag; id and creation time are kept
    async fn update_user(&self, id: u64, update: UserUpdate) -> Result<User, UsersInfoError>;

    async fn delete_user(&self, id: u64) -> Result<(), UsersInfoError>;
}
