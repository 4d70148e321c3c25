use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{NewUser, User, UserUpdate};
use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;

/// Domain service for user management.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "users_info.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let users = self.repo.list().await;
        debug!("Listed {} users", users.len());
        Ok(users)
    }

    #[instrument(name = "users_info.service.get_user", skip(self), fields(user_id = id))]
    pub async fn get_user(&self, id: u64) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.repo
            .get_by_id(id)
            .await
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "users_info.service.create_user", skip(self, new_user))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        let user = self.repo.create(new_user).await.inspect_err(|e| {
            warn!(error = %e, "User creation rejected");
        })?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(name = "users_info.service.update_user", skip(self, update), fields(user_id = id))]
    pub async fn update_user(&self, id: u64, update: UserUpdate) -> Result<User, DomainError> {
        info!("Updating user");

        let user = self
            .repo
            .update(id, update)
            .await
            .inspect_err(|e| warn!(error = %e, "User update rejected"))?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        info!("Successfully updated user");
        Ok(user)
    }

    #[instrument(name = "users_info.service.delete_user", skip(self), fields(user_id = id))]
    pub async fn delete_user(&self, id: u64) -> Result<(), DomainError> {
        info!("Deleting user");

        if !self.repo.delete(id).await {
            return Err(DomainError::user_not_found(id));
        }

        info!("Successfully deleted user");
        Ok(())
    }
}
