//! User service
//!
//! Orchestrates load → validate → mutate → persist for the user aggregate.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{UserSettings, ValidationLimits};
use crate::domain::identity::UserId;
use crate::domain::validation;
use crate::error::{Error, Result};

use super::entity::User;
use super::repository::UserRepository;

/// Application service for the user module
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    limits: ValidationLimits,
    settings: UserSettings,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, limits: ValidationLimits, settings: UserSettings) -> Self {
        Self {
            repository,
            limits,
            settings,
        }
    }

    /// Create a user; the email must not be in use yet
    pub async fn create_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<UserId> {
        let mut user = User::new(email, first_name, last_name, &self.limits)?;

        if self.repository.find_by_email(user.email()).await?.is_some() {
            return Err(Error::invalid_operation(format!(
                "User with email '{}' already exists",
                user.email()
            )));
        }

        let user_id = self.repository.add(&mut user).await?;
        info!(user_id = %user_id, email = %user.email(), "User created");
        Ok(user_id)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        self.repository.get_by_id(user_id).await
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        self.repository.get_all().await
    }

    /// Batch lookup; ids that do not exist are left out of the result
    pub async fn get_users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.repository.get_by_ids(user_ids).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = validation::email_key(email);
        if email.is_empty() {
            return Ok(None);
        }
        self.repository.find_by_email(&email).await
    }

    pub async fn user_exists(&self, user_id: UserId) -> Result<bool> {
        self.repository.exists(user_id).await
    }

    /// Change a user's name
    pub async fn update_user(
        &self,
        user_id: UserId,
        first_name: &str,
        last_name: &str,
    ) -> Result<()> {
        let mut user = self.load(user_id).await?;
        user.update(first_name, last_name, &self.limits)?;
        self.repository.update(&user).await?;

        debug!(user_id = %user_id, "User updated");
        Ok(())
    }

    pub async fn deactivate_user(&self, user_id: UserId) -> Result<()> {
        let mut user = self.load(user_id).await?;
        user.deactivate();
        self.repository.update(&user).await?;

        info!(user_id = %user_id, "User deactivated");
        Ok(())
    }

    pub async fn activate_user(&self, user_id: UserId) -> Result<()> {
        let mut user = self.load(user_id).await?;
        user.activate();
        self.repository.update(&user).await?;

        info!(user_id = %user_id, "User activated");
        Ok(())
    }

    /// Permanently delete a user
    ///
    /// Only available when `users.allow_permanent_delete` is enabled.
    /// References held by other modules are left as they are.
    pub async fn delete_user(&self, user_id: UserId) -> Result<()> {
        if !self.settings.allow_permanent_delete {
            warn!(user_id = %user_id, "Permanent user delete attempted while disabled");
            return Err(Error::invalid_operation(
                "Permanent user deletion is disabled; set users.allow_permanent_delete = true to enable it",
            ));
        }

        if !self.repository.delete(user_id).await? {
            return Err(Error::not_found("User", user_id));
        }

        info!(user_id = %user_id, "User permanently deleted");
        Ok(())
    }

    async fn load(&self, user_id: UserId) -> Result<User> {
        self.repository
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User", user_id))
    }
}
