//! Repository trait for user persistence

use async_trait::async_trait;

use crate::domain::identity::UserId;
use crate::error::Result;

use super::entity::User;

/// Repository trait for the user aggregate
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by ID; absence is `Ok(None)`
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// List all users ordered by ID
    async fn get_all(&self) -> Result<Vec<User>>;

    /// Batch lookup; unknown ids are skipped
    async fn get_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>>;

    /// Find a user by email, ignoring case
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Check whether a user exists
    async fn exists(&self, id: UserId) -> Result<bool>;

    /// Insert a new user and record the identity the store assigned to it
    async fn add(&self, user: &mut User) -> Result<UserId>;

    /// Write the full state of a persisted user
    async fn update(&self, user: &User) -> Result<()>;

    /// Permanently delete a user; returns whether a row was removed
    async fn delete(&self, id: UserId) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    fn _assert_object_safe(_: &dyn UserRepository) {}
}
