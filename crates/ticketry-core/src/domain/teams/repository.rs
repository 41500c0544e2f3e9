//! Repository trait for team persistence

use async_trait::async_trait;

use crate::domain::identity::TeamId;
use crate::error::Result;

use super::entity::Team;

/// Repository trait for the team aggregate, members included
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Get a team and its members by ID; absence is `Ok(None)`
    async fn get_by_id(&self, id: TeamId) -> Result<Option<Team>>;

    /// List all teams ordered by ID
    async fn get_all(&self) -> Result<Vec<Team>>;

    /// Check whether a team exists
    async fn exists(&self, id: TeamId) -> Result<bool>;

    /// Insert a new team with its members and record the assigned identities
    async fn add(&self, team: &mut Team) -> Result<TeamId>;

    /// Write the full state of a persisted team
    ///
    /// Membership rows are synchronised with the in-memory list: removed
    /// members are deleted and new members are inserted and get their ids.
    async fn update(&self, team: &mut Team) -> Result<()>;

    /// Delete a team and its members; returns whether a row was removed
    async fn delete(&self, id: TeamId) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    fn _assert_object_safe(_: &dyn TeamRepository) {}
}
