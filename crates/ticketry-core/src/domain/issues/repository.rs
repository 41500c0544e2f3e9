//! Repository trait for issue persistence
//!
//! The trait abstracts over storage backends; the SQLite implementation lives
//! in `crate::infrastructure::issues`.

use async_trait::async_trait;

use crate::domain::identity::{IssueId, TeamId, UserId};
use crate::error::Result;

use super::entity::Issue;

/// Repository trait for the issue aggregate
///
/// Every call runs inside the unit of work the repository was built on.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Get an issue by ID; absence is `Ok(None)`
    async fn get_by_id(&self, id: IssueId) -> Result<Option<Issue>>;

    /// List all issues, newest `created_date` first
    async fn get_all(&self) -> Result<Vec<Issue>>;

    /// List issues assigned to a user, newest first
    async fn get_by_assigned_user(&self, user_id: UserId) -> Result<Vec<Issue>>;

    /// List issues assigned to a team, newest first
    async fn get_by_assigned_team(&self, team_id: TeamId) -> Result<Vec<Issue>>;

    /// Check whether an issue exists
    async fn exists(&self, id: IssueId) -> Result<bool>;

    /// Insert a new issue and record the identity the store assigned to it
    async fn add(&self, issue: &mut Issue) -> Result<IssueId>;

    /// Write the full state of a persisted issue
    ///
    /// Calling this again for the same aggregate rewrites the same values.
    async fn update(&self, issue: &Issue) -> Result<()>;

    /// Delete an issue; returns whether a row was removed
    async fn delete(&self, id: IssueId) -> Result<bool>;
}
