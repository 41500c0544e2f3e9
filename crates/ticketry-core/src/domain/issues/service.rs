//! Issue service
//!
//! Every mutation loads the issue first. Assignments to a user or a team are
//! checked against the owning module before the issue is changed; clearing an
//! assignment needs no check.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::ValidationLimits;
use crate::domain::identity::{IssueId, TeamId, UserId};
use crate::domain::teams::TeamLookup;
use crate::domain::users::UserLookup;
use crate::error::{Error, Result};

use super::entity::{Issue, IssueStatus, Priority};
use super::repository::IssueRepository;

/// Application service for the issue module
pub struct IssueService<R: IssueRepository> {
    repository: Arc<R>,
    users: Arc<dyn UserLookup>,
    teams: Arc<dyn TeamLookup>,
    limits: ValidationLimits,
}

impl<R: IssueRepository> IssueService<R> {
    pub fn new(
        repository: Arc<R>,
        users: Arc<dyn UserLookup>,
        teams: Arc<dyn TeamLookup>,
        limits: ValidationLimits,
    ) -> Self {
        Self {
            repository,
            users,
            teams,
            limits,
        }
    }

    /// Create an open, unassigned issue
    pub async fn create_issue(
        &self,
        title: &str,
        description: Option<&str>,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<IssueId> {
        let mut issue = Issue::new(title, description, priority, due_date, &self.limits)?;
        let issue_id = self.repository.add(&mut issue).await?;

        info!(issue_id = %issue_id, priority = %priority, "Issue created");
        Ok(issue_id)
    }

    pub async fn get_issue(&self, issue_id: IssueId) -> Result<Option<Issue>> {
        self.repository.get_by_id(issue_id).await
    }

    pub async fn get_all_issues(&self) -> Result<Vec<Issue>> {
        self.repository.get_all().await
    }

    pub async fn issue_exists(&self, issue_id: IssueId) -> Result<bool> {
        self.repository.exists(issue_id).await
    }

    pub async fn get_issues_by_user(&self, user_id: UserId) -> Result<Vec<Issue>> {
        self.repository.get_by_assigned_user(user_id).await
    }

    pub async fn get_issues_by_team(&self, team_id: TeamId) -> Result<Vec<Issue>> {
        self.repository.get_by_assigned_team(team_id).await
    }

    pub async fn update_issue(
        &self,
        issue_id: IssueId,
        title: &str,
        description: Option<&str>,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut issue = self.load(issue_id).await?;
        issue.update(title, description, priority, due_date, &self.limits)?;
        self.repository.update(&issue).await?;

        debug!(issue_id = %issue_id, "Issue updated");
        Ok(())
    }

    /// Assign the issue to a user, or clear the assignment with `None`
    pub async fn assign_to_user(&self, issue_id: IssueId, user_id: Option<UserId>) -> Result<()> {
        let mut issue = self.load(issue_id).await?;

        if let Some(user_id) = user_id {
            if !self.users.user_exists(user_id).await? {
                return Err(Error::missing_reference("User", user_id));
            }
        }

        issue.assign_to_user(user_id);
        self.repository.update(&issue).await?;

        match user_id {
            Some(user_id) => info!(issue_id = %issue_id, user_id = %user_id, "Issue assigned to user"),
            None => info!(issue_id = %issue_id, "Issue unassigned from user"),
        }
        Ok(())
    }

    /// Assign the issue to a team, or clear the assignment with `None`
    pub async fn assign_to_team(&self, issue_id: IssueId, team_id: Option<TeamId>) -> Result<()> {
        let mut issue = self.load(issue_id).await?;

        if let Some(team_id) = team_id {
            if !self.teams.team_exists(team_id).await? {
                return Err(Error::missing_reference("Team", team_id));
            }
        }

        issue.assign_to_team(team_id);
        self.repository.update(&issue).await?;

        match team_id {
            Some(team_id) => info!(issue_id = %issue_id, team_id = %team_id, "Issue assigned to team"),
            None => info!(issue_id = %issue_id, "Issue unassigned from team"),
        }
        Ok(())
    }

    pub async fn update_status(&self, issue_id: IssueId, status: IssueStatus) -> Result<()> {
        let mut issue = self.load(issue_id).await?;
        let previous = issue.status();
        issue.update_status(status);
        self.repository.update(&issue).await?;

        info!(issue_id = %issue_id, from = %previous, to = %status, "Issue status changed");
        Ok(())
    }

    pub async fn delete_issue(&self, issue_id: IssueId) -> Result<()> {
        if !self.repository.delete(issue_id).await? {
            return Err(Error::not_found("Issue", issue_id));
        }

        info!(issue_id = %issue_id, "Issue deleted");
        Ok(())
    }

    async fn load(&self, issue_id: IssueId) -> Result<Issue> {
        self.repository
            .get_by_id(issue_id)
            .await?
            .ok_or_else(|| Error::not_found("Issue", issue_id))
    }
}
