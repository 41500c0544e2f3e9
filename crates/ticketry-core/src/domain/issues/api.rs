//! Public contract of the issue module
//!
//! Priorities cross the boundary as ordinals (0 critical .. 3 low) and
//! statuses as their snake_case names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::identity::{IssueId, TeamId, UserId};
use crate::error::Result;

use super::entity::{Issue, IssueStatus, Priority};
use super::repository::IssueRepository;
use super::service::IssueService;

fn default_priority() -> i64 {
    Priority::default().ordinal()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIssueRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateIssueRequest {
    pub issue_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Issue as seen from outside the module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: i64,
    pub assigned_user_id: Option<i64>,
    pub assigned_team_id: Option<i64>,
    pub created_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub resolved_date: Option<DateTime<Utc>>,
    pub last_modified_date: DateTime<Utc>,
}

impl IssueResponse {
    fn from_issue(issue: &Issue) -> Result<Self> {
        Ok(Self {
            id: issue.persisted_id()?.value(),
            title: issue.title().to_string(),
            description: issue.description().map(str::to_string),
            status: issue.status(),
            priority: issue.priority().ordinal(),
            assigned_user_id: issue.assigned_user_id().map(i64::from),
            assigned_team_id: issue.assigned_team_id().map(i64::from),
            created_date: issue.created_date(),
            due_date: issue.due_date(),
            resolved_date: issue.resolved_date(),
            last_modified_date: issue.last_modified_date(),
        })
    }

    fn from_issues(issues: &[Issue]) -> Result<Vec<Self>> {
        issues.iter().map(Self::from_issue).collect()
    }
}

/// Facade over the issue service
pub struct IssueApi<R: IssueRepository> {
    service: IssueService<R>,
}

impl<R: IssueRepository> IssueApi<R> {
    pub fn new(service: IssueService<R>) -> Self {
        Self { service }
    }

    pub async fn create_issue(&self, request: CreateIssueRequest) -> Result<i64> {
        let priority = Priority::from_ordinal(request.priority)?;
        let issue_id = self
            .service
            .create_issue(
                &request.title,
                request.description.as_deref(),
                priority,
                request.due_date,
            )
            .await?;
        Ok(issue_id.value())
    }

    pub async fn get_issue(&self, issue_id: i64) -> Result<Option<IssueResponse>> {
        let issue = self.service.get_issue(IssueId::new(issue_id)?).await?;
        issue.as_ref().map(IssueResponse::from_issue).transpose()
    }

    pub async fn get_all_issues(&self) -> Result<Vec<IssueResponse>> {
        let issues = self.service.get_all_issues().await?;
        IssueResponse::from_issues(&issues)
    }

    pub async fn update_issue(&self, request: UpdateIssueRequest) -> Result<()> {
        let issue_id = IssueId::new(request.issue_id)?;
        let priority = Priority::from_ordinal(request.priority)?;
        self.service
            .update_issue(
                issue_id,
                &request.title,
                request.description.as_deref(),
                priority,
                request.due_date,
            )
            .await
    }

    /// Assign to a user; `None` clears the assignment
    pub async fn assign_issue_to_user(&self, issue_id: i64, user_id: Option<i64>) -> Result<()> {
        let issue_id = IssueId::new(issue_id)?;
        let user_id = user_id.map(UserId::new).transpose()?;
        self.service.assign_to_user(issue_id, user_id).await
    }

    /// Assign to a team; `None` clears the assignment
    pub async fn assign_issue_to_team(&self, issue_id: i64, team_id: Option<i64>) -> Result<()> {
        let issue_id = IssueId::new(issue_id)?;
        let team_id = team_id.map(TeamId::new).transpose()?;
        self.service.assign_to_team(issue_id, team_id).await
    }

    pub async fn update_issue_status(&self, issue_id: i64, status: IssueStatus) -> Result<()> {
        self.service
            .update_status(IssueId::new(issue_id)?, status)
            .await
    }

    pub async fn get_issues_by_user(&self, user_id: i64) -> Result<Vec<IssueResponse>> {
        let issues = self
            .service
            .get_issues_by_user(UserId::new(user_id)?)
            .await?;
        IssueResponse::from_issues(&issues)
    }

    pub async fn get_issues_by_team(&self, team_id: i64) -> Result<Vec<IssueResponse>> {
        let issues = self
            .service
            .get_issues_by_team(TeamId::new(team_id)?)
            .await?;
        IssueResponse::from_issues(&issues)
    }

    pub async fn issue_exists(&self, issue_id: i64) -> Result<bool> {
        self.service.issue_exists(IssueId::new(issue_id)?).await
    }

    pub async fn delete_issue(&self, issue_id: i64) -> Result<()> {
        self.service.delete_issue(IssueId::new(issue_id)?).await
    }
}
