//! Issue aggregate
//!
//! The issue is the only entry point for changing its own state. References
//! into the user and team modules are held by identity only; whether they
//! exist is checked by the service before the aggregate is touched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ValidationLimits;
use crate::domain::identity::{IssueId, TeamId, UserId};
use crate::domain::validation;
use crate::error::{Error, Result};

/// Workflow status of an issue
///
/// No transition graph is enforced; any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Blocked,
    Resolved,
    Closed,
}

impl IssueStatus {
    /// Create from string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "open" => Some(Self::Open),
            "in_progress" | "inprogress" => Some(Self::InProgress),
            "blocked" => Some(Self::Blocked),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl Default for IssueStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issue priority; a lower ordinal is more urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    /// Numeric ordinal as stored and exchanged at the module boundary
    pub fn ordinal(self) -> i64 {
        self as i64
    }

    /// Look up a priority by ordinal
    pub fn from_ordinal(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Critical),
            1 => Ok(Self::High),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Low),
            other => Err(Error::validation(format!(
                "Priority must be between 0 and 3, got {}",
                other
            ))),
        }
    }

    /// Create from a name ("high") or an ordinal ("1")
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            other => other
                .parse::<i64>()
                .ok()
                .and_then(|n| Self::from_ordinal(n).ok()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An issue tracked by the issue module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub(crate) id: Option<IssueId>,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) status: IssueStatus,
    pub(crate) priority: Priority,
    pub(crate) assigned_user_id: Option<UserId>,
    pub(crate) assigned_team_id: Option<TeamId>,
    pub(crate) created_date: DateTime<Utc>,
    pub(crate) due_date: Option<DateTime<Utc>>,
    pub(crate) resolved_date: Option<DateTime<Utc>>,
    pub(crate) last_modified_date: DateTime<Utc>,
}

impl Issue {
    /// Create a new, not yet persisted, open issue
    pub fn new(
        title: &str,
        description: Option<&str>,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
        limits: &ValidationLimits,
    ) -> Result<Self> {
        let title = validation::required_text("Title", title, limits.issue_title_max)?;
        let description =
            validation::optional_text("Description", description, limits.issue_description_max)?;
        let now = Utc::now();

        Ok(Self {
            id: None,
            title,
            description,
            status: IssueStatus::Open,
            priority,
            assigned_user_id: None,
            assigned_team_id: None,
            created_date: now,
            due_date,
            resolved_date: None,
            last_modified_date: now,
        })
    }

    /// Record the identity assigned by the store on first save
    pub(crate) fn mark_persisted(&mut self, id: IssueId) {
        self.id = Some(id);
    }

    pub fn id(&self) -> Option<IssueId> {
        self.id
    }

    /// Identity of a persisted issue
    pub fn persisted_id(&self) -> Result<IssueId> {
        self.id
            .ok_or_else(|| Error::invalid_operation("Issue has not been saved yet"))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> IssueStatus {
        self.status
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn assigned_user_id(&self) -> Option<UserId> {
        self.assigned_user_id
    }

    pub fn assigned_team_id(&self) -> Option<TeamId> {
        self.assigned_team_id
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn resolved_date(&self) -> Option<DateTime<Utc>> {
        self.resolved_date
    }

    pub fn last_modified_date(&self) -> DateTime<Utc> {
        self.last_modified_date
    }

    /// Replace the editable details of the issue
    ///
    /// Validation happens before any field changes, so a rejected update
    /// leaves the issue as it was.
    pub fn update(
        &mut self,
        title: &str,
        description: Option<&str>,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
        limits: &ValidationLimits,
    ) -> Result<()> {
        let title = validation::required_text("Title", title, limits.issue_title_max)?;
        let description =
            validation::optional_text("Description", description, limits.issue_description_max)?;

        self.title = title;
        self.description = description;
        self.priority = priority;
        self.due_date = due_date;
        self.touch();
        Ok(())
    }

    /// Assign to a user, or unassign with `None`
    pub fn assign_to_user(&mut self, user_id: Option<UserId>) {
        self.assigned_user_id = user_id;
        self.touch();
    }

    /// Assign to a team, or unassign with `None`
    pub fn assign_to_team(&mut self, team_id: Option<TeamId>) {
        self.assigned_team_id = team_id;
        self.touch();
    }

    /// Move the issue to a new status
    ///
    /// Entering `Resolved` stamps the resolved date; leaving it clears the
    /// stamp. Staying in `Resolved` keeps the original stamp.
    pub fn update_status(&mut self, status: IssueStatus) {
        let now = Utc::now();
        match (self.status, status) {
            (IssueStatus::Resolved, IssueStatus::Resolved) => {}
            (_, IssueStatus::Resolved) => self.resolved_date = Some(now),
            (IssueStatus::Resolved, _) => self.resolved_date = None,
            _ => {}
        }
        self.status = status;
        self.last_modified_date = now;
    }

    fn touch(&mut self) {
        self.last_modified_date = Utc::now();
    }
}
