//! SQLite implementation of the IssueRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::debug;

use crate::domain::identity::{IssueId, TeamId, UserId};
use crate::domain::issues::{Issue, IssueRepository, IssueStatus, Priority};
use crate::error::{Error, Result};
use crate::storage::UnitOfWork;

const ISSUE_COLUMNS: &str = r#"
    id, title, description, status, priority,
    assigned_user_id, assigned_team_id,
    created_date, due_date, resolved_date, last_modified_date
"#;

/// SQLite issue repository bound to one unit of work
#[derive(Debug, Clone)]
pub struct SqliteIssueRepository {
    uow: UnitOfWork,
}

impl SqliteIssueRepository {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// Run a filtered SELECT over issues, newest first
    async fn select_where(&self, filter: &str, value: Option<i64>) -> Result<Vec<Issue>> {
        let sql = format!(
            "SELECT {} FROM issues {} ORDER BY created_date DESC, id DESC",
            ISSUE_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<_, IssueRow>(&sql);
        if let Some(value) = value {
            query = query.bind(value);
        }

        let mut tx = self.uow.transaction().await?;
        let rows = query.fetch_all(&mut **tx).await?;

        rows.into_iter().map(IssueRow::into_issue).collect()
    }
}

#[async_trait]
impl IssueRepository for SqliteIssueRepository {
    async fn get_by_id(&self, id: IssueId) -> Result<Option<Issue>> {
        let mut tx = self.uow.transaction().await?;
        let row: Option<IssueRow> =
            sqlx::query_as(&format!("SELECT {} FROM issues WHERE id = ?", ISSUE_COLUMNS))
                .bind(id.value())
                .fetch_optional(&mut **tx)
                .await?;

        row.map(IssueRow::into_issue).transpose()
    }

    async fn get_all(&self) -> Result<Vec<Issue>> {
        self.select_where("", None).await
    }

    async fn get_by_assigned_user(&self, user_id: UserId) -> Result<Vec<Issue>> {
        self.select_where("WHERE assigned_user_id = ?", Some(user_id.value()))
            .await
    }

    async fn get_by_assigned_team(&self, team_id: TeamId) -> Result<Vec<Issue>> {
        self.select_where("WHERE assigned_team_id = ?", Some(team_id.value()))
            .await
    }

    async fn exists(&self, id: IssueId) -> Result<bool> {
        let mut tx = self.uow.transaction().await?;
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM issues WHERE id = ?)")
                .bind(id.value())
                .fetch_one(&mut **tx)
                .await?;
        Ok(exists)
    }

    async fn add(&self, issue: &mut Issue) -> Result<IssueId> {
        let mut tx = self.uow.transaction().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO issues (
                title, description, status, priority,
                assigned_user_id, assigned_team_id,
                created_date, due_date, resolved_date, last_modified_date
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(issue.title())
        .bind(issue.description())
        .bind(issue.status().as_str())
        .bind(issue.priority().ordinal())
        .bind(issue.assigned_user_id().map(UserId::value))
        .bind(issue.assigned_team_id().map(TeamId::value))
        .bind(issue.created_date())
        .bind(issue.due_date())
        .bind(issue.resolved_date())
        .bind(issue.last_modified_date())
        .execute(&mut **tx)
        .await?;

        let id = IssueId::new(result.last_insert_rowid())?;
        issue.mark_persisted(id);
        debug!(issue_id = %id, "Issue row inserted");
        Ok(id)
    }

    async fn update(&self, issue: &Issue) -> Result<()> {
        let id = issue.persisted_id()?;
        let mut tx = self.uow.transaction().await?;
        sqlx::query(
            r#"
            UPDATE issues SET
                title = ?,
                description = ?,
                status = ?,
                priority = ?,
                assigned_user_id = ?,
                assigned_team_id = ?,
                due_date = ?,
                resolved_date = ?,
                last_modified_date = ?
            WHERE id = ?
            "#,
        )
        .bind(issue.title())
        .bind(issue.description())
        .bind(issue.status().as_str())
        .bind(issue.priority().ordinal())
        .bind(issue.assigned_user_id().map(UserId::value))
        .bind(issue.assigned_team_id().map(TeamId::value))
        .bind(issue.due_date())
        .bind(issue.resolved_date())
        .bind(issue.last_modified_date())
        .bind(id.value())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: IssueId) -> Result<bool> {
        let mut tx = self.uow.transaction().await?;
        let result = sqlx::query("DELETE FROM issues WHERE id = ?")
            .bind(id.value())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Database row for an issue
#[derive(FromRow)]
struct IssueRow {
    id: i64,
    title: String,
    description: Option<String>,
    status: String,
    priority: i64,
    assigned_user_id: Option<i64>,
    assigned_team_id: Option<i64>,
    created_date: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
    resolved_date: Option<DateTime<Utc>>,
    last_modified_date: DateTime<Utc>,
}

impl IssueRow {
    fn into_issue(self) -> Result<Issue> {
        let id = IssueId::new(self.id)
            .map_err(|e| Error::Parse(format!("Invalid issue ID: {}", e)))?;
        let status = IssueStatus::from_str(&self.status)
            .ok_or_else(|| Error::Parse(format!("Invalid issue status: {}", self.status)))?;
        let priority = Priority::from_ordinal(self.priority)
            .map_err(|e| Error::Parse(format!("Invalid issue priority: {}", e)))?;
        let assigned_user_id = self
            .assigned_user_id
            .map(UserId::new)
            .transpose()
            .map_err(|e| Error::Parse(format!("Invalid assigned user ID: {}", e)))?;
        let assigned_team_id = self
            .assigned_team_id
            .map(TeamId::new)
            .transpose()
            .map_err(|e| Error::Parse(format!("Invalid assigned team ID: {}", e)))?;

        Ok(Issue {
            id: Some(id),
            title: self.title,
            description: self.description,
            status,
            priority,
            assigned_user_id,
            assigned_team_id,
            created_date: self.created_date,
            due_date: self.due_date,
            resolved_date: self.resolved_date,
            last_modified_date: self.last_modified_date,
        })
    }
}
