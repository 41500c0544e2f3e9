//! SQLite implementation of the UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use tracing::debug;

use crate::domain::identity::UserId;
use crate::domain::users::{User, UserRepository};
use crate::error::{Error, Result};
use crate::storage::UnitOfWork;

const USER_COLUMNS: &str = "id, email, first_name, last_name, created_date, is_active";

/// SQLite user repository bound to one unit of work
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    uow: UnitOfWork,
}

impl SqliteUserRepository {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let mut tx = self.uow.transaction().await?;
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
                .bind(id.value())
                .fetch_optional(&mut **tx)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        let mut tx = self.uow.transaction().await?;
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
                .fetch_all(&mut **tx)
                .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn get_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM users WHERE id IN (", USER_COLUMNS));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.value());
        }
        separated.push_unseparated(") ORDER BY id");

        let mut tx = self.uow.transaction().await?;
        let rows: Vec<UserRow> = builder.build_query_as().fetch_all(&mut **tx).await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut tx = self.uow.transaction().await?;
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE email = ? COLLATE NOCASE",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&mut **tx)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists(&self, id: UserId) -> Result<bool> {
        let mut tx = self.uow.transaction().await?;
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id.value())
            .fetch_one(&mut **tx)
            .await?;
        Ok(exists)
    }

    async fn add(&self, user: &mut User) -> Result<UserId> {
        let mut tx = self.uow.transaction().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, first_name, last_name, created_date, is_active)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.email())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.created_date())
        .bind(user.is_active())
        .execute(&mut **tx)
        .await?;

        let id = UserId::new(result.last_insert_rowid())?;
        user.mark_persisted(id);
        debug!(user_id = %id, "User row inserted");
        Ok(id)
    }

    async fn update(&self, user: &User) -> Result<()> {
        let id = user.persisted_id()?;
        let mut tx = self.uow.transaction().await?;
        sqlx::query(
            r#"
            UPDATE users SET
                email = ?,
                first_name = ?,
                last_name = ?,
                is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(user.email())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.is_active())
        .bind(id.value())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<bool> {
        let mut tx = self.uow.transaction().await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.value())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Database row for a user
#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
    created_date: DateTime<Utc>,
    is_active: bool,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let id = UserId::new(self.id)
            .map_err(|e| Error::Parse(format!("Invalid user ID in users table: {}", e)))?;

        Ok(User {
            id: Some(id),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            created_date: self.created_date,
            is_active: self.is_active,
        })
    }
}
