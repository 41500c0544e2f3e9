//! SQLite implementation of the TeamRepository
//!
//! A team is stored across `teams` and `team_members`; both tables are always
//! read and written together so the aggregate is loaded and saved whole.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::debug;

use crate::domain::identity::{TeamId, TeamMemberId, UserId};
use crate::domain::teams::{Team, TeamMember, TeamRepository, TeamRole};
use crate::error::{Error, Result};
use crate::storage::UnitOfWork;

/// SQLite team repository bound to one unit of work
#[derive(Debug, Clone)]
pub struct SqliteTeamRepository {
    uow: UnitOfWork,
}

impl SqliteTeamRepository {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl TeamRepository for SqliteTeamRepository {
    async fn get_by_id(&self, id: TeamId) -> Result<Option<Team>> {
        let mut tx = self.uow.transaction().await?;
        let conn: &mut SqliteConnection = &mut tx;

        let row: Option<TeamRow> = sqlx::query_as(
            "SELECT id, name, description, created_date FROM teams WHERE id = ?",
        )
        .bind(id.value())
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let members: Vec<TeamMemberRow> = sqlx::query_as(
            r#"
            SELECT id, team_id, user_id, role, joined_date
            FROM team_members
            WHERE team_id = ?
            ORDER BY id
            "#,
        )
        .bind(id.value())
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(row.into_team(members)?))
    }

    async fn get_all(&self) -> Result<Vec<Team>> {
        let mut tx = self.uow.transaction().await?;
        let conn: &mut SqliteConnection = &mut tx;

        let rows: Vec<TeamRow> =
            sqlx::query_as("SELECT id, name, description, created_date FROM teams ORDER BY id")
                .fetch_all(&mut *conn)
                .await?;

        let member_rows: Vec<TeamMemberRow> = sqlx::query_as(
            "SELECT id, team_id, user_id, role, joined_date FROM team_members ORDER BY team_id, id",
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut members_by_team: HashMap<i64, Vec<TeamMemberRow>> = HashMap::new();
        for member in member_rows {
            members_by_team.entry(member.team_id).or_default().push(member);
        }

        rows.into_iter()
            .map(|row| {
                let members = members_by_team.remove(&row.id).unwrap_or_default();
                row.into_team(members)
            })
            .collect()
    }

    async fn exists(&self, id: TeamId) -> Result<bool> {
        let mut tx = self.uow.transaction().await?;
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM teams WHERE id = ?)")
            .bind(id.value())
            .fetch_one(&mut **tx)
            .await?;
        Ok(exists)
    }

    async fn add(&self, team: &mut Team) -> Result<TeamId> {
        let mut tx = self.uow.transaction().await?;
        let conn: &mut SqliteConnection = &mut tx;

        let result = sqlx::query(
            "INSERT INTO teams (name, description, created_date) VALUES (?, ?, ?)",
        )
        .bind(team.name())
        .bind(team.description())
        .bind(team.created_date())
        .execute(&mut *conn)
        .await?;

        let id = TeamId::new(result.last_insert_rowid())?;
        team.mark_persisted(id);

        for member in team.members.iter_mut() {
            insert_member(conn, id, member).await?;
        }

        debug!(team_id = %id, members = team.members.len(), "Team row inserted");
        Ok(id)
    }

    async fn update(&self, team: &mut Team) -> Result<()> {
        let id = team.persisted_id()?;
        let mut tx = self.uow.transaction().await?;
        let conn: &mut SqliteConnection = &mut tx;

        sqlx::query("UPDATE teams SET name = ?, description = ? WHERE id = ?")
            .bind(team.name())
            .bind(team.description())
            .bind(id.value())
            .execute(&mut *conn)
            .await?;

        let stored: Vec<(i64,)> = sqlx::query_as("SELECT id FROM team_members WHERE team_id = ?")
            .bind(id.value())
            .fetch_all(&mut *conn)
            .await?;

        let kept: HashSet<i64> = team
            .members
            .iter()
            .filter_map(|m| m.id.map(TeamMemberId::value))
            .collect();

        for (member_id,) in stored {
            if !kept.contains(&member_id) {
                sqlx::query("DELETE FROM team_members WHERE id = ?")
                    .bind(member_id)
                    .execute(&mut *conn)
                    .await?;
            }
        }

        for member in team.members.iter_mut() {
            match member.id {
                Some(member_id) => {
                    sqlx::query("UPDATE team_members SET role = ? WHERE id = ?")
                        .bind(member.role.ordinal())
                        .bind(member_id.value())
                        .execute(&mut *conn)
                        .await?;
                }
                None => insert_member(conn, id, member).await?,
            }
        }

        debug!(team_id = %id, members = team.members.len(), "Team row updated");
        Ok(())
    }

    async fn delete(&self, id: TeamId) -> Result<bool> {
        let mut tx = self.uow.transaction().await?;
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id.value())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn insert_member(
    conn: &mut SqliteConnection,
    team_id: TeamId,
    member: &mut TeamMember,
) -> Result<()> {
    let result = sqlx::query(
        "INSERT INTO team_members (team_id, user_id, role, joined_date) VALUES (?, ?, ?, ?)",
    )
    .bind(team_id.value())
    .bind(member.user_id.value())
    .bind(member.role.ordinal())
    .bind(member.joined_date)
    .execute(&mut *conn)
    .await?;

    member.id = Some(TeamMemberId::new(result.last_insert_rowid())?);
    Ok(())
}

/// Database row for a team
#[derive(FromRow)]
struct TeamRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_date: DateTime<Utc>,
}

impl TeamRow {
    fn into_team(self, members: Vec<TeamMemberRow>) -> Result<Team> {
        let id = TeamId::new(self.id)
            .map_err(|e| Error::Parse(format!("Invalid team ID in teams table: {}", e)))?;
        let members = members
            .into_iter()
            .map(TeamMemberRow::into_member)
            .collect::<Result<Vec<_>>>()?;

        Ok(Team {
            id: Some(id),
            name: self.name,
            description: self.description,
            created_date: self.created_date,
            members,
        })
    }
}

/// Database row for a team membership
#[derive(FromRow)]
struct TeamMemberRow {
    id: i64,
    team_id: i64,
    user_id: i64,
    role: i64,
    joined_date: DateTime<Utc>,
}

impl TeamMemberRow {
    fn into_member(self) -> Result<TeamMember> {
        let id = TeamMemberId::new(self.id)
            .map_err(|e| Error::Parse(format!("Invalid team member ID: {}", e)))?;
        let user_id = UserId::new(self.user_id)
            .map_err(|e| Error::Parse(format!("Invalid user ID in team_members: {}", e)))?;
        let role = TeamRole::from_ordinal(self.role)
            .map_err(|e| Error::Parse(format!("Invalid team role: {}", e)))?;

        Ok(TeamMember {
            id: Some(id),
            user_id,
            joined_date: self.joined_date,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationLimits;
    use crate::storage::Database;

    async fn setup_repo() -> SqliteTeamRepository {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        let uow = UnitOfWork::begin(&db).await.expect("Failed to begin");
        SqliteTeamRepository::new(uow)
    }

    fn team(name: &str) -> Team {
        Team::new(name, Some("desc"), &ValidationLimits::default()).unwrap()
    }

    fn user(id: i64) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_add_and_load_with_members() {
        let repo = setup_repo().await;
        let mut team = team("Dev");
        team.add_member(user(1), TeamRole::Lead).unwrap();
        team.add_member(user(2), TeamRole::Member).unwrap();

        let id = repo.add(&mut team).await.unwrap();
        assert!(team.members().iter().all(|m| m.id().is_some()));

        let loaded = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded, team);
        assert_eq!(loaded.member_ids(), vec![user(1), user(2)]);
    }

    #[tokio::test]
    async fn test_update_synchronises_members() {
        let repo = setup_repo().await;
        let mut team = team("Dev");
        team.add_member(user(1), TeamRole::Member).unwrap();
        team.add_member(user(2), TeamRole::Member).unwrap();
        let id = repo.add(&mut team).await.unwrap();

        team.remove_member(user(1)).unwrap();
        team.add_member(user(3), TeamRole::Admin).unwrap();
        team.update("Platform", None, &ValidationLimits::default())
            .unwrap();
        repo.update(&mut team).await.unwrap();

        let loaded = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded.name(), "Platform");
        assert_eq!(loaded.description(), None);
        assert_eq!(loaded.member_ids(), vec![user(2), user(3)]);
        assert_eq!(loaded.member(user(3)).unwrap().role(), TeamRole::Admin);
    }

    #[tokio::test]
    async fn test_repeated_update_keeps_state() {
        let repo = setup_repo().await;
        let mut team = team("Dev");
        let id = repo.add(&mut team).await.unwrap();

        team.add_member(user(5), TeamRole::Member).unwrap();
        repo.update(&mut team).await.unwrap();
        repo.update(&mut team).await.unwrap();

        let loaded = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded.members().len(), 1);
        assert_eq!(loaded, team);
    }

    #[tokio::test]
    async fn test_get_all_groups_members_by_team() {
        let repo = setup_repo().await;
        let mut a = team("A");
        a.add_member(user(1), TeamRole::Member).unwrap();
        let mut b = team("B");
        b.add_member(user(2), TeamRole::Member).unwrap();
        b.add_member(user(3), TeamRole::Member).unwrap();
        repo.add(&mut a).await.unwrap();
        repo.add(&mut b).await.unwrap();
        repo.add(&mut team("C")).await.unwrap();

        let all = repo.get_all().await.unwrap();
        let names: Vec<_> = all.iter().map(Team::name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(all[0].members().len(), 1);
        assert_eq!(all[1].members().len(), 2);
        assert!(all[2].members().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_team() {
        let repo = setup_repo().await;
        let mut team = team("Dev");
        team.add_member(user(1), TeamRole::Member).unwrap();
        let id = repo.add(&mut team).await.unwrap();

        assert!(repo.exists(id).await.unwrap());
        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.exists(id).await.unwrap());
        assert!(repo.get_by_id(id).await.unwrap().is_none());
    }
}
