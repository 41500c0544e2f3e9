//! Team service
//!
//! Membership changes follow the cross-module protocol: load the team, check
//! the user through [`UserLookup`], let the aggregate enforce its own rules,
//! then persist.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ValidationLimits;
use crate::domain::identity::{TeamId, UserId};
use crate::domain::users::UserLookup;
use crate::error::{Error, Result};

use super::entity::{Team, TeamMember, TeamRole};
use super::repository::TeamRepository;

/// Application service for the team module
pub struct TeamService<R: TeamRepository> {
    repository: Arc<R>,
    users: Arc<dyn UserLookup>,
    limits: ValidationLimits,
}

impl<R: TeamRepository> TeamService<R> {
    pub fn new(repository: Arc<R>, users: Arc<dyn UserLookup>, limits: ValidationLimits) -> Self {
        Self {
            repository,
            users,
            limits,
        }
    }

    pub async fn create_team(&self, name: &str, description: Option<&str>) -> Result<TeamId> {
        let mut team = Team::new(name, description, &self.limits)?;
        let team_id = self.repository.add(&mut team).await?;

        info!(team_id = %team_id, name = %team.name(), "Team created");
        Ok(team_id)
    }

    pub async fn get_team(&self, team_id: TeamId) -> Result<Option<Team>> {
        self.repository.get_by_id(team_id).await
    }

    pub async fn get_all_teams(&self) -> Result<Vec<Team>> {
        self.repository.get_all().await
    }

    pub async fn team_exists(&self, team_id: TeamId) -> Result<bool> {
        self.repository.exists(team_id).await
    }

    /// Members of a team; a missing team has none
    pub async fn get_team_members(&self, team_id: TeamId) -> Result<Vec<TeamMember>> {
        Ok(self
            .repository
            .get_by_id(team_id)
            .await?
            .map(|team| team.members)
            .unwrap_or_default())
    }

    pub async fn get_team_member_ids(&self, team_id: TeamId) -> Result<Vec<UserId>> {
        let members = self.get_team_members(team_id).await?;
        Ok(members.iter().map(TeamMember::user_id).collect())
    }

    pub async fn update_team(
        &self,
        team_id: TeamId,
        name: &str,
        description: Option<&str>,
    ) -> Result<()> {
        let mut team = self.load(team_id).await?;
        team.update(name, description, &self.limits)?;
        self.repository.update(&mut team).await?;

        debug!(team_id = %team_id, "Team updated");
        Ok(())
    }

    /// Add an existing user to a team
    pub async fn add_member(&self, team_id: TeamId, user_id: UserId, role: TeamRole) -> Result<()> {
        let mut team = self.load(team_id).await?;

        if !self.users.user_exists(user_id).await? {
            return Err(Error::missing_reference("User", user_id));
        }

        team.add_member(user_id, role)?;
        self.repository.update(&mut team).await?;

        info!(team_id = %team_id, user_id = %user_id, role = %role, "Member added to team");
        Ok(())
    }

    pub async fn remove_member(&self, team_id: TeamId, user_id: UserId) -> Result<()> {
        let mut team = self.load(team_id).await?;
        team.remove_member(user_id)?;
        self.repository.update(&mut team).await?;

        info!(team_id = %team_id, user_id = %user_id, "Member removed from team");
        Ok(())
    }

    /// Delete a team together with its memberships
    ///
    /// Issues assigned to the team keep their reference.
    pub async fn delete_team(&self, team_id: TeamId) -> Result<()> {
        if !self.repository.delete(team_id).await? {
            return Err(Error::not_found("Team", team_id));
        }

        info!(team_id = %team_id, "Team deleted");
        Ok(())
    }

    async fn load(&self, team_id: TeamId) -> Result<Team> {
        self.repository
            .get_by_id(team_id)
            .await?
            .ok_or_else(|| Error::not_found("Team", team_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserSettings;
    use crate::domain::users::{CreateUserRequest, UserApi, UserService};
    use crate::infrastructure::{SqliteTeamRepository, SqliteUserRepository};
    use crate::storage::{Database, UnitOfWork};

    struct Fixture {
        service: TeamService<SqliteTeamRepository>,
        users: Arc<UserApi<SqliteUserRepository>>,
    }

    async fn setup() -> Fixture {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        let uow = UnitOfWork::begin(&db).await.expect("Failed to begin");

        let users = Arc::new(UserApi::new(UserService::new(
            Arc::new(SqliteUserRepository::new(uow.clone())),
            ValidationLimits::default(),
            UserSettings::default(),
        )));
        let service = TeamService::new(
            Arc::new(SqliteTeamRepository::new(uow)),
            users.clone(),
            ValidationLimits::default(),
        );
        Fixture { service, users }
    }

    async fn create_user(fixture: &Fixture, email: &str) -> UserId {
        let id = fixture
            .users
            .create_user(CreateUserRequest {
                email: email.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
            })
            .await
            .unwrap();
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_add_member_for_existing_user() {
        let fixture = setup().await;
        let user = create_user(&fixture, "a@x.io").await;
        let team = fixture.service.create_team("Dev", None).await.unwrap();

        fixture
            .service
            .add_member(team, user, TeamRole::Lead)
            .await
            .unwrap();

        let members = fixture.service.get_team_members(team).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id(), user);
        assert_eq!(members[0].role(), TeamRole::Lead);
    }

    #[tokio::test]
    async fn test_add_member_for_missing_user_leaves_team_untouched() {
        let fixture = setup().await;
        let team = fixture.service.create_team("Dev", None).await.unwrap();

        let err = fixture
            .service
            .add_member(team, UserId::new(77).unwrap(), TeamRole::Member)
            .await
            .unwrap_err();
        assert!(err.is_invalid_operation());
        assert_eq!(err.to_string(), "User with ID '77' does not exist");
        assert!(fixture.service.get_team_members(team).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_member_to_missing_team() {
        let fixture = setup().await;
        let user = create_user(&fixture, "a@x.io").await;

        let err = fixture
            .service
            .add_member(TeamId::new(5).unwrap(), user, TeamRole::Member)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_and_missing_membership() {
        let fixture = setup().await;
        let user = create_user(&fixture, "a@x.io").await;
        let team = fixture.service.create_team("Dev", None).await.unwrap();
        fixture
            .service
            .add_member(team, user, TeamRole::Member)
            .await
            .unwrap();

        let dup = fixture.service.add_member(team, user, TeamRole::Admin).await;
        assert!(dup.unwrap_err().is_invalid_operation());

        fixture.service.remove_member(team, user).await.unwrap();
        let missing = fixture.service.remove_member(team, user).await;
        assert!(missing.unwrap_err().is_invalid_operation());
    }

    #[tokio::test]
    async fn test_members_of_missing_team_are_empty() {
        let fixture = setup().await;
        let missing = TeamId::new(404).unwrap();

        assert!(fixture.service.get_team_members(missing).await.unwrap().is_empty());
        assert!(fixture.service.get_team_member_ids(missing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_team() {
        let fixture = setup().await;
        let team = fixture.service.create_team("Dev", Some("x")).await.unwrap();

        fixture
            .service
            .update_team(team, "Platform", None)
            .await
            .unwrap();
        let loaded = fixture.service.get_team(team).await.unwrap().unwrap();
        assert_eq!(loaded.name(), "Platform");

        fixture.service.delete_team(team).await.unwrap();
        assert!(!fixture.service.team_exists(team).await.unwrap());
        assert!(fixture.service.delete_team(team).await.unwrap_err().is_not_found());
    }
}
