//! Public contract of the team module

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::identity::{TeamId, UserId};
use crate::error::{Error, Result};

use super::entity::{Team, TeamMember, TeamRole};
use super::repository::TeamRepository;
use super::service::TeamService;

/// Read-only capability other modules use to validate team references
#[async_trait]
pub trait TeamLookup: Send + Sync {
    async fn team_exists(&self, team_id: TeamId) -> Result<bool>;

    /// User ids of the team's members; empty for a missing team
    async fn team_member_ids(&self, team_id: TeamId) -> Result<Vec<UserId>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTeamRequest {
    pub team_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Membership request; `role` is the role ordinal (0 member, 1 lead, 2 admin)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTeamMemberRequest {
    pub team_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub role: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberResponse {
    pub id: i64,
    pub user_id: i64,
    pub role: i64,
    pub joined_date: DateTime<Utc>,
}

impl TeamMemberResponse {
    fn from_member(member: &TeamMember) -> Result<Self> {
        let id = member
            .id()
            .ok_or_else(|| Error::invalid_operation("Team member has not been saved yet"))?;

        Ok(Self {
            id: id.value(),
            user_id: member.user_id().value(),
            role: member.role().ordinal(),
            joined_date: member.joined_date(),
        })
    }

    fn from_members(members: &[TeamMember]) -> Result<Vec<Self>> {
        members.iter().map(Self::from_member).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_date: DateTime<Utc>,
    pub members: Vec<TeamMemberResponse>,
}

impl TeamResponse {
    fn from_team(team: &Team) -> Result<Self> {
        Ok(Self {
            id: team.persisted_id()?.value(),
            name: team.name().to_string(),
            description: team.description().map(str::to_string),
            created_date: team.created_date(),
            members: TeamMemberResponse::from_members(team.members())?,
        })
    }
}

/// Facade over the team service
pub struct TeamApi<R: TeamRepository> {
    service: TeamService<R>,
}

impl<R: TeamRepository> TeamApi<R> {
    pub fn new(service: TeamService<R>) -> Self {
        Self { service }
    }

    pub async fn create_team(&self, request: CreateTeamRequest) -> Result<i64> {
        let team_id = self
            .service
            .create_team(&request.name, request.description.as_deref())
            .await?;
        Ok(team_id.value())
    }

    pub async fn get_team(&self, team_id: i64) -> Result<Option<TeamResponse>> {
        let team = self.service.get_team(TeamId::new(team_id)?).await?;
        team.as_ref().map(TeamResponse::from_team).transpose()
    }

    pub async fn get_all_teams(&self) -> Result<Vec<TeamResponse>> {
        let teams = self.service.get_all_teams().await?;
        teams.iter().map(TeamResponse::from_team).collect()
    }

    pub async fn update_team(&self, request: UpdateTeamRequest) -> Result<()> {
        self.service
            .update_team(
                TeamId::new(request.team_id)?,
                &request.name,
                request.description.as_deref(),
            )
            .await
    }

    pub async fn add_member_to_team(&self, request: AddTeamMemberRequest) -> Result<()> {
        let team_id = TeamId::new(request.team_id)?;
        let user_id = UserId::new(request.user_id)?;
        let role = TeamRole::from_ordinal(request.role)?;
        self.service.add_member(team_id, user_id, role).await
    }

    pub async fn remove_member_from_team(&self, team_id: i64, user_id: i64) -> Result<()> {
        self.service
            .remove_member(TeamId::new(team_id)?, UserId::new(user_id)?)
            .await
    }

    pub async fn get_team_members(&self, team_id: i64) -> Result<Vec<TeamMemberResponse>> {
        let members = self.service.get_team_members(TeamId::new(team_id)?).await?;
        TeamMemberResponse::from_members(&members)
    }

    pub async fn team_exists(&self, team_id: i64) -> Result<bool> {
        self.service.team_exists(TeamId::new(team_id)?).await
    }

    pub async fn get_team_member_ids(&self, team_id: i64) -> Result<Vec<i64>> {
        let ids = self
            .service
            .get_team_member_ids(TeamId::new(team_id)?)
            .await?;
        Ok(ids.into_iter().map(i64::from).collect())
    }

    pub async fn delete_team(&self, team_id: i64) -> Result<()> {
        self.service.delete_team(TeamId::new(team_id)?).await
    }
}

#[async_trait]
impl<R: TeamRepository> TeamLookup for TeamApi<R> {
    async fn team_exists(&self, team_id: TeamId) -> Result<bool> {
        self.service.team_exists(team_id).await
    }

    async fn team_member_ids(&self, team_id: TeamId) -> Result<Vec<UserId>> {
        self.service.get_team_member_ids(team_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationLimits;
    use crate::domain::users::{UserLookup, UserResponse};
    use crate::infrastructure::SqliteTeamRepository;
    use crate::storage::{Database, UnitOfWork};
    use std::sync::Arc;

    /// Every user id below 100 exists
    struct StubUsers;

    #[async_trait]
    impl UserLookup for StubUsers {
        async fn user_exists(&self, user_id: UserId) -> Result<bool> {
            Ok(user_id.value() < 100)
        }

        async fn users_by_ids(&self, _user_ids: &[UserId]) -> Result<Vec<UserResponse>> {
            Ok(Vec::new())
        }
    }

    async fn setup_api() -> TeamApi<SqliteTeamRepository> {
        let db = Database::in_memory().await.unwrap();
        let uow = UnitOfWork::begin(&db).await.unwrap();
        TeamApi::new(TeamService::new(
            Arc::new(SqliteTeamRepository::new(uow)),
            Arc::new(StubUsers),
            ValidationLimits::default(),
        ))
    }

    fn create(name: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.to_string(),
            description: None,
        }
    }

    fn add(team_id: i64, user_id: i64, role: i64) -> AddTeamMemberRequest {
        AddTeamMemberRequest {
            team_id,
            user_id,
            role,
        }
    }

    #[tokio::test]
    async fn test_team_with_member() {
        let api = setup_api().await;
        let team_id = api.create_team(create("Dev")).await.unwrap();
        assert!(team_id > 0);

        api.add_member_to_team(add(team_id, 7, 0)).await.unwrap();

        let team = api.get_team(team_id).await.unwrap().unwrap();
        assert_eq!(team.name, "Dev");
        assert_eq!(team.members.len(), 1);
        assert_eq!(team.members[0].user_id, 7);
        assert_eq!(team.members[0].role, 0);
        assert_eq!(api.get_team_member_ids(team_id).await.unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let api = setup_api().await;
        let team_id = api.create_team(create("Dev")).await.unwrap();

        let err = api.add_member_to_team(add(team_id, 7, 9)).await.unwrap_err();
        assert!(err.is_validation());
        assert!(api.get_team_members(team_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_rejected() {
        let api = setup_api().await;
        let team_id = api.create_team(create("Dev")).await.unwrap();

        let err = api.add_member_to_team(add(team_id, 500, 0)).await.unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[tokio::test]
    async fn test_reads_of_missing_team() {
        let api = setup_api().await;
        assert_eq!(api.get_team(999).await.unwrap(), None);
        assert!(!api.team_exists(999).await.unwrap());
        assert!(api.get_team_members(999).await.unwrap().is_empty());
        assert!(api.get_team_member_ids(999).await.unwrap().is_empty());
        assert!(api.get_team(-3).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_mutations_of_missing_team() {
        let api = setup_api().await;
        let update = UpdateTeamRequest {
            team_id: 999,
            name: "X".to_string(),
            description: None,
        };
        assert!(api.update_team(update).await.unwrap_err().is_not_found());
        assert!(api.remove_member_from_team(999, 1).await.unwrap_err().is_not_found());
        assert!(api.delete_team(999).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_lookup_capability() {
        let api = setup_api().await;
        let team_id = api.create_team(create("Dev")).await.unwrap();
        api.add_member_to_team(add(team_id, 3, 1)).await.unwrap();
        let lookup: &dyn TeamLookup = &api;

        let id = TeamId::new(team_id).unwrap();
        assert!(lookup.team_exists(id).await.unwrap());
        assert_eq!(
            lookup.team_member_ids(id).await.unwrap(),
            vec![UserId::new(3).unwrap()]
        );
    }
}
