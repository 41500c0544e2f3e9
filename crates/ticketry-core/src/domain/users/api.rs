//! Public contract of the user module
//!
//! Other modules and transport adapters talk to users only through
//! [`UserApi`] or the narrower [`UserLookup`] capability. Identifiers cross
//! this boundary as plain integers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::identity::UserId;
use crate::error::Result;

use super::entity::User;
use super::repository::UserRepository;
use super::service::UserService;

/// Read-only capability other modules use to validate user references
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn user_exists(&self, user_id: UserId) -> Result<bool>;

    async fn users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserResponse>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// User as seen from outside the module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub created_date: DateTime<Utc>,
    pub is_active: bool,
}

impl UserResponse {
    fn from_user(user: &User) -> Result<Self> {
        Ok(Self {
            id: user.persisted_id()?.value(),
            email: user.email().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            display_name: user.display_name(),
            created_date: user.created_date(),
            is_active: user.is_active(),
        })
    }

    fn from_users(users: &[User]) -> Result<Vec<Self>> {
        users.iter().map(Self::from_user).collect()
    }
}

/// Facade over the user service
pub struct UserApi<R: UserRepository> {
    service: UserService<R>,
}

impl<R: UserRepository> UserApi<R> {
    pub fn new(service: UserService<R>) -> Self {
        Self { service }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<i64> {
        let user_id = self
            .service
            .create_user(&request.email, &request.first_name, &request.last_name)
            .await?;
        Ok(user_id.value())
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<UserResponse>> {
        let user = self.service.get_user(UserId::new(user_id)?).await?;
        user.as_ref().map(UserResponse::from_user).transpose()
    }

    pub async fn get_all_users(&self) -> Result<Vec<UserResponse>> {
        let users = self.service.get_all_users().await?;
        UserResponse::from_users(&users)
    }

    pub async fn get_users_by_ids(&self, user_ids: &[i64]) -> Result<Vec<UserResponse>> {
        let ids = user_ids
            .iter()
            .map(|&id| UserId::new(id))
            .collect::<Result<Vec<_>>>()?;
        let users = self.service.get_users_by_ids(&ids).await?;
        UserResponse::from_users(&users)
    }

    pub async fn update_user(&self, request: UpdateUserRequest) -> Result<()> {
        self.service
            .update_user(
                UserId::new(request.user_id)?,
                &request.first_name,
                &request.last_name,
            )
            .await
    }

    pub async fn deactivate_user(&self, user_id: i64) -> Result<()> {
        self.service.deactivate_user(UserId::new(user_id)?).await
    }

    pub async fn activate_user(&self, user_id: i64) -> Result<()> {
        self.service.activate_user(UserId::new(user_id)?).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        self.service.delete_user(UserId::new(user_id)?).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserResponse>> {
        let user = self.service.find_user_by_email(email).await?;
        user.as_ref().map(UserResponse::from_user).transpose()
    }

    pub async fn user_exists(&self, user_id: i64) -> Result<bool> {
        self.service.user_exists(UserId::new(user_id)?).await
    }
}

#[async_trait]
impl<R: UserRepository> UserLookup for UserApi<R> {
    async fn user_exists(&self, user_id: UserId) -> Result<bool> {
        self.service.user_exists(user_id).await
    }

    async fn users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserResponse>> {
        let users = self.service.get_users_by_ids(user_ids).await?;
        UserResponse::from_users(&users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{UserSettings, ValidationLimits};
    use crate::infrastructure::users::SqliteUserRepository;
    use crate::storage::{Database, UnitOfWork};
    use std::sync::Arc;

    async fn setup_api() -> UserApi<SqliteUserRepository> {
        let db = Database::in_memory().await.unwrap();
        let uow = UnitOfWork::begin(&db).await.unwrap();
        let repo = Arc::new(SqliteUserRepository::new(uow));
        UserApi::new(UserService::new(
            repo,
            ValidationLimits::default(),
            UserSettings::default(),
        ))
    }

    fn request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[tokio::test]
    async fn test_read_of_missing_user_is_absent() {
        let api = setup_api().await;
        assert_eq!(api.get_user(12345).await.unwrap(), None);
        assert!(!api.user_exists(12345).await.unwrap());
    }

    #[tokio::test]
    async fn test_mutation_of_missing_user_fails() {
        let api = setup_api().await;
        assert!(api.deactivate_user(12345).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_non_positive_ids_rejected() {
        let api = setup_api().await;
        assert!(api.get_user(0).await.unwrap_err().is_validation());
        assert!(api.get_users_by_ids(&[1, -1]).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_response_mapping() {
        let api = setup_api().await;
        let id = api.create_user(request("ada@example.com")).await.unwrap();

        api.update_user(UpdateUserRequest {
            user_id: id,
            first_name: "Augusta Ada".to_string(),
            last_name: "King".to_string(),
        })
        .await
        .unwrap();

        let user = api.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.display_name, "Augusta Ada King");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], id);
        let created = json["created_date"].as_str().unwrap();
        let parsed: DateTime<Utc> = created.parse().unwrap();
        assert_eq!(parsed, user.created_date);
    }

    #[tokio::test]
    async fn test_lookup_capability() {
        let api = setup_api().await;
        let id = api.create_user(request("ada@example.com")).await.unwrap();
        let lookup: &dyn UserLookup = &api;

        assert!(lookup.user_exists(UserId::new(id).unwrap()).await.unwrap());
        assert!(!lookup.user_exists(UserId::new(id + 1).unwrap()).await.unwrap());
        let users = lookup
            .users_by_ids(&[UserId::new(id).unwrap()])
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "ada@example.com");
    }
}
