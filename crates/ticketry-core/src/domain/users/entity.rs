//! User aggregate

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ValidationLimits;
use crate::domain::identity::UserId;
use crate::domain::validation;
use crate::error::{Error, Result};

/// A user of the tracker
///
/// Email uniqueness is a store-wide rule and is enforced by the service and
/// the repository, not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub(crate) id: Option<UserId>,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) created_date: DateTime<Utc>,
    pub(crate) is_active: bool,
}

impl User {
    /// Create a new, not yet persisted, active user
    pub fn new(
        email: &str,
        first_name: &str,
        last_name: &str,
        limits: &ValidationLimits,
    ) -> Result<Self> {
        let email = validation::email(email, limits.email_max)?;
        let first_name = validation::required_text("First name", first_name, limits.user_name_max)?;
        let last_name = validation::required_text("Last name", last_name, limits.user_name_max)?;

        Ok(Self {
            id: None,
            email,
            first_name,
            last_name,
            created_date: Utc::now(),
            is_active: true,
        })
    }

    pub(crate) fn mark_persisted(&mut self, id: UserId) {
        self.id = Some(id);
    }

    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    /// Identity of a persisted user
    pub fn persisted_id(&self) -> Result<UserId> {
        self.id
            .ok_or_else(|| Error::invalid_operation("User has not been saved yet"))
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// "First Last", computed on every call and never stored
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Change the user's name
    pub fn update(
        &mut self,
        first_name: &str,
        last_name: &str,
        limits: &ValidationLimits,
    ) -> Result<()> {
        let first_name = validation::required_text("First name", first_name, limits.user_name_max)?;
        let last_name = validation::required_text("Last name", last_name, limits.user_name_max)?;

        self.first_name = first_name;
        self.last_name = last_name;
        Ok(())
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
