//! Team aggregate
//!
//! A team owns its ordered member list. Members exist only inside their team,
//! and the team is the single place where membership uniqueness is enforced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ValidationLimits;
use crate::domain::identity::{TeamId, TeamMemberId, UserId};
use crate::domain::validation;
use crate::error::{Error, Result};

/// Permission level of a member within a team; higher ordinals grant more
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Member = 0,
    Lead = 1,
    Admin = 2,
}

impl TeamRole {
    pub fn ordinal(self) -> i64 {
        self as i64
    }

    pub fn from_ordinal(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Member),
            1 => Ok(Self::Lead),
            2 => Ok(Self::Admin),
            other => Err(Error::validation(format!(
                "Team role must be between 0 and 2, got {}",
                other
            ))),
        }
    }

    /// Create from a name ("lead") or an ordinal ("1")
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "lead" => Some(Self::Lead),
            "admin" => Some(Self::Admin),
            other => other
                .parse::<i64>()
                .ok()
                .and_then(|n| Self::from_ordinal(n).ok()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Lead => "lead",
            Self::Admin => "admin",
        }
    }
}

impl Default for TeamRole {
    fn default() -> Self {
        Self::Member
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Membership of one user in one team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMember {
    pub(crate) id: Option<TeamMemberId>,
    pub(crate) user_id: UserId,
    pub(crate) joined_date: DateTime<Utc>,
    pub(crate) role: TeamRole,
}

impl TeamMember {
    fn new(user_id: UserId, role: TeamRole) -> Self {
        Self {
            id: None,
            user_id,
            joined_date: Utc::now(),
            role,
        }
    }

    pub fn id(&self) -> Option<TeamMemberId> {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn joined_date(&self) -> DateTime<Utc> {
        self.joined_date
    }

    pub fn role(&self) -> TeamRole {
        self.role
    }
}

/// A team and its members
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub(crate) id: Option<TeamId>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) created_date: DateTime<Utc>,
    pub(crate) members: Vec<TeamMember>,
}

impl Team {
    /// Create a new, not yet persisted, team without members
    pub fn new(name: &str, description: Option<&str>, limits: &ValidationLimits) -> Result<Self> {
        let name = validation::required_text("Team name", name, limits.team_name_max)?;
        let description =
            validation::optional_text("Description", description, limits.team_description_max)?;

        Ok(Self {
            id: None,
            name,
            description,
            created_date: Utc::now(),
            members: Vec::new(),
        })
    }

    pub(crate) fn mark_persisted(&mut self, id: TeamId) {
        self.id = Some(id);
    }

    pub fn id(&self) -> Option<TeamId> {
        self.id
    }

    /// Identity of a persisted team
    pub fn persisted_id(&self) -> Result<TeamId> {
        self.id
            .ok_or_else(|| Error::invalid_operation("Team has not been saved yet"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    /// Members in the order they joined
    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn member(&self, user_id: UserId) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.member(user_id).is_some()
    }

    pub fn member_ids(&self) -> Vec<UserId> {
        self.members.iter().map(|m| m.user_id).collect()
    }

    /// Rename the team and replace its description
    pub fn update(
        &mut self,
        name: &str,
        description: Option<&str>,
        limits: &ValidationLimits,
    ) -> Result<()> {
        let name = validation::required_text("Team name", name, limits.team_name_max)?;
        let description =
            validation::optional_text("Description", description, limits.team_description_max)?;

        self.name = name;
        self.description = description;
        Ok(())
    }

    /// Add a user to the team; a user can be a member only once
    pub fn add_member(&mut self, user_id: UserId, role: TeamRole) -> Result<&TeamMember> {
        if self.is_member(user_id) {
            return Err(Error::invalid_operation(format!(
                "User with ID '{}' is already a member of team '{}'",
                user_id, self.name
            )));
        }
        self.members.push(TeamMember::new(user_id, role));
        Ok(&self.members[self.members.len() - 1])
    }

    /// Remove a user from the team
    pub fn remove_member(&mut self, user_id: UserId) -> Result<TeamMember> {
        let position = self
            .members
            .iter()
            .position(|m| m.user_id == user_id)
            .ok_or_else(|| {
                Error::invalid_operation(format!(
                    "User with ID '{}' is not a member of team '{}'",
                    user_id, self.name
                ))
            })?;
        Ok(self.members.remove(position))
    }
}
