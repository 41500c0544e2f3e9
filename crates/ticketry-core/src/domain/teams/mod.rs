//! Team module
//!
//! Owns teams and their memberships. Member user ids are checked against the
//! user module before they are added.

mod api;
mod entity;
mod repository;
mod service;

pub use api::{
    AddTeamMemberRequest, CreateTeamRequest, TeamApi, TeamLookup, TeamMemberResponse,
    TeamResponse, UpdateTeamRequest,
};
pub use entity::{Team, TeamMember, TeamRole};
pub use repository::TeamRepository;
pub use service::TeamService;
