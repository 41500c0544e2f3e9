//! Issue module
//!
//! Issues may be assigned to a user and to a team. Both references are
//! validated through the owning module's lookup capability, never by reading
//! another module's tables.

mod api;
mod entity;
mod repository;
mod service;

pub use api::{CreateIssueRequest, IssueApi, IssueResponse, UpdateIssueRequest};
pub use entity::{Issue, IssueStatus, Priority};
pub use repository::IssueRepository;
pub use service::IssueService;
