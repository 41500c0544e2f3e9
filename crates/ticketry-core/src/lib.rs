//! Ticketry Core Library
//!
//! A modular-monolith ticket tracker with three business modules:
//! - Users: accounts, activation and lookup by email
//! - Teams: teams and their role-tagged memberships
//! - Issues: issues with status, priority and user/team assignment
//!
//! Modules reference each other by identity only and validate those
//! references through lookup traits. Each inbound operation runs in one
//! SQLite transaction (see [`modules::in_transaction`]).

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod modules;
pub mod storage;

pub use error::{Error, Result};
pub use modules::{Modules, in_transaction};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::identity::{IssueId, TeamId, TeamMemberId, UserId};
    pub use crate::domain::issues::{IssueStatus, Priority};
    pub use crate::domain::teams::TeamRole;
    pub use crate::error::{Error, Result};
    pub use crate::modules::{Modules, in_transaction};
    pub use crate::storage::Database;
}
