//! SQLite adapters for the module repository traits
//!
//! Each repository is bound to a [`UnitOfWork`](crate::storage::UnitOfWork),
//! so every statement of a request runs on the same transaction.

pub mod issues;
pub mod teams;
pub mod users;

pub use issues::SqliteIssueRepository;
pub use teams::SqliteTeamRepository;
pub use users::SqliteUserRepository;
