//! Storage layer - SQLite
//!
//! Provides database management, migrations and the per-request unit of work.
//!
//! # Architecture
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and automatic migration
//! - `unit_of_work`: One shared transaction per inbound operation
//!
//! # Usage
//!
//! ```ignore
//! use ticketry_core::storage::{Database, UnitOfWork};
//!
//! let db = Database::in_memory().await?;
//! let uow = UnitOfWork::begin(&db).await?;
//! // ... repositories built on `uow` ...
//! uow.commit().await?;
//! ```

pub mod database;
pub mod migrations;
pub mod unit_of_work;

pub use database::{Database, DatabaseConfig, default_database_path};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};
pub use unit_of_work::{TxGuard, UnitOfWork};
