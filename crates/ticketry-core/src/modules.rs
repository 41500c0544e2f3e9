//! Module composition
//!
//! Wires the three module APIs onto a single unit of work. The team module
//! sees users through [`UserLookup`]; the issue module sees users and teams
//! through [`UserLookup`] and [`TeamLookup`]. No module holds another's
//! concrete type.

use std::future::Future;
use std::sync::Arc;

use tracing::{Instrument, debug, info_span};

use crate::config::Config;
use crate::domain::issues::{IssueApi, IssueService};
use crate::domain::teams::{TeamApi, TeamLookup, TeamService};
use crate::domain::users::{UserApi, UserLookup, UserService};
use crate::error::Result;
use crate::infrastructure::{SqliteIssueRepository, SqliteTeamRepository, SqliteUserRepository};
use crate::storage::{Database, UnitOfWork};

pub type Users = UserApi<SqliteUserRepository>;
pub type Teams = TeamApi<SqliteTeamRepository>;
pub type Issues = IssueApi<SqliteIssueRepository>;

/// The module APIs of one request, all bound to the same unit of work
#[derive(Clone)]
pub struct Modules {
    pub users: Arc<Users>,
    pub teams: Arc<Teams>,
    pub issues: Arc<Issues>,
    uow: UnitOfWork,
}

impl Modules {
    pub fn new(uow: UnitOfWork, config: &Config) -> Self {
        let limits = config.limits.clone();

        let users = Arc::new(UserApi::new(UserService::new(
            Arc::new(SqliteUserRepository::new(uow.clone())),
            limits.clone(),
            config.users.clone(),
        )));
        let user_lookup: Arc<dyn UserLookup> = users.clone();

        let teams = Arc::new(TeamApi::new(TeamService::new(
            Arc::new(SqliteTeamRepository::new(uow.clone())),
            user_lookup.clone(),
            limits.clone(),
        )));
        let team_lookup: Arc<dyn TeamLookup> = teams.clone();

        let issues = Arc::new(IssueApi::new(IssueService::new(
            Arc::new(SqliteIssueRepository::new(uow.clone())),
            user_lookup,
            team_lookup,
            limits,
        )));

        Self {
            users,
            teams,
            issues,
            uow,
        }
    }

    pub fn unit_of_work(&self) -> &UnitOfWork {
        &self.uow
    }
}

/// Run one operation in its own unit of work
///
/// Commits when `f` returns `Ok` and rolls back when it returns `Err`, so a
/// failing operation leaves nothing behind.
///
/// ```ignore
/// let id = in_transaction(&db, &config, |m| async move {
///     m.teams.create_team(request).await
/// })
/// .await?;
/// ```
pub async fn in_transaction<T, F, Fut>(db: &Database, config: &Config, f: F) -> Result<T>
where
    F: FnOnce(Modules) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let uow = UnitOfWork::begin(db).await?;
    let span = info_span!("unit_of_work", request_id = %uow.request_id());

    async move {
        let modules = Modules::new(uow.clone(), config);
        let outcome = f(modules).await;
        if let Err(err) = &outcome {
            debug!(error = %err, code = err.code(), "Operation failed, rolling back");
        }
        uow.complete(outcome).await
    }
    .instrument(span)
    .await
}
