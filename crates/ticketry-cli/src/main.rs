//! Ticketry CLI - issue, team and user tracking

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use ticketry_core::config::Config;
use ticketry_core::domain::issues::{
    CreateIssueRequest, IssueResponse, IssueStatus, Priority, UpdateIssueRequest,
};
use ticketry_core::domain::teams::{
    AddTeamMemberRequest, CreateTeamRequest, TeamMemberResponse, TeamResponse, TeamRole,
    UpdateTeamRequest,
};
use ticketry_core::domain::users::{CreateUserRequest, UpdateUserRequest, UserResponse};
use ticketry_core::storage::Database;
use ticketry_core::{Error, in_transaction};
use tracing::debug;

#[derive(Parser)]
#[command(name = "ticketry")]
#[command(author, version, about = "Issue, team and user tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Database file (overrides database.path from the config file)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Quiet mode (warnings and errors only on stderr)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage issues
    Issue {
        #[command(subcommand)]
        action: IssueAction,
    },
    /// Manage teams and memberships
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum IssueAction {
    /// Create a new issue
    Create {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// critical, high, medium, low (or 0-3)
        #[arg(short, long, default_value = "medium", value_parser = parse_priority)]
        priority: Priority,
        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_parser = parse_due_date)]
        due: Option<DateTime<Utc>>,
    },
    /// Show an issue
    Show { id: i64 },
    /// List all issues, newest first
    List,
    /// Update title, description, priority or due date
    Update {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        /// New description; an empty string clears it
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,
        #[arg(long, value_parser = parse_due_date, conflicts_with = "clear_due")]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        clear_due: bool,
    },
    /// Assign to a user; omit the user to unassign
    AssignUser { id: i64, user_id: Option<i64> },
    /// Assign to a team; omit the team to unassign
    AssignTeam { id: i64, team_id: Option<i64> },
    /// Change the status (open, in_progress, blocked, resolved, closed)
    Status {
        id: i64,
        #[arg(value_parser = parse_status)]
        status: IssueStatus,
    },
    /// List issues assigned to a user
    ByUser { user_id: i64 },
    /// List issues assigned to a team
    ByTeam { team_id: i64 },
    /// Delete an issue
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum TeamAction {
    /// Create a new team
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Show a team and its members
    Show { id: i64 },
    /// List all teams
    List,
    /// Rename a team or change its description
    Update {
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        /// New description; an empty string clears it
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Add a user to a team
    AddMember {
        team_id: i64,
        user_id: i64,
        /// member, lead, admin (or 0-2)
        #[arg(short, long, default_value = "member", value_parser = parse_role)]
        role: TeamRole,
    },
    /// Remove a user from a team
    RemoveMember { team_id: i64, user_id: i64 },
    /// List the members of a team
    Members { team_id: i64 },
    /// Delete a team and its memberships
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        email: String,
        first_name: String,
        last_name: String,
    },
    /// Show a user
    Show { id: i64 },
    /// List all users
    List,
    /// Change a user's name
    Update {
        id: i64,
        first_name: String,
        last_name: String,
    },
    /// Reactivate a user
    Activate { id: i64 },
    /// Deactivate a user
    Deactivate { id: i64 },
    /// Find a user by email
    Find { email: String },
    /// Permanently delete a user (requires users.allow_permanent_delete)
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all configuration values
    Show,
    /// Show config file path
    Path,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::from_str(s).ok_or_else(|| {
        format!(
            "invalid priority '{}': expected critical, high, medium, low or 0-3",
            s
        )
    })
}

fn parse_status(s: &str) -> Result<IssueStatus, String> {
    IssueStatus::from_str(s).ok_or_else(|| {
        format!(
            "invalid status '{}': expected open, in_progress, blocked, resolved or closed",
            s
        )
    })
}

fn parse_role(s: &str) -> Result<TeamRole, String> {
    TeamRole::from_str(s)
        .ok_or_else(|| format!("invalid role '{}': expected member, lead, admin or 0-2", s))
}

fn parse_due_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{}': expected YYYY-MM-DD or RFC 3339", s))
}

fn init_tracing(quiet: bool) -> anyhow::Result<()> {
    let level = if quiet { "ticketry=warn" } else { "ticketry=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet)?;

    if let Err(err) = run(cli).await {
        if let Some(core_err) = err.downcast_ref::<Error>() {
            eprintln!("Error [{}]: {}", core_err.code(), core_err);
            if let Some(hint) = core_err.suggestion() {
                eprintln!("  Try: {}", hint);
            }
            std::process::exit(1);
        }
        return Err(err);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(path) = cli.database {
        config.database.path = Some(path);
    }

    let format = cli.format;
    match cli.command {
        Commands::Config { action } => cmd_config(&config, action, format),
        Commands::Issue { action } => {
            let db = open_database(&config).await?;
            cmd_issue(&db, &config, action, format).await
        }
        Commands::Team { action } => {
            let db = open_database(&config).await?;
            cmd_team(&db, &config, action, format).await
        }
        Commands::User { action } => {
            let db = open_database(&config).await?;
            cmd_user(&db, &config, action, format).await
        }
    }
}

async fn open_database(config: &Config) -> anyhow::Result<Database> {
    let db = Database::from_config(config).await?;
    debug!(path = %db.path().display(), "Database opened");
    Ok(db)
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report a mutation; JSON gets `{"ok": true, ...extra}`
fn print_done(format: OutputFormat, message: &str, extra: serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let mut body = serde_json::json!({ "ok": true });
            if let (Some(body), serde_json::Value::Object(extra)) = (body.as_object_mut(), extra) {
                body.extend(extra);
            }
            print_json(&body)
        }
        OutputFormat::Text => {
            println!("{}", message);
            Ok(())
        }
    }
}

fn priority_label(ordinal: i64) -> String {
    Priority::from_ordinal(ordinal)
        .map(|p| p.to_string())
        .unwrap_or_else(|_| ordinal.to_string())
}

fn role_label(ordinal: i64) -> String {
    TeamRole::from_ordinal(ordinal)
        .map(|r| r.to_string())
        .unwrap_or_else(|_| ordinal.to_string())
}

fn issue_line(issue: &IssueResponse) -> String {
    format!(
        "#{} [{}] {} (priority: {})",
        issue.id,
        issue.status,
        issue.title,
        priority_label(issue.priority)
    )
}

fn print_issues(format: OutputFormat, issues: &[IssueResponse], empty: &str) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(&issues);
    }
    if issues.is_empty() {
        println!("{}", empty);
    }
    for issue in issues {
        println!("{}", issue_line(issue));
    }
    Ok(())
}

fn print_issue(issue: &IssueResponse) {
    println!("{}", issue_line(issue));
    if let Some(description) = &issue.description {
        println!("  Description: {}", description);
    }
    match issue.assigned_user_id {
        Some(id) => println!("  Assigned user: {}", id),
        None => println!("  Assigned user: -"),
    }
    match issue.assigned_team_id {
        Some(id) => println!("  Assigned team: {}", id),
        None => println!("  Assigned team: -"),
    }
    println!("  Created: {}", issue.created_date.to_rfc3339());
    println!("  Last modified: {}", issue.last_modified_date.to_rfc3339());
    if let Some(due) = issue.due_date {
        println!("  Due: {}", due.to_rfc3339());
    }
    if let Some(resolved) = issue.resolved_date {
        println!("  Resolved: {}", resolved.to_rfc3339());
    }
}

fn print_members(members: &[TeamMemberResponse]) {
    for member in members {
        println!(
            "  - user {} ({}) joined {}",
            member.user_id,
            role_label(member.role),
            member.joined_date.to_rfc3339()
        );
    }
}

fn print_team(team: &TeamResponse) {
    println!("#{} {}", team.id, team.name);
    if let Some(description) = &team.description {
        println!("  Description: {}", description);
    }
    println!("  Created: {}", team.created_date.to_rfc3339());
    println!("  Members: {}", team.members.len());
    print_members(&team.members);
}

fn user_line(user: &UserResponse) -> String {
    let state = if user.is_active { "active" } else { "inactive" };
    format!("#{} {} <{}> ({})", user.id, user.display_name, user.email, state)
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_issue(
    db: &Database,
    config: &Config,
    action: IssueAction,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match action {
        IssueAction::Create {
            title,
            description,
            priority,
            due,
        } => {
            let id = in_transaction(db, config, |m| async move {
                m.issues
                    .create_issue(CreateIssueRequest {
                        title,
                        description,
                        priority: priority.ordinal(),
                        due_date: due,
                    })
                    .await
            })
            .await?;
            print_done(
                format,
                &format!("Issue created with ID {}", id),
                serde_json::json!({ "id": id }),
            )
        }

        IssueAction::Show { id } => {
            let issue = in_transaction(db, config, |m| async move { m.issues.get_issue(id).await })
                .await?
                .ok_or_else(|| Error::not_found("Issue", id))?;
            match format {
                OutputFormat::Json => print_json(&issue),
                OutputFormat::Text => {
                    print_issue(&issue);
                    Ok(())
                }
            }
        }

        IssueAction::List => {
            let issues =
                in_transaction(db, config, |m| async move { m.issues.get_all_issues().await })
                    .await?;
            print_issues(format, &issues, "No issues found.")
        }

        IssueAction::Update {
            id,
            title,
            description,
            priority,
            due,
            clear_due,
        } => {
            in_transaction(db, config, |m| async move {
                let current = m
                    .issues
                    .get_issue(id)
                    .await?
                    .ok_or_else(|| Error::not_found("Issue", id))?;
                let due_date = if clear_due { None } else { due.or(current.due_date) };
                m.issues
                    .update_issue(UpdateIssueRequest {
                        issue_id: id,
                        title: title.unwrap_or(current.title),
                        description: description.or(current.description),
                        priority: priority.map(Priority::ordinal).unwrap_or(current.priority),
                        due_date,
                    })
                    .await
            })
            .await?;
            print_done(
                format,
                &format!("Issue {} updated", id),
                serde_json::json!({ "id": id }),
            )
        }

        IssueAction::AssignUser { id, user_id } => {
            in_transaction(db, config, |m| async move {
                m.issues.assign_issue_to_user(id, user_id).await
            })
            .await?;
            let message = match user_id {
                Some(user_id) => format!("Issue {} assigned to user {}", id, user_id),
                None => format!("Issue {} unassigned from user", id),
            };
            print_done(
                format,
                &message,
                serde_json::json!({ "id": id, "user_id": user_id }),
            )
        }

        IssueAction::AssignTeam { id, team_id } => {
            in_transaction(db, config, |m| async move {
                m.issues.assign_issue_to_team(id, team_id).await
            })
            .await?;
            let message = match team_id {
                Some(team_id) => format!("Issue {} assigned to team {}", id, team_id),
                None => format!("Issue {} unassigned from team", id),
            };
            print_done(
                format,
                &message,
                serde_json::json!({ "id": id, "team_id": team_id }),
            )
        }

        IssueAction::Status { id, status } => {
            in_transaction(db, config, |m| async move {
                m.issues.update_issue_status(id, status).await
            })
            .await?;
            print_done(
                format,
                &format!("Issue {} is now {}", id, status),
                serde_json::json!({ "id": id, "status": status }),
            )
        }

        IssueAction::ByUser { user_id } => {
            let issues = in_transaction(db, config, |m| async move {
                m.issues.get_issues_by_user(user_id).await
            })
            .await?;
            print_issues(format, &issues, "No issues assigned to this user.")
        }

        IssueAction::ByTeam { team_id } => {
            let issues = in_transaction(db, config, |m| async move {
                m.issues.get_issues_by_team(team_id).await
            })
            .await?;
            print_issues(format, &issues, "No issues assigned to this team.")
        }

        IssueAction::Delete { id } => {
            in_transaction(db, config, |m| async move { m.issues.delete_issue(id).await }).await?;
            print_done(
                format,
                &format!("Issue {} deleted", id),
                serde_json::json!({ "id": id }),
            )
        }
    }
}

async fn cmd_team(
    db: &Database,
    config: &Config,
    action: TeamAction,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match action {
        TeamAction::Create { name, description } => {
            let id = in_transaction(db, config, |m| async move {
                m.teams
                    .create_team(CreateTeamRequest { name, description })
                    .await
            })
            .await?;
            print_done(
                format,
                &format!("Team created with ID {}", id),
                serde_json::json!({ "id": id }),
            )
        }

        TeamAction::Show { id } => {
            let team = in_transaction(db, config, |m| async move { m.teams.get_team(id).await })
                .await?
                .ok_or_else(|| Error::not_found("Team", id))?;
            match format {
                OutputFormat::Json => print_json(&team),
                OutputFormat::Text => {
                    print_team(&team);
                    Ok(())
                }
            }
        }

        TeamAction::List => {
            let teams =
                in_transaction(db, config, |m| async move { m.teams.get_all_teams().await })
                    .await?;
            if format == OutputFormat::Json {
                return print_json(&teams);
            }
            if teams.is_empty() {
                println!("No teams found.");
            }
            for team in &teams {
                println!("#{} {} ({} members)", team.id, team.name, team.members.len());
            }
            Ok(())
        }

        TeamAction::Update {
            id,
            name,
            description,
        } => {
            in_transaction(db, config, |m| async move {
                let current = m
                    .teams
                    .get_team(id)
                    .await?
                    .ok_or_else(|| Error::not_found("Team", id))?;
                m.teams
                    .update_team(UpdateTeamRequest {
                        team_id: id,
                        name: name.unwrap_or(current.name),
                        description: description.or(current.description),
                    })
                    .await
            })
            .await?;
            print_done(
                format,
                &format!("Team {} updated", id),
                serde_json::json!({ "id": id }),
            )
        }

        TeamAction::AddMember {
            team_id,
            user_id,
            role,
        } => {
            in_transaction(db, config, |m| async move {
                m.teams
                    .add_member_to_team(AddTeamMemberRequest {
                        team_id,
                        user_id,
                        role: role.ordinal(),
                    })
                    .await
            })
            .await?;
            print_done(
                format,
                &format!("User {} added to team {} as {}", user_id, team_id, role),
                serde_json::json!({ "team_id": team_id, "user_id": user_id, "role": role.ordinal() }),
            )
        }

        TeamAction::RemoveMember { team_id, user_id } => {
            in_transaction(db, config, |m| async move {
                m.teams.remove_member_from_team(team_id, user_id).await
            })
            .await?;
            print_done(
                format,
                &format!("User {} removed from team {}", user_id, team_id),
                serde_json::json!({ "team_id": team_id, "user_id": user_id }),
            )
        }

        TeamAction::Members { team_id } => {
            let members = in_transaction(db, config, |m| async move {
                m.teams.get_team_members(team_id).await
            })
            .await?;
            if format == OutputFormat::Json {
                return print_json(&members);
            }
            if members.is_empty() {
                println!("No members.");
            }
            print_members(&members);
            Ok(())
        }

        TeamAction::Delete { id } => {
            in_transaction(db, config, |m| async move { m.teams.delete_team(id).await }).await?;
            print_done(
                format,
                &format!("Team {} deleted", id),
                serde_json::json!({ "id": id }),
            )
        }
    }
}

async fn cmd_user(
    db: &Database,
    config: &Config,
    action: UserAction,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match action {
        UserAction::Create {
            email,
            first_name,
            last_name,
        } => {
            let id = in_transaction(db, config, |m| async move {
                m.users
                    .create_user(CreateUserRequest {
                        email,
                        first_name,
                        last_name,
                    })
                    .await
            })
            .await?;
            print_done(
                format,
                &format!("User created with ID {}", id),
                serde_json::json!({ "id": id }),
            )
        }

        UserAction::Show { id } => {
            let user = in_transaction(db, config, |m| async move { m.users.get_user(id).await })
                .await?
                .ok_or_else(|| Error::not_found("User", id))?;
            print_user(format, &user)
        }

        UserAction::List => {
            let users =
                in_transaction(db, config, |m| async move { m.users.get_all_users().await })
                    .await?;
            if format == OutputFormat::Json {
                return print_json(&users);
            }
            if users.is_empty() {
                println!("No users found.");
            }
            for user in &users {
                println!("{}", user_line(user));
            }
            Ok(())
        }

        UserAction::Update {
            id,
            first_name,
            last_name,
        } => {
            in_transaction(db, config, |m| async move {
                m.users
                    .update_user(UpdateUserRequest {
                        user_id: id,
                        first_name,
                        last_name,
                    })
                    .await
            })
            .await?;
            print_done(
                format,
                &format!("User {} updated", id),
                serde_json::json!({ "id": id }),
            )
        }

        UserAction::Activate { id } => {
            in_transaction(db, config, |m| async move { m.users.activate_user(id).await })
                .await?;
            print_done(
                format,
                &format!("User {} activated", id),
                serde_json::json!({ "id": id }),
            )
        }

        UserAction::Deactivate { id } => {
            in_transaction(db, config, |m| async move { m.users.deactivate_user(id).await })
                .await?;
            print_done(
                format,
                &format!("User {} deactivated", id),
                serde_json::json!({ "id": id }),
            )
        }

        UserAction::Find { email } => {
            let user = in_transaction(db, config, |m| async move {
                m.users.find_user_by_email(&email).await
            })
            .await?;
            match user {
                Some(user) => print_user(format, &user),
                None if format == OutputFormat::Json => print_json(&serde_json::Value::Null),
                None => {
                    println!("No user with that email.");
                    Ok(())
                }
            }
        }

        UserAction::Delete { id } => {
            in_transaction(db, config, |m| async move { m.users.delete_user(id).await }).await?;
            print_done(
                format,
                &format!("User {} deleted", id),
                serde_json::json!({ "id": id }),
            )
        }
    }
}

fn print_user(format: OutputFormat, user: &UserResponse) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(user),
        OutputFormat::Text => {
            println!("{}", user_line(user));
            println!("  First name: {}", user.first_name);
            println!("  Last name: {}", user.last_name);
            println!("  Created: {}", user.created_date.to_rfc3339());
            Ok(())
        }
    }
}

fn cmd_config(config: &Config, action: ConfigAction, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            if format == OutputFormat::Json {
                return print_json(config);
            }
            for key in Config::keys() {
                println!("{} = {}", key, config.get(key)?);
            }
            Ok(())
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "path": path })),
                OutputFormat::Text => {
                    println!("{}", path.display());
                    Ok(())
                }
            }
        }
        ConfigAction::Get { key } => {
            let value = config.get(&key)?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "key": key, "value": value })),
                OutputFormat::Text => {
                    println!("{}", value);
                    Ok(())
                }
            }
        }
        ConfigAction::Set { key, value } => {
            // Start from the file, not the --database override.
            let mut stored = Config::load()?;
            stored.set(&key, &value)?;
            stored.save()?;
            print_done(
                format,
                &format!("Set {} = {}", key, value),
                serde_json::json!({ "key": key, "value": value }),
            )
        }
    }
}
