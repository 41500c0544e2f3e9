//! CLI integration tests for ticketry
//!
//! Tests the ticketry CLI commands end-to-end using assert_cmd. Every test
//! gets its own database file and config directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ticketry").unwrap();
        cmd.env("TICKETRY_CONFIG_DIR", self.dir.path().join("config"));
        cmd.env_remove("RUST_LOG");
        cmd.arg("--database").arg(self.dir.path().join("ticketry.db"));
        cmd
    }

    /// Run a command with `--format json` and parse stdout
    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .cmd()
            .args(args)
            .args(["--format", "json"])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn create_user(&self, email: &str) -> i64 {
        self.json(&["user", "create", email, "Ada", "Lovelace"])["id"]
            .as_i64()
            .unwrap()
    }

    fn create_team(&self, name: &str) -> i64 {
        self.json(&["team", "create", name])["id"].as_i64().unwrap()
    }

    fn create_issue(&self, title: &str) -> i64 {
        self.json(&["issue", "create", title])["id"].as_i64().unwrap()
    }
}

#[test]
fn test_help_lists_modules() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("issue"))
        .stdout(predicate::str::contains("team"))
        .stdout(predicate::str::contains("user"));
}

#[test]
fn test_issue_create_and_show() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["issue", "create", "Login fails", "--priority", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Issue created with ID 1"));

    ws.cmd()
        .args(["issue", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 [open] Login fails (priority: high)"));

    let issue = ws.json(&["issue", "show", "1"]);
    assert_eq!(issue["status"], "open");
    assert_eq!(issue["priority"], 1);
    assert!(issue["resolved_date"].is_null());
}

#[test]
fn test_show_missing_issue_fails_with_hint() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["issue", "show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Issue with ID '42' not found"))
        .stderr(predicate::str::contains("ticketry issue list"));
}

#[test]
fn test_non_positive_id_rejected() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["user", "show", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E001"));
}

#[test]
fn test_team_membership_flow() {
    let ws = Workspace::new();
    let user = ws.create_user("ada@example.com");
    let team = ws.create_team("Dev");

    ws.cmd()
        .args(["team", "add-member", &team.to_string(), &user.to_string(), "--role", "lead"])
        .assert()
        .success();

    let members = ws.json(&["team", "members", &team.to_string()]);
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["user_id"], user);
    assert_eq!(members[0]["role"], 1);

    ws.cmd()
        .args(["team", "add-member", &team.to_string(), &user.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already a member"));

    ws.cmd()
        .args(["team", "add-member", &team.to_string(), "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User with ID '999' does not exist"));
}

#[test]
fn test_assign_to_missing_team_changes_nothing() {
    let ws = Workspace::new();
    let issue = ws.create_issue("Bug");

    ws.cmd()
        .args(["issue", "assign-team", &issue.to_string(), "999999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Team with ID '999999' does not exist"));

    let shown = ws.json(&["issue", "show", &issue.to_string()]);
    assert!(shown["assigned_team_id"].is_null());
}

#[test]
fn test_issues_by_user() {
    let ws = Workspace::new();
    let alice = ws.create_user("alice@example.com");
    let bob = ws.create_user("bob@example.com");
    let a = ws.create_issue("a");
    let b = ws.create_issue("b");
    let c = ws.create_issue("c");

    for (issue, user) in [(a, alice), (b, alice), (c, bob)] {
        ws.cmd()
            .args(["issue", "assign-user", &issue.to_string(), &user.to_string()])
            .assert()
            .success();
    }

    let issues = ws.json(&["issue", "by-user", &alice.to_string()]);
    assert_eq!(issues.as_array().unwrap().len(), 2);

    ws.cmd()
        .args(["issue", "assign-user", &a.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("unassigned"));
    let issues = ws.json(&["issue", "by-user", &alice.to_string()]);
    assert_eq!(issues.as_array().unwrap().len(), 1);
}

#[test]
fn test_status_cycle() {
    let ws = Workspace::new();
    let issue = ws.create_issue("Bug").to_string();

    ws.cmd()
        .args(["issue", "status", &issue, "resolved"])
        .assert()
        .success();
    let resolved = ws.json(&["issue", "show", &issue]);
    assert_eq!(resolved["status"], "resolved");
    assert!(resolved["resolved_date"].is_string());

    ws.cmd()
        .args(["issue", "status", &issue, "in-progress"])
        .assert()
        .success();
    let reopened = ws.json(&["issue", "show", &issue]);
    assert_eq!(reopened["status"], "in_progress");
    assert!(reopened["resolved_date"].is_null());
}

#[test]
fn test_issue_update_keeps_unspecified_fields() {
    let ws = Workspace::new();
    let issue = ws.json(&[
        "issue",
        "create",
        "Bug",
        "--description",
        "steps",
        "--due",
        "2030-01-31",
    ])["id"]
        .as_i64()
        .unwrap()
        .to_string();

    ws.cmd()
        .args(["issue", "update", &issue, "--title", "Crash"])
        .assert()
        .success();

    let shown = ws.json(&["issue", "show", &issue]);
    assert_eq!(shown["title"], "Crash");
    assert_eq!(shown["description"], "steps");
    assert_eq!(shown["priority"], 2);
    assert!(shown["due_date"].as_str().unwrap().starts_with("2030-01-31"));
}

#[test]
fn test_user_lifecycle_and_delete_gate() {
    let ws = Workspace::new();
    let user = ws.create_user("grace@navy.mil").to_string();

    ws.cmd()
        .args(["user", "create", "GRACE@navy.mil", "Other", "Person"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    ws.cmd().args(["user", "deactivate", &user]).assert().success();
    ws.cmd()
        .args(["user", "find", "grace@NAVY.mil"])
        .assert()
        .success()
        .stdout(predicate::str::contains("inactive"));

    ws.cmd()
        .args(["user", "delete", &user])
        .assert()
        .failure()
        .stderr(predicate::str::contains("disabled"));

    ws.cmd()
        .args(["config", "set", "users.allow_permanent_delete", "true"])
        .assert()
        .success();
    ws.cmd().args(["user", "delete", &user]).assert().success();
    ws.cmd()
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No users found."));
}

#[test]
fn test_team_delete_removes_members() {
    let ws = Workspace::new();
    let user = ws.create_user("a@x.io").to_string();
    let team = ws.create_team("Dev").to_string();
    ws.cmd()
        .args(["team", "add-member", &team, &user])
        .assert()
        .success();

    ws.cmd().args(["team", "delete", &team]).assert().success();

    let members = ws.json(&["team", "members", &team]);
    assert!(members.as_array().unwrap().is_empty());
    ws.cmd()
        .args(["team", "show", &team])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_show_and_path() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("limits.issue_title_max = 200"))
        .stdout(predicate::str::contains("users.allow_permanent_delete = false"));

    ws.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    ws.cmd()
        .args(["config", "set", "limits.issue_title_max", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error [E600]"))
        .stderr(predicate::str::contains("Try: ticketry config show"));
}

#[test]
fn test_logs_stay_off_stdout() {
    let ws = Workspace::new();
    let output = ws.json(&["issue", "list"]);
    assert!(output.as_array().unwrap().is_empty());
}
