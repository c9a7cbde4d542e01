//! Integration tests for the kindred CLI
//!
//! Each test runs the binary against its own temporary data directory and
//! config file.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        // bcrypt's minimum cost keeps the tests fast
        std::fs::write(dir.path().join("config.toml"), "passcode_cost = 4\n").unwrap();
        Self { dir }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("kindred").unwrap();
        cmd.env("KINDRED_DATA_DIR", self.dir.path().join("data"))
            .env("KINDRED_CONFIG", self.dir.path().join("config.toml"))
            .env_remove("KINDRED_TREE")
            .env_remove("KINDRED_PASSCODE")
            .env_remove("RUST_LOG");
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(["--format", "json"])
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).unwrap()
    }

    fn create_tree(&self) -> String {
        let tree = self.json(&["tree", "create", "Okafor", "--passcode", "blue-heron"]);
        tree["id"].as_i64().unwrap().to_string()
    }

    fn add_member(&self, tree: &str, name: &str) -> String {
        let person = self.json(&["--tree", tree, "member", "add", name]);
        person["id"].as_i64().unwrap().to_string()
    }
}

// ============================================================================
// Help and basics
// ============================================================================

#[test]
fn test_help_flag() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: kindred"))
        .stdout(predicate::str::contains("tree"))
        .stdout(predicate::str::contains("path"));
}

#[test]
fn test_unknown_format_is_usage_error() {
    Sandbox::new()
        .cmd()
        .args(["--format", "yaml", "tree", "list"])
        .assert()
        .code(2);
}

#[test]
fn test_completions() {
    Sandbox::new()
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kindred"));
}

// ============================================================================
// Trees
// ============================================================================

#[test]
fn test_tree_create_and_list() {
    let sandbox = Sandbox::new();
    let tree = sandbox.create_tree();

    sandbox
        .cmd()
        .args(["tree", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("#{} Okafor", tree)));

    let trees = sandbox.json(&["tree", "list"]);
    assert_eq!(trees.as_array().unwrap().len(), 1);
    assert!(trees[0].get("passcode_hash").is_none());
}

#[test]
fn test_tree_verify() {
    let sandbox = Sandbox::new();
    let tree = sandbox.create_tree();

    sandbox
        .cmd()
        .args(["tree", "verify", &tree, "--passcode", "blue-heron"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Passcode accepted"));

    sandbox
        .cmd()
        .args(["tree", "verify", &tree, "--passcode", "red-heron"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid passcode"));
}

#[test]
fn test_tree_delete_requires_force() {
    let sandbox = Sandbox::new();
    let tree = sandbox.create_tree();
    sandbox.add_member(&tree, "Ada");

    sandbox
        .cmd()
        .args(["tree", "delete", &tree])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 members"))
        .stdout(predicate::str::contains("--force"));

    sandbox
        .cmd()
        .args(["tree", "delete", &tree, "--force"])
        .assert()
        .success();

    let trees = sandbox.json(&["tree", "list"]);
    assert!(trees.as_array().unwrap().is_empty());
}

#[test]
fn test_commands_need_a_tree() {
    Sandbox::new()
        .cmd()
        .args(["member", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No family tree selected"));
}

// ============================================================================
// Members, relations and paths
// ============================================================================

#[test]
fn test_member_add_update_delete() {
    let sandbox = Sandbox::new();
    let tree = sandbox.create_tree();
    let ada = sandbox.add_member(&tree, "Ada");

    sandbox
        .cmd()
        .args(["--tree", &tree, "member", "update", &ada, "--birth-date", "1901"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada (b. 1901)"));

    sandbox
        .cmd()
        .args(["--tree", &tree, "member", "delete", &ada])
        .assert()
        .success();

    let members = sandbox.json(&["--tree", &tree, "member", "list"]);
    assert!(members.as_array().unwrap().is_empty());
}

#[test]
fn test_end_to_end_path() {
    let sandbox = Sandbox::new();
    let tree = sandbox.create_tree();
    let ada = sandbox.add_member(&tree, "Ada");
    let ben = sandbox.add_member(&tree, "Ben");
    let cal = sandbox.add_member(&tree, "Cal");

    for (p1, p2) in [(&ada, &ben), (&ben, &cal)] {
        sandbox
            .cmd()
            .args(["--tree", &tree, "relation", "add", p1, p2, "--type", "parent"])
            .assert()
            .success();
    }

    sandbox
        .cmd()
        .args(["--tree", &tree, "path", &ada, &cal])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada -[parent]-> Ben -[parent]-> Cal"));

    sandbox
        .cmd()
        .args(["--tree", &tree, "path", &cal, &ada])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cal -[child]-> Ben -[child]-> Ada"));

    let result = sandbox.json(&["--tree", &tree, "path", &ada, &cal]);
    let steps = result["path"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["relationship"], "parent");

    sandbox
        .cmd()
        .args(["--tree", &tree, "tree", "outline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("    Ben"))
        .stdout(predicate::str::contains("      Cal"));
}

#[test]
fn test_path_rules() {
    let sandbox = Sandbox::new();
    let tree = sandbox.create_tree();
    let ada = sandbox.add_member(&tree, "Ada");
    let ben = sandbox.add_member(&tree, "Ben");

    sandbox
        .cmd()
        .args(["--tree", &tree, "path", &ada, &ben])
        .assert()
        .success()
        .stdout(predicate::str::contains("No relationship found"));

    sandbox
        .cmd()
        .args(["--tree", &tree, "path", &ada, &ada])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please select two different people"));
}

#[test]
fn test_relation_rules() {
    let sandbox = Sandbox::new();
    let tree = sandbox.create_tree();
    let ada = sandbox.add_member(&tree, "Ada");
    let ben = sandbox.add_member(&tree, "Ben");

    sandbox
        .cmd()
        .args(["--tree", &tree, "relation", "add", &ada, &ada, "--type", "sibling"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot have a relationship with themselves"));

    sandbox
        .cmd()
        .args(["--tree", &tree, "relation", "add", &ada, &ben, "--type", "spouse"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["--tree", &tree, "relation", "add", &ada, &ben, "--type", "spouse"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Relationship already exists"));

    sandbox
        .cmd()
        .args(["--tree", &tree, "relation", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada -[spouse]-> Ben"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_set_get_and_default_tree() {
    let sandbox = Sandbox::new();
    let tree = sandbox.create_tree();

    sandbox
        .cmd()
        .args(["config", "set", "default_tree", &tree])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["config", "get", "default_tree"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", tree)));

    // The configured tree is used when --tree is absent
    sandbox.cmd().args(["member", "add", "Ada"]).assert().success();

    sandbox
        .cmd()
        .args(["config", "get", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}
