//! Command-line tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PASSWORD: &str = "Str0ng!Pass";

fn vaultbook(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vaultbook").unwrap();
    cmd.env("VAULTBOOK_DATA_DIR", dir.path())
        .env("VAULTBOOK_PASSWORD", PASSWORD)
        .env_remove("VAULTBOOK_NAME")
        .env_remove("VAULTBOOK_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    vaultbook(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("income"))
        .stdout(predicate::str::contains("fixed"))
        .stdout(predicate::str::contains("summary"));
}

#[test]
fn config_shows_paths_without_password() {
    let dir = TempDir::new().unwrap();
    vaultbook(&dir)
        .env_remove("VAULTBOOK_PASSWORD")
        .args(["--name", "Alice", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice.enc"))
        .stdout(predicate::str::contains("%d/%m/%Y"));
}

#[test]
fn weak_password_cannot_create_budget() {
    let dir = TempDir::new().unwrap();
    vaultbook(&dir)
        .env("VAULTBOOK_PASSWORD", "weak")
        .args(["--name", "alice", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too weak"));
}

#[test]
fn income_flow_and_summary() {
    let dir = TempDir::new().unwrap();

    vaultbook(&dir)
        .args(["--name", "alice", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alimentação"));

    vaultbook(&dir)
        .args(["income", "add", "Salary", "1.500,00", "--date", "2025-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R$ 1.500,00"));

    vaultbook(&dir)
        .args(["variable", "add", "Market", "250,50", "--category", "Alimentação"])
        .assert()
        .success();

    vaultbook(&dir)
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary for alice"))
        .stdout(predicate::str::contains("R$ 1.249,50"));

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("data"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn colliding_name_is_rejected_before_password_check() {
    let dir = TempDir::new().unwrap();
    vaultbook(&dir).args(["--name", "Alice!", "init"]).assert().success();

    vaultbook(&dir)
        .env("VAULTBOOK_PASSWORD", "weak")
        .args(["--name", "Alice?", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("collides with existing 'Alice!'"))
        .stderr(predicate::str::contains("too weak").not());
}

#[test]
fn wrong_password_is_reported_generically() {
    let dir = TempDir::new().unwrap();
    vaultbook(&dir).args(["--name", "bob", "init"]).assert().success();

    vaultbook(&dir)
        .env("VAULTBOOK_PASSWORD", "Wr0ng!Pass")
        .args(["--name", "bob", "summary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong password or damaged file"));
}
