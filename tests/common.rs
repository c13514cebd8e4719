#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const ADMIN: &str = "admin";
pub const ADMIN_PW: &str = "admin-secret-1";

/// Binary under test with a clean login environment.
pub fn rsp() -> Command {
    let mut cmd = cargo_bin_cmd!("rstaffplan");
    cmd.env_remove("RSTAFFPLAN_USER")
        .env_remove("RSTAFFPLAN_PASSWORD")
        .env_remove("RSTAFFPLAN_ADMIN_PASSWORD")
        .env_remove("RSTAFFPLAN_DB")
        .env("NO_COLOR", "1");
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rstaffplan.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// `init` in test mode, bootstrapping the admin account.
pub fn init_db(db_path: &str) {
    rsp()
        .args(["--db", db_path, "--test", "init", "--admin-password", ADMIN_PW])
        .assert()
        .success();
}

/// Command logged in as `user`.
pub fn as_user(db_path: &str, user: &str, password: &str) -> Command {
    let mut cmd = rsp();
    cmd.args(["--db", db_path, "--test", "--user", user, "--password", password]);
    cmd
}

pub fn as_admin(db_path: &str) -> Command {
    as_user(db_path, ADMIN, ADMIN_PW)
}

/// Two people and two overlapping projects:
///  - person #1 Ana, person #2 Luis
///  - project #1 Alpha 2025-01-01 → 2025-01-31 (not confirmed)
///  - project #2 Beta  2025-01-15 → 2025-02-15 (not confirmed)
///  - project #3 Gamma 2025-02-01 → 2025-02-15 (confirmed)
pub fn init_db_with_data(db_path: &str) {
    init_db(db_path);

    for (name, title) in [("Ana", "Engineer"), ("Luis", "Analyst")] {
        as_admin(db_path)
            .args(["person", "add", name, "--title", title, "--area", "Ops"])
            .assert()
            .success();
    }

    let projects = [
        ("Alpha", "2025-01-01", "2025-01-31", false),
        ("Beta", "2025-01-15", "2025-02-15", false),
        ("Gamma", "2025-02-01", "2025-02-15", true),
    ];
    for (name, start, end, confirmed) in projects {
        let mut cmd = as_admin(db_path);
        cmd.args(["project", "add", name, "--start", start, "--end", end]);
        if confirmed {
            cmd.arg("--confirmed");
        }
        cmd.assert().success();
    }
}
