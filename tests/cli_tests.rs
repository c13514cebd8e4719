use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, is_match};

mod common;
use common::{ADMIN_PW, as_admin, as_user, init_db, init_db_with_data, rsp, setup_test_db};

/// Whole-word match, so "Ana" is not found inside "Analyst".
fn word(w: &str) -> predicates::str::RegexPredicate {
    is_match(format!(r"\b{}\b", w)).expect("valid regex")
}

#[test]
fn test_init_bootstraps_admin() {
    let db_path = setup_test_db("init_bootstraps_admin");

    rsp()
        .args(["--db", &db_path, "--test", "init", "--admin-password", ADMIN_PW])
        .assert()
        .success()
        .stdout(contains("Admin user 'admin' created"));

    // A second init keeps the existing users and does not need a password
    rsp()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Admin user").not());

    as_admin(&db_path)
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(contains("admin"));
}

#[test]
fn test_init_requires_admin_password_on_empty_db() {
    let db_path = setup_test_db("init_requires_admin_password");

    rsp()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .failure()
        .stderr(contains("--admin-password"));
}

#[test]
fn test_commands_require_login() {
    let db_path = setup_test_db("commands_require_login");
    init_db(&db_path);

    rsp()
        .args(["--db", &db_path, "--test", "person", "list"])
        .assert()
        .failure()
        .stderr(contains("login required"));

    as_user(&db_path, "admin", "wrong-password")
        .args(["person", "list"])
        .assert()
        .failure()
        .stderr(contains("Invalid credentials"));
}

#[test]
fn test_person_list_shows_busy_state() {
    let db_path = setup_test_db("person_list_busy");
    init_db(&db_path);

    as_admin(&db_path)
        .args(["person", "add", "Ana", "--title", "Engineer"])
        .assert()
        .success()
        .stdout(contains("Person 'Ana' added (#1)"));

    // Far in the future, so Ana stays busy whatever day the test runs
    as_admin(&db_path)
        .args(["project", "add", "Long", "--start", "2025-01-01", "--end", "2099-12-31"])
        .assert()
        .success();

    as_admin(&db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success()
        .stdout(contains("Created assignment(s) #1"));

    as_admin(&db_path)
        .args(["person", "list"])
        .assert()
        .success()
        .stdout(contains("Ana").and(contains("Busy")));

    as_admin(&db_path)
        .args(["assign", "end", "1"])
        .assert()
        .success()
        .stdout(contains("Assignment #1 ended"));

    as_admin(&db_path)
        .args(["person", "list"])
        .assert()
        .success()
        .stdout(contains("Available"));
}

#[test]
fn test_duplicate_person_rejected() {
    let db_path = setup_test_db("duplicate_person");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["person", "add", "ana"])
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn test_conflict_needs_force_on_unconfirmed_project() {
    let db_path = setup_test_db("conflict_needs_force");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success();

    // Beta overlaps Alpha from 2025-01-15
    as_admin(&db_path)
        .args(["assign", "add", "--project", "2", "--person", "1"])
        .assert()
        .failure()
        .stderr(contains("Assignment conflict").and(contains("--force")));

    as_admin(&db_path)
        .args(["assign", "add", "--project", "2", "--person", "1", "--force"])
        .assert()
        .success()
        .stdout(contains("Forced: Ana is already assigned to Alpha"));

    as_admin(&db_path)
        .args(["assign", "list", "--person", "1"])
        .assert()
        .success()
        .stdout(contains("Alpha").and(contains("Beta")));
}

#[test]
fn test_conflict_blocked_on_confirmed_project() {
    let db_path = setup_test_db("conflict_confirmed");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["assign", "add", "--project", "2", "--person", "2"])
        .assert()
        .success();

    // Gamma is confirmed: --force does not help
    as_admin(&db_path)
        .args(["assign", "add", "--project", "3", "--person", "2", "--force"])
        .assert()
        .failure()
        .stderr(contains("is confirmed"));
}

#[test]
fn test_adjacent_ranges_do_not_conflict() {
    let db_path = setup_test_db("adjacent_ranges");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success();

    // Alpha ends 2025-01-31, Gamma starts 2025-02-01
    as_admin(&db_path)
        .args(["assign", "add", "--project", "3", "--person", "1"])
        .assert()
        .success();
}

#[test]
fn test_assignment_range_must_fit_project() {
    let db_path = setup_test_db("range_fits_project");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args([
            "assign", "add", "--project", "1", "--person", "1", "--from", "2024-12-20",
        ])
        .assert()
        .failure()
        .stderr(contains("outside project 'Alpha'"));
}

#[test]
fn test_available_excludes_conflicting_people() {
    let db_path = setup_test_db("available_excludes");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success();

    as_admin(&db_path)
        .args(["person", "available", "--from", "2025-01-20", "--to", "2025-01-25"])
        .assert()
        .success()
        .stdout(word("Luis").and(word("Ana").not()));

    as_admin(&db_path)
        .args(["person", "available", "--from", "2025-02-01", "--to", "2025-02-10"])
        .assert()
        .success()
        .stdout(word("Luis").and(word("Ana")));
}

#[test]
fn test_deleted_project_releases_people() {
    let db_path = setup_test_db("deleted_project_releases");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success();

    as_admin(&db_path)
        .args(["project", "delete", "1"])
        .assert()
        .success()
        .stdout(contains("Project 'Alpha' deleted"));

    as_admin(&db_path)
        .args(["assign", "add", "--project", "2", "--person", "1"])
        .assert()
        .success();

    as_admin(&db_path)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(contains("Alpha").not());
}

#[test]
fn test_project_edit_keeps_assignments_inside() {
    let db_path = setup_test_db("project_edit_range");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success();

    as_admin(&db_path)
        .args(["project", "edit", "1", "--end", "2025-01-20"])
        .assert()
        .failure()
        .stderr(contains("Validation error"));

    as_admin(&db_path)
        .args(["project", "edit", "1", "--confirmed", "true", "--code", "ALP"])
        .assert()
        .success()
        .stdout(contains("Project #1 updated"));

    as_admin(&db_path)
        .args(["project", "history", "1"])
        .assert()
        .success()
        .stdout(contains("confirmed").and(contains("ALP")));
}

#[test]
fn test_suggest_and_auto_assign() {
    let db_path = setup_test_db("suggest_auto");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success();

    // Ana is busy during Beta, so only Luis is suggested
    as_admin(&db_path)
        .args(["assign", "suggest", "--project", "2", "--as-of", "2025-01-10"])
        .assert()
        .success()
        .stdout(word("Luis").and(word("Ana").not()));

    as_admin(&db_path)
        .args(["assign", "auto", "--project", "2", "--as-of", "2025-01-10"])
        .assert()
        .success()
        .stdout(contains("Created assignment(s) #2"));

    as_admin(&db_path)
        .args(["assign", "list", "--project", "2"])
        .assert()
        .success()
        .stdout(contains("Luis"));
}

#[test]
fn test_calendar_and_gantt() {
    let db_path = setup_test_db("calendar_gantt");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success();

    as_admin(&db_path)
        .args([
            "calendar", "--from", "2025-01-01", "--to", "2025-01-10", "--gantt",
        ])
        .assert()
        .success()
        .stdout(contains("Ana").and(contains("Alpha")).and(contains("██████████")));

    as_admin(&db_path)
        .args(["calendar", "--from", "2025-03-01", "--to", "2025-03-31"])
        .assert()
        .success()
        .stdout(contains("No assignments in this window"));

    as_admin(&db_path)
        .args(["calendar", "--person", "Nobody"])
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn test_dashboard_reports_overlap() {
    let db_path = setup_test_db("dashboard_overlap");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success();
    as_admin(&db_path)
        .args(["assign", "add", "--project", "2", "--person", "1", "--force"])
        .assert()
        .success();

    as_admin(&db_path)
        .args(["dashboard", "--as-of", "2025-01-20"])
        .assert()
        .success()
        .stdout(contains("Ana has overlapping assignments"));
}

#[test]
fn test_user_role_cannot_modify() {
    let db_path = setup_test_db("user_role_readonly");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["user", "add", "viewer", "--new-password", "viewer-pass-1"])
        .assert()
        .success()
        .stdout(contains("User 'viewer' created"));

    as_user(&db_path, "viewer", "viewer-pass-1")
        .args(["person", "list"])
        .assert()
        .success()
        .stdout(contains("Ana"));

    as_user(&db_path, "viewer", "viewer-pass-1")
        .args(["project", "add", "Delta", "--start", "2025-03-01", "--end", "2025-03-31"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));

    as_user(&db_path, "viewer", "viewer-pass-1")
        .args(["audit", "list"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}

#[test]
fn test_manager_cannot_delete_projects() {
    let db_path = setup_test_db("manager_no_delete");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["user", "add", "boss", "--role", "manager", "--new-password", "boss-pass-1"])
        .assert()
        .success();

    as_user(&db_path, "boss", "boss-pass-1")
        .args(["assign", "add", "--project", "1", "--person", "2"])
        .assert()
        .success();

    as_user(&db_path, "boss", "boss-pass-1")
        .args(["project", "delete", "1"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}

#[test]
fn test_lockout_after_failed_logins() {
    let db_path = setup_test_db("lockout_failed_logins");
    init_db(&db_path);

    as_admin(&db_path)
        .args(["user", "add", "bob", "--new-password", "bob-pass-123"])
        .assert()
        .success();

    for _ in 0..5 {
        as_user(&db_path, "bob", "nope-nope")
            .args(["person", "list"])
            .assert()
            .failure()
            .stderr(contains("Invalid credentials"));
    }

    // Even the right password is refused while locked
    as_user(&db_path, "bob", "bob-pass-123")
        .args(["person", "list"])
        .assert()
        .failure()
        .stderr(contains("Account locked"));

    as_admin(&db_path)
        .args(["user", "unlock", "bob"])
        .assert()
        .success();

    as_user(&db_path, "bob", "bob-pass-123")
        .args(["person", "list"])
        .assert()
        .success();
}

#[test]
fn test_audit_trail_records_actions() {
    let db_path = setup_test_db("audit_trail");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success();

    as_admin(&db_path)
        .args(["audit", "list", "--username", "admin"])
        .assert()
        .success()
        .stdout(contains("ASSIGN"))
        .stdout(contains("Alpha"));
}

#[test]
fn test_person_history_tracks_edits() {
    let db_path = setup_test_db("person_history");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["person", "edit", "2", "--title", "Lead"])
        .assert()
        .success()
        .stdout(contains("Person #2 updated: title"));

    as_admin(&db_path)
        .args(["person", "history", "2"])
        .assert()
        .success()
        .stdout(contains("Analyst").and(contains("Lead")));
}

#[test]
fn test_db_info_and_check() {
    let db_path = setup_test_db("db_info_check");
    init_db_with_data(&db_path);

    rsp()
        .args(["--db", &db_path, "--test", "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("Personnel").and(contains("Projects")));

    rsp()
        .args(["--db", &db_path, "--test", "log", "--print"])
        .assert()
        .success()
        .stdout(contains("migration_applied").and(contains("bootstrap")));
}

#[test]
fn test_missing_database_is_reported() {
    let db_path = setup_test_db("missing_database");

    as_admin(&db_path)
        .args(["person", "list"])
        .assert()
        .failure()
        .stderr(contains("run `rstaffplan init` first"));
}
