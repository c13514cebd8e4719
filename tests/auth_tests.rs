//! Login, lockout, roles and reset tokens against an in-memory database.

use chrono::{Duration, Local};
use rstaffplan::config::Config;
use rstaffplan::core::auth::{Session, login_at};
use rstaffplan::core::import::ImportLogic;
use rstaffplan::core::personnel::PersonnelLogic;
use rstaffplan::core::users::UserLogic;
use rstaffplan::db::audit::list_entries;
use rstaffplan::db::initialize::init_db;
use rstaffplan::db::pool::DbPool;
use rstaffplan::errors::AppError;
use rstaffplan::models::role::{Permission, Role};

const PW: &str = "admin-secret-1";

fn setup() -> (DbPool, Config) {
    let pool = DbPool::in_memory().expect("in-memory db");
    init_db(&pool.conn).expect("init db");
    let cfg = Config::default();
    UserLogic::bootstrap_admin(&pool.conn, &cfg, "admin", PW).expect("bootstrap");
    (pool, cfg)
}

fn admin_session(pool: &DbPool, cfg: &Config) -> Session {
    login_at(&pool.conn, cfg, "admin", PW, Local::now()).expect("admin login")
}

#[test]
fn bootstrap_only_once() {
    let (pool, cfg) = setup();
    assert!(matches!(
        UserLogic::bootstrap_admin(&pool.conn, &cfg, "other", PW),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn lockout_after_max_failed_logins() {
    let (pool, cfg) = setup();
    let now = Local::now();

    for _ in 0..cfg.max_failed_logins {
        assert!(matches!(
            login_at(&pool.conn, &cfg, "admin", "wrong-password", now),
            Err(AppError::InvalidCredentials)
        ));
    }

    // Correct password refused while locked
    assert!(matches!(
        login_at(&pool.conn, &cfg, "admin", PW, now),
        Err(AppError::AccountLocked(_))
    ));

    // Accepted again once the lockout expired; the counter is reset
    let later = now + Duration::minutes(cfg.lockout_minutes + 1);
    let session = login_at(&pool.conn, &cfg, "admin", PW, later).expect("login after lockout");
    assert_eq!(session.role, Role::Admin);
    assert!(matches!(
        login_at(&pool.conn, &cfg, "admin", "wrong-password", later),
        Err(AppError::InvalidCredentials)
    ));
    login_at(&pool.conn, &cfg, "admin", PW, later).expect("one failure does not lock");
}

#[test]
fn unknown_and_disabled_users_look_the_same() {
    let (pool, cfg) = setup();
    let admin = admin_session(&pool, &cfg);
    UserLogic::create(&pool.conn, &cfg, &admin, "bob", Role::User, "bob-pass-123").expect("create");
    UserLogic::set_active(&pool.conn, &admin, "bob", false).expect("disable");

    assert!(matches!(
        login_at(&pool.conn, &cfg, "bob", "bob-pass-123", Local::now()),
        Err(AppError::InvalidCredentials)
    ));
    assert!(matches!(
        login_at(&pool.conn, &cfg, "ghost", "whatever-1", Local::now()),
        Err(AppError::InvalidCredentials)
    ));
}

#[test]
fn failed_logins_are_audited_under_attempted_username() {
    let (pool, cfg) = setup();
    let _ = login_at(&pool.conn, &cfg, "admin", "wrong-password", Local::now());
    let _ = login_at(&pool.conn, &cfg, "ghost", "whatever-1", Local::now());

    let admin_rows = list_entries(&pool.conn, 10, Some("admin")).expect("audit");
    assert!(
        admin_rows
            .iter()
            .any(|e| e.action == "LOGIN_FAILED" && e.detail.contains("Failed login #1"))
    );

    let ghost_rows = list_entries(&pool.conn, 10, Some("ghost")).expect("audit");
    assert_eq!(ghost_rows.len(), 1);
    assert_eq!(ghost_rows[0].action, "LOGIN_FAILED");
    assert_eq!(ghost_rows[0].user_id, None);
}

#[test]
fn locked_and_disabled_refusals_are_audited() {
    let (pool, cfg) = setup();
    let admin = admin_session(&pool, &cfg);
    UserLogic::create(&pool.conn, &cfg, &admin, "bob", Role::User, "bob-pass-123").expect("create");
    UserLogic::create(&pool.conn, &cfg, &admin, "eve", Role::User, "eve-pass-123").expect("create");
    UserLogic::set_active(&pool.conn, &admin, "eve", false).expect("disable");

    let now = Local::now();
    for _ in 0..cfg.max_failed_logins {
        let _ = login_at(&pool.conn, &cfg, "bob", "wrong-password", now);
    }
    let _ = login_at(&pool.conn, &cfg, "bob", "bob-pass-123", now);
    let _ = login_at(&pool.conn, &cfg, "eve", "eve-pass-123", now);

    let bob = list_entries(&pool.conn, 20, Some("bob")).expect("audit");
    let failed = bob.iter().filter(|e| e.action == "LOGIN_FAILED").count();
    assert_eq!(failed as i64, cfg.max_failed_logins + 1);
    assert!(bob.iter().any(|e| e.detail.contains("account locked")));

    let eve = list_entries(&pool.conn, 20, Some("eve")).expect("audit");
    assert!(eve.iter().any(|e| e.action == "LOGIN_FAILED" && e.detail.contains("disabled")));
}

#[test]
fn permission_matrix() {
    use Permission::*;
    let all = [
        ViewDashboard,
        ManageUsers,
        CreateProject,
        EditProject,
        DeleteProject,
        AssignPersonnel,
        EditPersonnel,
        ViewAudit,
    ];

    assert!(all.iter().all(|p| Role::Admin.can(*p)));

    let manager: Vec<_> = all.iter().filter(|p| Role::Manager.can(**p)).collect();
    assert_eq!(
        manager,
        vec![&ViewDashboard, &CreateProject, &EditProject, &AssignPersonnel, &EditPersonnel]
    );

    let user: Vec<_> = all.iter().filter(|p| Role::User.can(**p)).collect();
    assert_eq!(user, vec![&ViewDashboard]);
}

#[test]
fn user_role_cannot_add_personnel() {
    let (pool, cfg) = setup();
    let admin = admin_session(&pool, &cfg);
    UserLogic::create(&pool.conn, &cfg, &admin, "viewer", Role::User, "viewer-pass-1").expect("create");

    let viewer = login_at(&pool.conn, &cfg, "viewer", "viewer-pass-1", Local::now()).expect("login");
    assert!(matches!(
        PersonnelLogic::add(&pool.conn, &viewer, "Ana", None, None),
        Err(AppError::PermissionDenied { .. })
    ));
}

#[test]
fn admin_keeps_own_role_and_access() {
    let (pool, cfg) = setup();
    let admin = admin_session(&pool, &cfg);

    assert!(UserLogic::change_role(&pool.conn, &admin, "admin", Role::User).is_err());
    assert!(UserLogic::set_active(&pool.conn, &admin, "admin", false).is_err());
}

#[test]
fn reset_token_is_single_use() {
    let (pool, cfg) = setup();
    let admin = admin_session(&pool, &cfg);
    UserLogic::create(&pool.conn, &cfg, &admin, "bob", Role::User, "bob-pass-123").expect("create");

    let now = Local::now();
    let (token, _) = UserLogic::issue_reset_token(&pool.conn, &cfg, &admin, "bob", now).expect("token");

    assert!(matches!(
        UserLogic::redeem_token(&pool.conn, &cfg, "bob", "not-the-token", "new-pass-123", now),
        Err(AppError::InvalidCredentials)
    ));
    UserLogic::redeem_token(&pool.conn, &cfg, "bob", &token, "new-pass-123", now).expect("redeem");
    assert!(matches!(
        UserLogic::redeem_token(&pool.conn, &cfg, "bob", &token, "other-pass-123", now),
        Err(AppError::InvalidCredentials)
    ));

    login_at(&pool.conn, &cfg, "bob", "new-pass-123", now).expect("login with new password");
}

#[test]
fn expired_reset_token_is_refused() {
    let (pool, cfg) = setup();
    let admin = admin_session(&pool, &cfg);
    let now = Local::now();
    let (token, expires) = UserLogic::issue_reset_token(&pool.conn, &cfg, &admin, "admin", now).expect("token");

    let late = expires + Duration::minutes(1);
    assert!(matches!(
        UserLogic::redeem_token(&pool.conn, &cfg, "admin", &token, "new-pass-123", late),
        Err(AppError::InvalidCredentials)
    ));
}

#[test]
fn import_plan_from_reader() {
    let (mut pool, cfg) = setup();
    let admin = admin_session(&pool, &cfg);
    PersonnelLogic::add(&pool.conn, &admin, "Ana", Some("Engineer"), Some("Ops")).expect("add");

    let csv = "name,title,area\nAna,Lead,Ops\nLuis,Analyst,Ops\n,Empty,Ops\n";
    let plan = ImportLogic::plan(&pool.conn, &admin, csv.as_bytes()).expect("plan");
    assert_eq!(plan.inserts(), 1);
    assert_eq!(plan.updates(), 1);
    assert_eq!(plan.skipped(), 1);

    let report = ImportLogic::apply(&mut pool, &admin, &plan).expect("apply");
    assert_eq!((report.inserted, report.updated), (1, 1));

    let entries = list_entries(&pool.conn, 5, Some("admin")).expect("audit");
    assert!(entries.iter().any(|e| e.action == "IMPORT"));
}
