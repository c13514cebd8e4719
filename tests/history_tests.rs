use chrono::NaiveDate;
use rstaffplan::core::auth::Session;
use rstaffplan::core::personnel::{PersonChanges, PersonnelLogic};
use rstaffplan::core::projects::ProjectLogic;
use rstaffplan::db::initialize::init_db;
use rstaffplan::db::pool::DbPool;
use rstaffplan::errors::AppError;
use rstaffplan::models::project::ProjectChanges;
use rstaffplan::models::role::Role;

fn admin() -> Session {
    Session {
        user_id: 1,
        username: "admin".into(),
        role: Role::Admin,
    }
}

fn setup() -> DbPool {
    let pool = DbPool::in_memory().expect("in-memory db");
    init_db(&pool.conn).expect("init db");
    pool
}

fn reject_updates_on(pool: &DbPool, table: &str) {
    pool.conn
        .execute_batch(&format!(
            "CREATE TRIGGER block_{table} BEFORE UPDATE ON {table}
             BEGIN SELECT RAISE(ABORT, 'updates blocked'); END;"
        ))
        .expect("create trigger");
}

fn project(pool: &DbPool, name: &str) -> i64 {
    let input = ProjectChanges {
        name: Some(name.into()),
        start: NaiveDate::from_ymd_opt(2024, 1, 1),
        end: NaiveDate::from_ymd_opt(2024, 1, 31),
        ..Default::default()
    };
    ProjectLogic::create(&pool.conn, &admin(), &input).expect("create project")
}

#[test]
fn edit_records_one_history_row_per_field() {
    let pool = setup();
    let id = PersonnelLogic::add(&pool.conn, &admin(), "Ana", None, None).expect("add");

    let changes = PersonChanges {
        title: Some("Engineer".into()),
        area: Some("Ops".into()),
        ..Default::default()
    };
    let changed = PersonnelLogic::edit(&pool.conn, &admin(), id, &changes).expect("edit");
    assert_eq!(changed, vec!["title", "area"]);

    let history = PersonnelLogic::history(&pool.conn, &admin(), Some(id)).expect("history");
    // create + two edits
    assert_eq!(history.len(), 3);
}

#[test]
fn failed_person_update_leaves_no_history() {
    let pool = setup();
    let id = PersonnelLogic::add(&pool.conn, &admin(), "Ana", None, None).expect("add");
    reject_updates_on(&pool, "personnel");

    let changes = PersonChanges {
        title: Some("Engineer".into()),
        ..Default::default()
    };
    assert!(matches!(
        PersonnelLogic::edit(&pool.conn, &admin(), id, &changes),
        Err(AppError::Db(_))
    ));
    assert!(PersonnelLogic::set_active(&pool.conn, &admin(), id, false).is_err());

    let history = PersonnelLogic::history(&pool.conn, &admin(), Some(id)).expect("history");
    assert_eq!(history.len(), 1, "only the create row survives");
    assert_eq!(history[0].field, "record");
}

#[test]
fn failed_project_update_leaves_no_history() {
    let pool = setup();
    let id = project(&pool, "Alpha");
    reject_updates_on(&pool, "projects");

    let changes = ProjectChanges {
        status: Some("On hold".into()),
        ..Default::default()
    };
    assert!(ProjectLogic::edit(&pool.conn, &admin(), id, &changes).is_err());
    assert!(ProjectLogic::delete(&pool.conn, &admin(), id).is_err());

    let history = ProjectLogic::history(&pool.conn, &admin(), Some(id)).expect("history");
    assert!(
        history.iter().all(|h| h.action != "EDIT" && h.action != "DELETE"),
        "no edit or delete rows after rolled back updates"
    );
}
