//! Library-level checks of the overlap and availability rules on an
//! in-memory database.

use chrono::NaiveDate;
use rstaffplan::core::assign::{AssignLogic, AssignRequest};
use rstaffplan::core::auth::Session;
use rstaffplan::core::availability::{
    LoadPolicy, available_personnel, busy_person_ids, has_overlap, overlapping_pairs, suggest_personnel,
};
use rstaffplan::core::personnel::PersonnelLogic;
use rstaffplan::core::projects::ProjectLogic;
use rstaffplan::db::assignments::{AssignmentFilter, list_views};
use rstaffplan::db::initialize::init_db;
use rstaffplan::db::pool::DbPool;
use rstaffplan::errors::AppError;
use rstaffplan::models::date_range::DateRange;
use rstaffplan::models::project::ProjectChanges;
use rstaffplan::models::role::Role;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn range(a: &str, b: &str) -> DateRange {
    DateRange::new(d(a), d(b)).expect("valid range")
}

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

fn person(pool: &DbPool, name: &str) -> i64 {
    PersonnelLogic::add(&pool.conn, &admin(), name, None, None).expect("add person")
}

fn project(pool: &DbPool, name: &str, start: &str, end: &str, confirmed: bool) -> i64 {
    let input = ProjectChanges {
        name: Some(name.into()),
        start: Some(d(start)),
        end: Some(d(end)),
        confirmed: Some(confirmed),
        ..Default::default()
    };
    ProjectLogic::create(&pool.conn, &admin(), &input).expect("create project")
}

fn assign(pool: &mut DbPool, project_id: i64, person_id: i64, force: bool) -> Result<Vec<i64>, AppError> {
    let req = AssignRequest {
        project_id,
        person_ids: vec![person_id],
        range: None,
        force,
    };
    AssignLogic::apply(pool, &admin(), &req).map(|o| o.created)
}

#[test]
fn january_assignment_boundaries() {
    let mut pool = setup();
    let p = person(&pool, "Ana");
    let x = project(&pool, "X", "2024-01-01", "2024-01-31", false);
    assign(&mut pool, x, p, false).expect("assign");

    let conn = &pool.conn;
    assert!(has_overlap(conn, p, &range("2024-01-15", "2024-02-15"), None).unwrap());
    assert!(!has_overlap(conn, p, &range("2024-02-01", "2024-02-15"), None).unwrap());
    assert!(has_overlap(conn, p, &range("2024-01-31", "2024-02-15"), None).unwrap());
    assert!(has_overlap(conn, p, &range("2023-12-01", "2024-01-01"), None).unwrap());
    assert!(!has_overlap(conn, p, &range("2023-12-01", "2023-12-31"), None).unwrap());
}

#[test]
fn overlap_is_symmetric_for_shared_days() {
    let mut pool = setup();
    let a = person(&pool, "Ana");
    let b = person(&pool, "Luis");
    let x = project(&pool, "X", "2024-03-01", "2024-03-20", false);
    let y = project(&pool, "Y", "2024-03-10", "2024-03-31", false);

    assign(&mut pool, x, a, false).expect("assign a");
    assign(&mut pool, y, b, false).expect("assign b");

    let x_range = range("2024-03-01", "2024-03-20");
    let y_range = range("2024-03-10", "2024-03-31");
    assert!(has_overlap(&pool.conn, a, &y_range, None).unwrap());
    assert!(has_overlap(&pool.conn, b, &x_range, None).unwrap());
}

#[test]
fn excluded_assignment_does_not_conflict_with_itself() {
    let mut pool = setup();
    let p = person(&pool, "Ana");
    let x = project(&pool, "X", "2024-01-01", "2024-01-31", false);
    let created = assign(&mut pool, x, p, false).expect("assign");

    let jan = range("2024-01-01", "2024-01-31");
    assert!(has_overlap(&pool.conn, p, &jan, None).unwrap());
    assert!(!has_overlap(&pool.conn, p, &jan, Some(created[0])).unwrap());
}

#[test]
fn available_is_complement_of_conflicting_people() {
    let mut pool = setup();
    let ana = person(&pool, "Ana");
    let luis = person(&pool, "Luis");
    let marta = person(&pool, "Marta");
    let x = project(&pool, "X", "2024-01-01", "2024-01-31", false);
    assign(&mut pool, x, ana, false).expect("assign");

    PersonnelLogic::set_active(&pool.conn, &admin(), marta, false).expect("deactivate");

    let free: Vec<i64> = available_personnel(&pool.conn, &range("2024-01-20", "2024-01-25"))
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(free, vec![luis]);

    let busy = busy_person_ids(&pool.conn, &range("2024-01-20", "2024-01-25")).unwrap();
    assert_eq!(busy.into_iter().collect::<Vec<_>>(), vec![ana]);

    let free_feb: Vec<i64> = available_personnel(&pool.conn, &range("2024-02-01", "2024-02-28"))
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(free_feb, vec![ana, luis]);
}

#[test]
fn ended_assignment_releases_person() {
    let mut pool = setup();
    let p = person(&pool, "Ana");
    let x = project(&pool, "X", "2024-01-01", "2024-01-31", false);
    let created = assign(&mut pool, x, p, false).expect("assign");

    AssignLogic::end(&pool.conn, &admin(), created[0]).expect("end");

    let jan = range("2024-01-10", "2024-01-12");
    assert!(!has_overlap(&pool.conn, p, &jan, None).unwrap());

    // Ending twice is rejected
    assert!(matches!(
        AssignLogic::end(&pool.conn, &admin(), created[0]),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn deleted_project_releases_people() {
    let mut pool = setup();
    let p = person(&pool, "Ana");
    let x = project(&pool, "X", "2024-01-01", "2024-01-31", true);
    let y = project(&pool, "Y", "2024-01-15", "2024-02-15", true);
    assign(&mut pool, x, p, false).expect("assign");

    assert!(matches!(assign(&mut pool, y, p, true), Err(AppError::Conflict(_))));

    ProjectLogic::delete(&pool.conn, &admin(), x).expect("delete");
    assign(&mut pool, y, p, false).expect("assign after delete");
}

#[test]
fn forced_overlap_shows_up_as_pair() {
    let mut pool = setup();
    let p = person(&pool, "Ana");
    let x = project(&pool, "X", "2024-01-01", "2024-01-31", false);
    let y = project(&pool, "Y", "2024-01-15", "2024-02-15", false);
    assign(&mut pool, x, p, false).expect("assign x");

    assert!(matches!(assign(&mut pool, y, p, false), Err(AppError::Conflict(_))));
    assign(&mut pool, y, p, true).expect("forced");

    let pairs = overlapping_pairs(&pool.conn, None).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].person, "Ana");
}

#[test]
fn suggestions_prefer_lower_load() {
    let mut pool = setup();
    let ana = person(&pool, "Ana");
    let luis = person(&pool, "Luis");
    let x = project(&pool, "X", "2024-01-01", "2024-01-10", false);
    assign(&mut pool, x, ana, false).expect("assign");

    let policy = LoadPolicy::default();
    let picks = suggest_personnel(
        &pool.conn,
        &range("2024-03-01", "2024-03-31"),
        d("2024-01-01"),
        &policy,
        None,
    )
    .unwrap();

    assert_eq!(picks.len(), 2);
    assert_eq!(picks[0].person_id, luis);
    assert_eq!(picks[0].load_percent, 0);
    assert_eq!(picks[1].person_id, ana);
    assert_eq!(picks[1].load_percent, 20);
}

#[test]
fn load_percent_is_capped() {
    let policy = LoadPolicy::default();
    assert_eq!(policy.percent(0), 0);
    assert_eq!(policy.percent(3), 60);
    assert_eq!(policy.percent(7), 100);
}

#[test]
fn one_conflict_aborts_the_whole_batch() {
    let mut pool = setup();
    let ana = person(&pool, "Ana");
    let luis = person(&pool, "Luis");
    let x = project(&pool, "X", "2024-01-01", "2024-01-31", false);
    let y = project(&pool, "Y", "2024-01-15", "2024-02-15", true);
    assign(&mut pool, x, ana, false).expect("assign");

    let all = AssignmentFilter {
        include_inactive: true,
        ..Default::default()
    };
    let before = list_views(&pool.conn, &all).unwrap().len();

    let req = AssignRequest {
        project_id: y,
        person_ids: vec![luis, ana],
        range: None,
        force: true,
    };
    assert!(matches!(
        AssignLogic::apply(&mut pool, &admin(), &req),
        Err(AppError::Conflict(_))
    ));

    assert_eq!(list_views(&pool.conn, &all).unwrap().len(), before);
    assert!(!has_overlap(&pool.conn, luis, &range("2024-01-15", "2024-02-15"), None).unwrap());
}
