mod common;
use common::{as_admin, init_db_with_data, setup_test_db, temp_out};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

const SAMPLE: &str = "\
Nombre,Cargo,Area
Ana,Engineer,Ops
Luis,Lead,Ops
Marta,Designer,UX
,Nobody,UX
marta,Designer,UX
";

#[test]
fn test_import_dry_run_writes_nothing() {
    let db_path = setup_test_db("import_dry_run");
    init_db_with_data(&db_path);
    let csv = temp_out("import_dry_run", "csv");
    fs::write(&csv, SAMPLE).expect("write csv");

    as_admin(&db_path)
        .args(["person", "import", "--file", &csv, "--dry-run"])
        .assert()
        .success()
        .stdout(contains("New: 1  Update: 1  Skipped: 3  Errors: 0"))
        .stdout(contains("Dry run: nothing written."));

    as_admin(&db_path)
        .args(["person", "list"])
        .assert()
        .success()
        .stdout(contains("Marta").not());
}

#[test]
fn test_import_inserts_and_updates() {
    let db_path = setup_test_db("import_apply");
    init_db_with_data(&db_path);
    let csv = temp_out("import_apply", "csv");
    fs::write(&csv, SAMPLE).expect("write csv");

    as_admin(&db_path)
        .args(["person", "import", "--file", &csv])
        .assert()
        .success()
        .stdout(contains("Import completed: 1 added, 1 updated"));

    as_admin(&db_path)
        .args(["person", "list"])
        .assert()
        .success()
        .stdout(contains("Marta").and(contains("Lead")));

    // Running it again finds nothing left to do
    as_admin(&db_path)
        .args(["person", "import", "--file", &csv])
        .assert()
        .success()
        .stdout(contains("Nothing to import."));
}

#[test]
fn test_import_rejects_missing_columns() {
    let db_path = setup_test_db("import_missing_columns");
    init_db_with_data(&db_path);
    let csv = temp_out("import_missing_columns", "csv");
    fs::write(&csv, "name,title\nAna,Engineer\n").expect("write csv");

    as_admin(&db_path)
        .args(["person", "import", "--file", &csv])
        .assert()
        .failure()
        .stderr(contains("nombre, cargo, area"));
}
