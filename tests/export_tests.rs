mod common;
use common::{as_admin, init_db_with_data, rsp, setup_test_db, temp_out};
use predicates::str::contains;
use std::fs;
use std::path::Path;

fn with_assignments(db_path: &str) {
    init_db_with_data(db_path);
    as_admin(db_path)
        .args(["assign", "add", "--project", "1", "--person", "1"])
        .assert()
        .success();
    as_admin(db_path)
        .args(["assign", "add", "--project", "3", "--person", "2"])
        .assert()
        .success();
}

#[test]
fn test_export_personnel_csv() {
    let db_path = setup_test_db("export_personnel_csv");
    init_db_with_data(&db_path);
    let out = temp_out("export_personnel_csv", "csv");

    as_admin(&db_path)
        .args(["export", "--what", "personnel", "--file", &out])
        .assert()
        .success()
        .stdout(contains("export completed"));

    let content = fs::read_to_string(&out).expect("read exported csv");
    assert!(content.starts_with("id,name,title,area,active"));
    assert!(content.contains("Ana,Engineer,Ops"));
    assert!(content.contains("Luis,Analyst,Ops"));
}

#[test]
fn test_export_assignments_json_range() {
    let db_path = setup_test_db("export_assignments_json_range");
    with_assignments(&db_path);
    let out = temp_out("export_assignments_json_range", "json");

    as_admin(&db_path)
        .args([
            "export", "--what", "assignments", "--format", "json", "--file", &out, "--range",
            "2025-01",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("read exported json");
    let rows: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    let rows = rows.as_array().expect("json array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["person"], "Ana");
    assert_eq!(rows[0]["project"], "Alpha");
}

#[test]
fn test_export_projects_range_intersection() {
    let db_path = setup_test_db("export_projects_range");
    init_db_with_data(&db_path);
    let out = temp_out("export_projects_range", "csv");

    // Beta (Jan 15 → Feb 15) and Gamma (Feb) intersect February, Alpha does not
    as_admin(&db_path)
        .args([
            "export", "--what", "projects", "--file", &out, "--range", "2025-02",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("read exported csv");
    assert!(!content.contains("Alpha"));
    assert!(content.contains("Beta"));
    assert!(content.contains("Gamma"));
}

#[test]
fn test_export_xlsx_creates_file() {
    let db_path = setup_test_db("export_assignments_xlsx");
    with_assignments(&db_path);
    let out = temp_out("export_assignments_xlsx", "xlsx");

    as_admin(&db_path)
        .args([
            "export", "--what", "assignments", "--format", "xlsx", "--file", &out,
        ])
        .assert()
        .success();

    let meta = fs::metadata(&out).expect("xlsx exists");
    assert!(meta.len() > 0);
}

fn xlsx_part(path: &str, part: &str) -> String {
    use std::io::Read;
    let file = fs::File::open(path).expect("open xlsx");
    let mut archive = zip::ZipArchive::new(file).expect("xlsx is a zip");
    let mut entry = archive.by_name(part).expect("part exists");
    let mut xml = String::new();
    entry.read_to_string(&mut xml).expect("utf-8 part");
    xml
}

#[test]
fn test_export_xlsx_types_cells_by_column() {
    let db_path = setup_test_db("export_projects_xlsx_types");
    init_db_with_data(&db_path);
    let out = temp_out("export_projects_xlsx_types", "xlsx");

    as_admin(&db_path)
        .args(["export", "--what", "projects", "--format", "xlsx", "--file", &out])
        .assert()
        .success();

    let sheet = xlsx_part(&out, "xl/worksheets/sheet1.xml");
    // Alpha starts 2025-01-01, Excel serial 45658.
    assert!(sheet.contains("<v>45658</v>"), "start date is a date cell");
    // confirmed column is a native boolean.
    assert!(sheet.contains(r#"t="b""#));

    let strings = xlsx_part(&out, "xl/sharedStrings.xml");
    assert!(strings.contains("Alpha"));
    assert!(!strings.contains("2025-01-01"), "dates are not stored as text");
}

#[test]
fn test_export_requires_absolute_path() {
    let db_path = setup_test_db("export_relative_path");
    init_db_with_data(&db_path);

    as_admin(&db_path)
        .args(["export", "--what", "personnel", "--file", "relative.csv"])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn test_export_overwrite_with_force() {
    let db_path = setup_test_db("export_force");
    init_db_with_data(&db_path);
    let out = temp_out("export_force", "csv");
    fs::write(&out, "old").expect("seed file");

    as_admin(&db_path)
        .args(["export", "--what", "personnel", "--file", &out, "--force"])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("read exported csv");
    assert!(content.contains("Ana"));
}

#[test]
fn test_backup_plain_and_compressed() {
    let db_path = setup_test_db("backup_plain_compressed");
    init_db_with_data(&db_path);

    let plain = temp_out("backup_plain", "sqlite");
    rsp()
        .args(["--db", &db_path, "--test", "backup", "--file", &plain])
        .assert()
        .success();
    assert!(Path::new(&plain).exists());

    let packed = temp_out("backup_packed", "sqlite");
    let archive = if cfg!(target_os = "windows") {
        Path::new(&packed).with_extension("zip")
    } else {
        Path::new(&format!("{}.tar.gz", packed)).to_path_buf()
    };
    fs::remove_file(&archive).ok();

    rsp()
        .args([
            "--db", &db_path, "--test", "backup", "--file", &packed, "--compress",
        ])
        .assert()
        .success();
    assert!(archive.exists());
    assert!(!Path::new(&packed).exists());

    rsp()
        .args(["--db", &db_path, "--test", "log", "--print"])
        .assert()
        .success()
        .stdout(contains("backup"));
}
