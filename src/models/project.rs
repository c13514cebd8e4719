use crate::models::date_range::DateRange;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    pub status: String,
    pub range: DateRange,
    pub confirmed: bool,
    pub deleted: bool,
}

impl Project {
    pub fn confirmation_label(&self) -> &'static str {
        if self.confirmed {
            "Confirmed"
        } else {
            "Not confirmed"
        }
    }
}

/// Field values accepted by `project add` / `project edit`.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub status: Option<String>,
    pub start: Option<chrono::NaiveDate>,
    pub end: Option<chrono::NaiveDate>,
    pub confirmed: Option<bool>,
}

/// One row of `project_history` / `personnel_history`.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub entity_id: i64,
    pub entity_name: String,
    pub timestamp: String,
    pub action: String,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub username: String,
}
