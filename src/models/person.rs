use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub title: Option<String>, // ⇔ personnel.title (cargo)
    pub area: Option<String>,
    pub active: bool,
}

/// Person plus the derived busy/available state shown by `person list`.
#[derive(Debug, Clone, Serialize)]
pub struct PersonStatus {
    pub person: Person,
    pub busy: bool,
}

impl PersonStatus {
    pub fn label(&self) -> &'static str {
        if self.busy { "Busy" } else { "Available" }
    }
}

/// Available person ranked by current load.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub person_id: i64,
    pub name: String,
    pub assignments_in_window: i64,
    pub load_percent: i64,
}
