use crate::models::date_range::DateRange;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub id: i64,
    pub person_id: i64,
    pub project_id: i64,
    pub range: DateRange,
    pub active: bool,
}

/// Assignment joined with person and project names, as listed in the
/// calendar and `assign list`.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub id: i64,
    pub person_id: i64,
    pub person: String,
    pub project_id: i64,
    pub project: String,
    pub confirmed: bool,
    pub range: DateRange,
    pub active: bool,
}

/// Two active assignments of the same person sharing at least one day.
#[derive(Debug, Clone, Serialize)]
pub struct OverlapPair {
    pub person_id: i64,
    pub person: String,
    pub first: AssignmentView,
    pub second: AssignmentView,
}
