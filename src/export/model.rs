// src/export/model.rs

use crate::models::assignment::AssignmentView;
use crate::models::person::Person;
use crate::models::project::Project;
use serde::Serialize;

/// How a column is typed in spreadsheet output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Integer,
    Date,
    Flag,
}

/// Flat record written by every export format. `kinds()` runs parallel to
/// `headers()`.
pub trait ExportRecord: Serialize {
    fn headers() -> &'static [&'static str];
    fn kinds() -> &'static [CellKind];
    fn to_row(&self) -> Vec<String>;
}

#[derive(Serialize, Clone, Debug)]
pub struct PersonExport {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub area: String,
    pub active: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct ProjectExport {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
    pub confirmed: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct AssignmentExport {
    pub id: i64,
    pub person: String,
    pub project: String,
    pub start_date: String,
    pub end_date: String,
    pub confirmed: bool,
    pub active: bool,
}

impl From<Person> for PersonExport {
    fn from(p: Person) -> Self {
        Self {
            id: p.id,
            name: p.name,
            title: p.title.unwrap_or_default(),
            area: p.area.unwrap_or_default(),
            active: p.active,
        }
    }
}

impl From<Project> for ProjectExport {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            start_date: p.range.start_str(),
            end_date: p.range.end_str(),
            name: p.name,
            code: p.code.unwrap_or_default(),
            status: p.status,
            confirmed: p.confirmed,
        }
    }
}

impl From<AssignmentView> for AssignmentExport {
    fn from(v: AssignmentView) -> Self {
        Self {
            id: v.id,
            start_date: v.range.start_str(),
            end_date: v.range.end_str(),
            person: v.person,
            project: v.project,
            confirmed: v.confirmed,
            active: v.active,
        }
    }
}

impl ExportRecord for PersonExport {
    fn headers() -> &'static [&'static str] {
        &["id", "name", "title", "area", "active"]
    }

    fn kinds() -> &'static [CellKind] {
        use CellKind::*;
        &[Integer, Text, Text, Text, Flag]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.title.clone(),
            self.area.clone(),
            self.active.to_string(),
        ]
    }
}

impl ExportRecord for ProjectExport {
    fn headers() -> &'static [&'static str] {
        &["id", "name", "code", "status", "start_date", "end_date", "confirmed"]
    }

    fn kinds() -> &'static [CellKind] {
        use CellKind::*;
        &[Integer, Text, Text, Text, Date, Date, Flag]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.code.clone(),
            self.status.clone(),
            self.start_date.clone(),
            self.end_date.clone(),
            self.confirmed.to_string(),
        ]
    }
}

impl ExportRecord for AssignmentExport {
    fn headers() -> &'static [&'static str] {
        &["id", "person", "project", "start_date", "end_date", "confirmed", "active"]
    }

    fn kinds() -> &'static [CellKind] {
        use CellKind::*;
        &[Integer, Text, Text, Date, Date, Flag, Flag]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.person.clone(),
            self.project.clone(),
            self.start_date.clone(),
            self.end_date.clone(),
            self.confirmed.to_string(),
            self.active.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aligned<T: ExportRecord>() -> bool {
        T::headers().len() == T::kinds().len()
    }

    #[test]
    fn every_header_has_a_cell_kind() {
        assert!(aligned::<PersonExport>());
        assert!(aligned::<ProjectExport>());
        assert!(aligned::<AssignmentExport>());
    }

    #[test]
    fn text_columns_stay_text_even_when_numeric_looking() {
        // A project code such as "2024" must not be written as a number.
        let code_col = ProjectExport::headers().iter().position(|h| *h == "code");
        assert_eq!(code_col.map(|i| ProjectExport::kinds()[i]), Some(CellKind::Text));
    }
}
