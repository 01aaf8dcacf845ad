//! University directory records.
//!
//! A [`Directory`] groups students, teachers and administrative staff by
//! their unique code (e.g. `EST001`, `DOC002`, `ADM001`) plus named sets of
//! general schedule entries. It is built once at startup and only read
//! afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A student enrolled in a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    pub code: String,
    /// Academic program.
    pub career: String,
    /// Current term.
    pub semester: u32,
    /// Course name → grade.
    #[serde(default)]
    pub grades: BTreeMap<String, f64>,
    /// Ordered schedule slots, e.g. `"Lunes: Matemáticas 8am"`.
    #[serde(default)]
    pub schedule: Vec<String>,
}

/// A member of the teaching staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherRecord {
    pub name: String,
    pub code: String,
    pub department: String,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub schedule: Vec<String>,
}

/// A downloadable administrative form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadFormat {
    pub name: String,
    /// Relative URL under the static formats route.
    pub url: String,
}

/// A member of the administrative staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub name: String,
    pub code: String,
    pub role: String,
    #[serde(default)]
    pub formats: Vec<DownloadFormat>,
}

/// One day of a general schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day: String,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// A record found by code, whatever its category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DirectoryRecord<'a> {
    Student(&'a StudentRecord),
    Teacher(&'a TeacherRecord),
    Admin(&'a AdminRecord),
}

impl DirectoryRecord<'_> {
    pub fn code(&self) -> &str {
        match self {
            Self::Student(s) => &s.code,
            Self::Teacher(t) => &t.code,
            Self::Admin(a) => &a.code,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Student(s) => &s.name,
            Self::Teacher(t) => &t.name,
            Self::Admin(a) => &a.name,
        }
    }
}

/// The full read-only directory.
///
/// Serializes to the JSON document embedded in the model prompt, so field
/// order here is the order the model sees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub students: BTreeMap<String, StudentRecord>,
    #[serde(default)]
    pub teachers: BTreeMap<String, TeacherRecord>,
    #[serde(default)]
    pub admins: BTreeMap<String, AdminRecord>,
    /// Named schedule sets, e.g. `"general"`.
    #[serde(default)]
    pub schedules: BTreeMap<String, Vec<ScheduleEntry>>,
}

impl Directory {
    pub fn student(&self, code: &str) -> Option<&StudentRecord> {
        self.students.get(code)
    }

    pub fn teacher(&self, code: &str) -> Option<&TeacherRecord> {
        self.teachers.get(code)
    }

    pub fn admin(&self, code: &str) -> Option<&AdminRecord> {
        self.admins.get(code)
    }

    /// Returns the named schedule set, or an empty slice if it does not exist.
    pub fn schedule_set(&self, name: &str) -> &[ScheduleEntry] {
        self.schedules.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finds a record by code across all categories.
    pub fn lookup(&self, code: &str) -> Option<DirectoryRecord<'_>> {
        self.student(code)
            .map(DirectoryRecord::Student)
            .or_else(|| self.teacher(code).map(DirectoryRecord::Teacher))
            .or_else(|| self.admin(code).map(DirectoryRecord::Admin))
    }

    /// Total number of person records.
    pub fn len(&self) -> usize {
        self.students.len() + self.teachers.len() + self.admins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
