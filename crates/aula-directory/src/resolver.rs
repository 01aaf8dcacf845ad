//! Keyword-driven directory lookups.
//!
//! A query is classified by the first category whose keyword it contains,
//! checked in [`EntityCategory::PRIORITY`] order. Only that category is
//! evaluated: a query mentioning both a student and a teacher is answered
//! about the student. Within the category a code such as `est001` is
//! extracted, upper-cased and looked up. The resulting sentence is handed to
//! the model as extra context; it never replaces the model call.

use aula_types::{AdminRecord, Directory, StudentRecord, TeacherRecord};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::LazyLock;

static STUDENT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)est\d+").expect("student code pattern is valid"));
static TEACHER_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)doc\d+").expect("teacher code pattern is valid"));
static ADMIN_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)adm\d+").expect("admin code pattern is valid"));

/// Name of the schedule set summarized for schedule questions.
const GENERAL_SCHEDULE: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Student,
    Teacher,
    Admin,
    Schedule,
}

impl EntityCategory {
    /// Classification order.
    pub const PRIORITY: [EntityCategory; 4] =
        [Self::Student, Self::Teacher, Self::Admin, Self::Schedule];

    /// Lower-case substrings that select this category.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Student => &["estudiante", "codigo est"],
            Self::Teacher => &["docente", "codigo doc"],
            Self::Admin => &["administrativo", "codigo adm"],
            Self::Schedule => &["horario"],
        }
    }

    /// Sentence returned when a category matched but no record did.
    ///
    /// Schedules are not looked up by code, so they never miss.
    pub fn not_found(self) -> Option<&'static str> {
        match self {
            Self::Student => Some("Estudiante no encontrado."),
            Self::Teacher => Some("Docente no encontrado."),
            Self::Admin => Some("Administrativo no encontrado."),
            Self::Schedule => None,
        }
    }

    fn code_pattern(self) -> Option<&'static Regex> {
        match self {
            Self::Student => Some(&*STUDENT_CODE),
            Self::Teacher => Some(&*TEACHER_CODE),
            Self::Admin => Some(&*ADMIN_CODE),
            Self::Schedule => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
            Self::Schedule => "schedule",
        }
    }

    /// Returns the first category whose keyword appears in `query`.
    pub fn classify(query: &str) -> Option<Self> {
        let lower = query.to_lowercase();
        Self::PRIORITY
            .into_iter()
            .find(|category| category.keywords().iter().any(|kw| lower.contains(kw)))
    }

    /// Extracts this category's code from `query`, upper-cased.
    pub fn extract_code(self, query: &str) -> Option<String> {
        self.code_pattern()?
            .find(query)
            .map(|m| m.as_str().to_uppercase())
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving a query against the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Category selected by keyword, if any.
    pub category: Option<EntityCategory>,
    /// Code of the record that was found.
    pub code: Option<String>,
    /// Sentence to append to the user turn; empty when nothing matched.
    pub context: String,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }
}

/// Resolves `query` against `directory`.
pub fn resolve(directory: &Directory, query: &str) -> Resolution {
    let Some(category) = EntityCategory::classify(query) else {
        return Resolution::default();
    };

    let found = match category {
        EntityCategory::Student => category
            .extract_code(query)
            .and_then(|code| directory.student(&code).map(|s| (code, summarize_student(s)))),
        EntityCategory::Teacher => category
            .extract_code(query)
            .and_then(|code| directory.teacher(&code).map(|t| (code, summarize_teacher(t)))),
        EntityCategory::Admin => category
            .extract_code(query)
            .and_then(|code| directory.admin(&code).map(|a| (code, summarize_admin(a)))),
        EntityCategory::Schedule => {
            return Resolution {
                category: Some(category),
                code: None,
                context: summarize_schedule(directory),
            };
        }
    };

    match found {
        Some((code, context)) => Resolution {
            category: Some(category),
            code: Some(code),
            context,
        },
        None => Resolution {
            category: Some(category),
            code: None,
            context: category.not_found().unwrap_or_default().to_string(),
        },
    }
}

fn summarize_student(student: &StudentRecord) -> String {
    format!(
        "Estudiante: {}. Carrera: {}. Semestre: {}. Notas: {}. Horario: {}.",
        student.name,
        student.career,
        student.semester,
        grades_json(student),
        student.schedule.join(", ")
    )
}

/// Renders grades as a JSON object, writing whole numbers without a
/// fractional part (`4` rather than `4.0`).
fn grades_json(student: &StudentRecord) -> Value {
    let grades = student
        .grades
        .iter()
        .map(|(subject, &grade)| {
            let value = if grade.is_finite() && grade.fract() == 0.0 && grade.abs() < 1e15 {
                json!(grade as i64)
            } else {
                json!(grade)
            };
            (subject.clone(), value)
        })
        .collect::<Map<String, Value>>();
    Value::Object(grades)
}

fn summarize_teacher(teacher: &TeacherRecord) -> String {
    format!(
        "Docente: {}. Departamento: {}. Cursos: {}. Horario: {}.",
        teacher.name,
        teacher.department,
        teacher.courses.join(", "),
        teacher.schedule.join(", ")
    )
}

fn summarize_admin(admin: &AdminRecord) -> String {
    let formats = admin
        .formats
        .iter()
        .map(|f| format!("{} - Descarga: {}", f.name, f.url))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Administrativo: {}. Rol: {}. Formatos disponibles: {}.",
        admin.name, admin.role, formats
    )
}

fn summarize_schedule(directory: &Directory) -> String {
    format!(
        "Horarios generales: {}.",
        json!(directory.schedule_set(GENERAL_SCHEDULE))
    )
}
