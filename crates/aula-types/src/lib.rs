//! Shared types for the Aula assistant.
//!
//! This crate holds the data model every other crate speaks: the talking-head
//! [`ChatMessage`] returned to clients, the expression and animation tags the
//! avatar understands, and the directory records describing students,
//! teachers and administrative staff.
//!
//! It has no I/O and no behavior beyond (de)serialization and display, so any
//! crate in the workspace can depend on it without pulling in a runtime.

pub mod directory;
pub mod message;

pub use directory::{
    AdminRecord, Directory, DirectoryRecord, DownloadFormat, ScheduleEntry, StudentRecord,
    TeacherRecord,
};
pub use message::{Animation, ChatMessage, DraftMessage, FacialExpression, MAX_MESSAGES};
