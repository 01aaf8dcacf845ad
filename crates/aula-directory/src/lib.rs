//! The assistant's local knowledge: the university directory, the markdown
//! knowledge base, and the resolver that turns a free-text question into a
//! directory summary.
//!
//! Everything here is loaded once at startup and read concurrently by every
//! request afterwards; none of it is mutated after construction.

pub mod error;
pub mod knowledge;
pub mod resolver;
pub mod store;

pub use error::{DirectoryError, KnowledgeError};
pub use knowledge::{KnowledgeBase, DEFAULT_SNIPPET_CHARS};
pub use resolver::{resolve, EntityCategory, Resolution};
pub use store::{default_directory, load_directory, parse_directory};
