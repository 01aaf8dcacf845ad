//! The markdown knowledge base.
//!
//! Every `*.md` document in the knowledge directory is concatenated into one
//! string at startup. Each document is preceded by a `---` separator line and
//! its file name, so the model can still tell where one ends and the next
//! begins. Documents are read in file-name order.

use crate::error::KnowledgeError;
use std::path::Path;

/// Number of characters of the knowledge base included in a prompt.
pub const DEFAULT_SNIPPET_CHARS: usize = 2000;

/// Concatenated knowledge documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    text: String,
    documents: usize,
}

impl KnowledgeBase {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a knowledge base from `(file name, contents)` pairs, in order.
    pub fn from_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut kb = Self::empty();
        for (name, contents) in documents {
            kb.push(name, contents);
        }
        kb
    }

    /// Reads every markdown document in `dir`.
    ///
    /// A missing directory yields an empty knowledge base; any other read
    /// failure is an error.
    pub fn load(dir: &Path) -> Result<Self, KnowledgeError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %dir.display(),
                    "knowledge directory not found, starting with an empty knowledge base"
                );
                return Ok(Self::empty());
            }
            Err(source) => {
                return Err(KnowledgeError::ReadDir {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| KnowledgeError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".md") && path.is_file() {
                files.push((name, path));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut kb = Self::empty();
        for (name, path) in files {
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| KnowledgeError::ReadDocument { path, source })?;
            kb.push(&name, &contents);
        }

        tracing::info!(
            path = %dir.display(),
            documents = kb.documents,
            chars = kb.text.chars().count(),
            "loaded knowledge base"
        );
        Ok(kb)
    }

    fn push(&mut self, name: &str, contents: &str) {
        self.text.push_str("\n\n---\n");
        self.text.push_str(name);
        self.text.push_str(":\n");
        self.text.push_str(contents);
        self.documents += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn document_count(&self) -> usize {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns at most the first `max_chars` characters.
    pub fn snippet(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }
}
