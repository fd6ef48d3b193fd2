use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// The résumé text embedded in every prompt. Cloning shares the same buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct KnowledgeDocument(Arc<str>);

impl KnowledgeDocument {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    /// Load the document from a text file supplied at startup
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read résumé from {}", path.display()))?;

        if text.trim().is_empty() {
            return Err(anyhow!("Résumé file {} is empty", path.display()));
        }

        Ok(Self::new(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Résumés can be long; keep debug output readable.
impl fmt::Debug for KnowledgeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnowledgeDocument")
            .field("len", &self.0.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_reads_file_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Jane Doe\nRust engineer, 7 years\n").unwrap();

        let doc = KnowledgeDocument::load(file.path()).unwrap();
        assert_eq!(doc.as_str(), "Jane Doe\nRust engineer, 7 years\n");
    }

    #[test]
    fn test_load_rejects_blank_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "  \n\t").unwrap();

        let err = KnowledgeDocument::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.md");

        let err = KnowledgeDocument::load(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.md"));
    }

    #[test]
    fn test_clone_shares_buffer() {
        let doc = KnowledgeDocument::new("resume");
        let copy = doc.clone();
        assert!(std::ptr::eq(doc.as_str(), copy.as_str()));
    }
}
