use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// One support article: a short title matched against user messages and the
/// literal reply text returned when it matches.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub title: String,
    pub content: String,
}

/// Immutable document corpus, loaded once at startup from a JSON file and
/// shared read-only across all requests. File order is preserved; the
/// resolver picks the first matching entry.
#[derive(Debug)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Document corpus not found: {:?}", path);
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document corpus {:?}", path))?;

        let documents: Vec<Document> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed document corpus {:?}", path))?;

        // An empty title would match every message, so reject it at load.
        if let Some(pos) = documents.iter().position(|d| d.title.is_empty()) {
            anyhow::bail!(
                "Malformed document corpus {:?}: entry {} has an empty title",
                path,
                pos
            );
        }

        info!("Loaded {} documents from {:?}", documents.len(), path);

        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_corpus(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_preserves_file_order() {
        let file = write_corpus(
            r#"[
                {"title": "refund policy", "content": "Refunds within 30 days."},
                {"title": "shipping", "content": "3-5 business days."}
            ]"#,
        );

        let store = DocumentStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.documents()[0].title, "refund policy");
        assert_eq!(store.documents()[1].title, "shipping");
    }

    #[test]
    fn load_fails_on_missing_file() {
        let err = DocumentStore::load(Path::new("/nonexistent/docs.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn load_fails_on_malformed_json() {
        let file = write_corpus("{ not json");
        assert!(DocumentStore::load(file.path()).is_err());
    }

    #[test]
    fn load_rejects_empty_title() {
        let file = write_corpus(r#"[{"title": "", "content": "wildcard"}]"#);
        let err = DocumentStore::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty title"));
    }
}
