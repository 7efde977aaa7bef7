//! Text document loading from a source directory.

use std::path::{Path, PathBuf};

use crate::error::{RagError, Result};
use crate::types::Document;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl TextLoader {
    #[must_use]
    pub fn supported_extensions(&self) -> &[&str] {
        SUPPORTED_EXTENSIONS
    }

    /// Load every supported file in `dir` as one `Document` each, in
    /// file-name order. Non-recursive; `source` is the path display string.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoDocuments`] when no file matches a supported
    /// extension, and fails the whole run on the first unreadable or
    /// oversized file; a partially loaded corpus is never returned.
    pub async fn load_dir(&self, dir: &Path) -> Result<Vec<Document>> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| load_err(dir, e))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| load_err(dir, e))? {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if path.is_file() && SUPPORTED_EXTENSIONS.contains(&ext) {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(RagError::NoDocuments(dir.to_path_buf()));
        }

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let meta = tokio::fs::metadata(&path)
                .await
                .map_err(|e| load_err(&path, e))?;
            if meta.len() > self.max_file_size {
                return Err(RagError::FileTooLarge {
                    path,
                    size: meta.len(),
                });
            }

            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| load_err(&path, e))?;
            tracing::debug!(path = %path.display(), bytes = content.len(), "loaded document");

            documents.push(Document {
                content,
                source: path.display().to_string(),
            });
        }

        Ok(documents)
    }
}

fn load_err(path: &Path, source: std::io::Error) -> RagError {
    RagError::DocumentLoad {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_text_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "second").unwrap();
        std::fs::write(dir.path().join("a.txt"), "first").unwrap();

        let docs = TextLoader::default().load_dir(dir.path()).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "first");
        assert_eq!(docs[1].content, "second");
    }

    #[tokio::test]
    async fn source_is_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "data").unwrap();

        let docs = TextLoader::default().load_dir(dir.path()).await.unwrap();
        assert_eq!(docs[0].source, file.display().to_string());
    }

    #[tokio::test]
    async fn unsupported_extensions_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("keep.md"), "kept").unwrap();
        std::fs::write(dir.path().join("skip.csv"), "a,b").unwrap();
        std::fs::write(dir.path().join("skip.bin"), [0u8, 1]).unwrap();

        let docs = TextLoader::default().load_dir(dir.path()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "kept");
    }

    #[tokio::test]
    async fn empty_dir_is_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        let err = TextLoader::default().load_dir(dir.path()).await.unwrap_err();
        assert!(matches!(err, RagError::NoDocuments(_)));
    }

    #[tokio::test]
    async fn only_unsupported_files_is_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.csv"), "a,b").unwrap();
        let err = TextLoader::default().load_dir(dir.path()).await.unwrap_err();
        assert!(matches!(err, RagError::NoDocuments(_)));
    }

    #[tokio::test]
    async fn missing_dir_is_document_load_error() {
        let err = TextLoader::default()
            .load_dir(Path::new("/nonexistent/corpus"))
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::DocumentLoad { .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_fails_whole_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "fine").unwrap();
        std::fs::write(dir.path().join("bad.txt"), [0xff, 0xfe, 0x00]).unwrap();

        let err = TextLoader::default().load_dir(dir.path()).await.unwrap_err();
        match err {
            RagError::DocumentLoad { path, .. } => {
                assert!(path.ends_with("bad.txt"));
            }
            other => panic!("expected DocumentLoad, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn file_over_size_cap_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.txt"), "xx").unwrap();

        let loader = TextLoader { max_file_size: 1 };
        let err = loader.load_dir(dir.path()).await.unwrap_err();
        assert!(matches!(err, RagError::FileTooLarge { size: 2, .. }));
    }

    #[tokio::test]
    async fn subdirectories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();
        std::fs::write(dir.path().join("flat.txt"), "flat").unwrap();

        let docs = TextLoader::default().load_dir(dir.path()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "flat");
    }
}
