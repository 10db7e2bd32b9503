//! Plain-text document loading.
//!
//! Binary formats (PDF/DOCX) need an external extraction service and are
//! out of scope here; only plain Markdown and text files are accepted.

use std::path::Path;

use docreview_shared::{DocReviewError, Result};

/// Extensions accepted as plain text.
const TEXT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Read a document file as UTF-8 text.
pub fn load_document(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(DocReviewError::validation(format!(
            "unsupported document format {:?}: only plain text ({}) is supported",
            path.file_name().unwrap_or_default(),
            TEXT_EXTENSIONS.join(", ")
        )));
    }

    let bytes = std::fs::read(path).map_err(|e| DocReviewError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_markdown_files() {
        let dir = std::env::temp_dir();
        let path = dir.join("docreview_test_doc.md");
        std::fs::write(&path, "# Title\n\nbody").unwrap();
        let text = load_document(&path).expect("load");
        assert_eq!(text, "# Title\n\nbody");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rejects_unsupported_extensions() {
        let err = load_document(Path::new("report.pdf")).expect_err("rejected");
        assert!(matches!(err, DocReviewError::Validation { .. }));
        assert!(err.to_string().contains("unsupported document format"));
    }

    #[test]
    fn rejects_missing_extension() {
        assert!(load_document(Path::new("README")).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_document(Path::new("/nonexistent/doc.md")).expect_err("io error");
        assert!(matches!(err, DocReviewError::Io { .. }));
    }
}
