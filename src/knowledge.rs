//! Business knowledge the assistant answers from
//!
//! A plain-text summary plus an optional supplementary document whose text
//! is extracted through a [`DocumentExtractor`]. Missing files and failed
//! extraction both degrade to empty text.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SUMMARY_FILE: &str = "business_summary.txt";
pub const SUPPLEMENT_FILE: &str = "about_business.pdf";

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to extract text from {}: {message}", path.display())]
    Extract { path: PathBuf, message: String },
}

/// Turns a document on disk into plain text
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, KnowledgeError>;
}

/// PDF text extraction, one page after another
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl DocumentExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String, KnowledgeError> {
        let extract_err = |message: String| KnowledgeError::Extract {
            path: path.to_path_buf(),
            message,
        };

        let document = lopdf::Document::load(path).map_err(|e| extract_err(e.to_string()))?;
        let mut pages = Vec::new();
        for page_number in document.get_pages().keys() {
            let text = document
                .extract_text(&[*page_number])
                .map_err(|e| extract_err(e.to_string()))?;
            pages.push(text);
        }
        Ok(pages.join("\n").trim().to_string())
    }
}

/// The extractor compiled into this build, if any
pub fn default_extractor() -> Option<&'static dyn DocumentExtractor> {
    #[cfg(feature = "pdf")]
    {
        static PDF: PdfExtractor = PdfExtractor;
        Some(&PDF)
    }
    #[cfg(not(feature = "pdf"))]
    {
        None
    }
}

/// Summary text and supplementary text joined by a blank line, skipping
/// empty parts.
pub fn load_business_context(
    txt_path: &Path,
    supplement_path: &Path,
    extractor: Option<&dyn DocumentExtractor>,
) -> String {
    let summary = match read_text(txt_path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Business summary unreadable");
            String::new()
        }
    };
    let supplement = extract_supplement(supplement_path, extractor);

    [summary, supplement]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

/// Load both knowledge files from a directory
pub fn load_from_dir(dir: &Path, extractor: Option<&dyn DocumentExtractor>) -> String {
    load_business_context(&dir.join(SUMMARY_FILE), &dir.join(SUPPLEMENT_FILE), extractor)
}

fn read_text(path: &Path) -> Result<String, KnowledgeError> {
    if !path.exists() {
        return Ok(String::new());
    }
    std::fs::read_to_string(path).map_err(|source| KnowledgeError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn extract_supplement(path: &Path, extractor: Option<&dyn DocumentExtractor>) -> String {
    let Some(extractor) = extractor else {
        tracing::debug!(path = %path.display(), "No document extractor available");
        return String::new();
    };
    if !path.exists() {
        return String::new();
    }
    match extractor.extract(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Supplementary document skipped");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedExtractor(&'static str);

    impl DocumentExtractor for FixedExtractor {
        fn extract(&self, _path: &Path) -> Result<String, KnowledgeError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingExtractor;

    impl DocumentExtractor for FailingExtractor {
        fn extract(&self, path: &Path) -> Result<String, KnowledgeError> {
            Err(KnowledgeError::Extract {
                path: path.to_path_buf(),
                message: "encrypted".to_string(),
            })
        }
    }

    fn knowledge_dir(summary: Option<&str>, supplement: bool) -> TempDir {
        let dir = TempDir::new().unwrap();
        if let Some(text) = summary {
            std::fs::write(dir.path().join(SUMMARY_FILE), text).unwrap();
        }
        if supplement {
            std::fs::write(dir.path().join(SUPPLEMENT_FILE), b"%PDF-1.4").unwrap();
        }
        dir
    }

    #[test]
    fn test_neither_file_is_empty() {
        let dir = knowledge_dir(None, false);
        assert_eq!(load_from_dir(dir.path(), Some(&FixedExtractor("unused"))), "");
    }

    #[test]
    fn test_summary_only() {
        let dir = knowledge_dir(Some("Open 9-5.\n"), false);
        assert_eq!(load_from_dir(dir.path(), Some(&FixedExtractor("unused"))), "Open 9-5.");
    }

    #[test]
    fn test_summary_and_supplement_joined() {
        let dir = knowledge_dir(Some("Open 9-5."), true);
        assert_eq!(
            load_from_dir(dir.path(), Some(&FixedExtractor("Three locations."))),
            "Open 9-5.\n\nThree locations."
        );
    }

    #[test]
    fn test_supplement_only() {
        let dir = knowledge_dir(None, true);
        assert_eq!(
            load_from_dir(dir.path(), Some(&FixedExtractor("Three locations."))),
            "Three locations."
        );
    }

    #[test]
    fn test_no_extractor_skips_supplement() {
        let dir = knowledge_dir(Some("Open 9-5."), true);
        assert_eq!(load_from_dir(dir.path(), None), "Open 9-5.");
    }

    #[test]
    fn test_extraction_failure_degrades() {
        let dir = knowledge_dir(Some("Open 9-5."), true);
        assert_eq!(load_from_dir(dir.path(), Some(&FailingExtractor)), "Open 9-5.");
    }

    #[test]
    fn test_empty_extraction_not_joined() {
        let dir = knowledge_dir(Some("Open 9-5."), true);
        assert_eq!(load_from_dir(dir.path(), Some(&FixedExtractor(""))), "Open 9-5.");
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_pdf_extractor_rejects_garbage() {
        let dir = knowledge_dir(None, true);
        let err = PdfExtractor
            .extract(&dir.path().join(SUPPLEMENT_FILE))
            .unwrap_err();
        assert!(matches!(err, KnowledgeError::Extract { .. }));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_default_extractor_present() {
        assert!(default_extractor().is_some());
    }
}
