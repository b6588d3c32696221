//! Plain-text extraction from PDF, DOCX and text files.

use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Bytes inspected for the `%PDF` signature.
const PDF_SIGNATURE_WINDOW: usize = 10;
const PDF_SIGNATURE: &[u8] = b"%PDF";

/// Archive member holding a DOCX body.
const DOCX_BODY: &str = "word/document.xml";

/// WordprocessingML main namespace.
const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    /// Anything else is read as text.
    Text,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("docx") => Self::Docx,
            _ => Self::Text,
        }
    }
}

/// Extract trimmed text from the file at `path`.
///
/// Fails with [`PipelineError::EmptyText`] when the document holds no text.
#[tracing::instrument]
pub fn extract_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| failed(path, e.to_string()))?;

    let text = match DocumentKind::from_path(path) {
        DocumentKind::Pdf => extract_pdf(path, &bytes)?,
        DocumentKind::Docx => extract_docx(path, &bytes)?,
        DocumentKind::Text => String::from_utf8_lossy(&bytes).into_owned(),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(PipelineError::EmptyText {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(chars = text.chars().count(), "text extracted");
    Ok(text.to_string())
}

fn failed(path: &Path, reason: impl Into<String>) -> PipelineError {
    PipelineError::Extraction {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
}

fn extract_pdf(path: &Path, bytes: &[u8]) -> Result<String> {
    let window = &bytes[..bytes.len().min(PDF_SIGNATURE_WINDOW)];
    if !window.windows(PDF_SIGNATURE.len()).any(|w| w == PDF_SIGNATURE) {
        return Err(failed(path, "missing %PDF signature"));
    }

    let document = lopdf::Document::load_mem(bytes).map_err(|e| failed(path, e.to_string()))?;

    let mut text = String::new();
    for page in document.get_pages().keys() {
        match document.extract_text(&[*page]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(page, error = %e, "page has no extractable text"),
        }
    }
    Ok(text)
}

fn extract_docx(path: &Path, bytes: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| failed(path, e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| failed(path, format!("{DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| failed(path, e.to_string()))?;

    let doc = roxmltree::Document::parse(&xml).map_err(|e| failed(path, e.to_string()))?;
    Ok(docx_paragraphs(&doc).join("\n"))
}

fn is_word(node: roxmltree::Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(WORD_NS)
}

/// Text of every `w:p`, with `w:tab` and `w:br` kept as whitespace.
fn docx_paragraphs(doc: &roxmltree::Document<'_>) -> Vec<String> {
    doc.descendants()
        .filter(|n| is_word(*n, "p"))
        .map(|p| {
            let mut text = String::new();
            for node in p.descendants() {
                if is_word(node, "t") {
                    text.push_str(node.text().unwrap_or_default());
                } else if is_word(node, "tab") {
                    text.push('\t');
                } else if is_word(node, "br") {
                    text.push('\n');
                }
            }
            text
        })
        .collect()
}
