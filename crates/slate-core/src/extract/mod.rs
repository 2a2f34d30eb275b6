//! Script text extraction.
//!
//! Turns uploaded bytes into plain script text. PDF input runs through a
//! fixed-priority chain of extraction strategies; the first strategy whose
//! output is non-trivial and looks like a screenplay wins. Strategy outputs
//! are never blended.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ServerError;

static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());
static GLUED_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static HEADINGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(INT\.|EXT\.)").unwrap());
static TRANSITIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(FADE IN:|FADE OUT:|CUT TO:)").unwrap());

/// Structural screenplay markers, checked independently.
static SCRIPT_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(INT\.|EXT\.)",  // scene headings
        r"(?i)FADE IN:",       // script opening
        r"(?i)FADE OUT:",      // script ending
        r"[A-Z]{2,}\s*\n",     // character cues
        r"\([^)]+\)",          // parentheticals
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Text,
}

/// File extensions accepted by the upload endpoint.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".txt", ".fountain"];

/// Map a filename to its source kind, rejecting unsupported extensions.
pub fn source_kind(filename: &str) -> Result<SourceKind, ServerError> {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        Ok(SourceKind::Pdf)
    } else if lower.ends_with(".txt") || lower.ends_with(".fountain") {
        Ok(SourceKind::Text)
    } else {
        Err(ServerError::UnsupportedFile(format!(
            "'{}'. Allowed: {}",
            filename,
            ALLOWED_EXTENSIONS.join(", ")
        )))
    }
}

/// Extract script text from uploaded bytes.
pub fn extract_script_text(bytes: &[u8], kind: SourceKind) -> Result<String, ServerError> {
    let text = match kind {
        SourceKind::Pdf => extract_pdf_text(bytes)?,
        SourceKind::Text => decode_text(bytes),
    };

    if text.trim().chars().count() < 10 {
        return Err(ServerError::Extraction(
            "Extracted content is too short or empty".to_string(),
        ));
    }

    Ok(text)
}

/// Run the PDF strategy chain: `pdf-extract` first, then a per-page `lopdf`
/// pass. Each output must survive `looks_like_script` before it is accepted.
fn extract_pdf_text(bytes: &[u8]) -> Result<String, ServerError> {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) if accepts(&text) => return Ok(clean_extracted_text(&text)),
        Ok(_) => tracing::warn!("pdf-extract output rejected by script validation"),
        Err(e) => tracing::warn!("pdf-extract failed: {}", e),
    }

    match extract_with_lopdf(bytes) {
        Ok(text) if accepts(&text) => return Ok(clean_extracted_text(&text)),
        Ok(_) => tracing::warn!("lopdf output rejected by script validation"),
        Err(e) => tracing::warn!("lopdf extraction failed: {}", e),
    }

    Err(ServerError::Extraction(
        "Could not extract readable script text from PDF".to_string(),
    ))
}

fn accepts(text: &str) -> bool {
    text.trim().len() > 100 && looks_like_script(text)
}

/// Per-page extraction so a single corrupt page does not sink the document.
fn extract_with_lopdf(bytes: &[u8]) -> Result<String, String> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;
    let mut pages_text = Vec::new();

    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(text) if !text.trim().is_empty() => pages_text.push(text),
            Ok(_) => {}
            Err(e) => tracing::warn!("Error extracting page {}: {}", page_num, e),
        }
    }

    if pages_text.is_empty() {
        return Err("no text on any page".to_string());
    }
    Ok(pages_text.join("\n"))
}

fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Normalise extracted text and put scene headings back on their own lines.
pub fn clean_extracted_text(text: &str) -> String {
    let text = BLANK_RUNS.replace_all(text, "\n\n");
    let text = GLUED_LINES.replace_all(&text, "$1\n$2");
    let text = SPACES.replace_all(&text, " ");
    let text = HEADINGS.replace_all(&text, "\n$1");
    let text = TRANSITIONS.replace_all(&text, "\n$1");

    text.trim().to_string()
}

/// Minimal "looks like a screenplay" check: at least two structural markers.
pub fn looks_like_script(text: &str) -> bool {
    let matches = SCRIPT_INDICATORS
        .iter()
        .filter(|pattern| pattern.is_match(text))
        .count();

    matches >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "FADE IN:\n\nINT. KITCHEN - DAY\n\nJOHN\n(whispering)\nWe need to go.\n";

    #[test]
    fn test_source_kind() {
        assert_eq!(source_kind("script.pdf").unwrap(), SourceKind::Pdf);
        assert_eq!(source_kind("Script.TXT").unwrap(), SourceKind::Text);
        assert_eq!(source_kind("draft.fountain").unwrap(), SourceKind::Text);
        assert!(matches!(
            source_kind("notes.docx"),
            Err(ServerError::UnsupportedFile(_))
        ));
    }

    #[test]
    fn test_looks_like_script() {
        assert!(looks_like_script(SAMPLE));
        assert!(!looks_like_script("just some prose without structure"));
    }

    #[test]
    fn test_extract_text_too_short() {
        let err = extract_script_text(b"hi", SourceKind::Text).unwrap_err();
        assert!(matches!(err, ServerError::Extraction(_)));
    }

    #[test]
    fn test_extract_plain_text_passthrough() {
        let text = extract_script_text(SAMPLE.as_bytes(), SourceKind::Text).unwrap();
        assert_eq!(text, SAMPLE);
    }

    #[test]
    fn test_clean_puts_headings_on_own_lines() {
        let cleaned = clean_extracted_text("some action CUT TO: INT. HALLWAY - NIGHT");
        assert!(cleaned.contains("\nCUT TO:"));
        assert!(cleaned.contains("\nINT. HALLWAY"));
    }
}
