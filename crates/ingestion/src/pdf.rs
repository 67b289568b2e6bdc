//! PDF text extraction module
//!
//! Extracts normalized text, a title guess and the page count from PDF
//! bytes using lopdf. Extraction never fails: a corrupt or text-free file
//! yields empty text and the caller decides what that means.

use lopdf::{Document, Object};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::{debug, warn};

/// Minimum length (exclusive) of an acceptable title
const MIN_TITLE_CHARS: usize = 3;

/// Fallback titles taken from the body are cut to this many characters
const MAX_TITLE_CHARS: usize = 100;

/// Hyphen, optional blanks, a line break and any indentation after it
static RE_HYPHEN_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"-[ \t]*\r?\n\s*").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Output of [`extract`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Normalized full text; empty when nothing could be read
    pub text: String,
    pub title_guess: Option<String>,
    /// Page count when the document could be parsed
    pub page_count: Option<usize>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Extract text and a title guess from PDF bytes
pub fn extract(bytes: &[u8]) -> Extraction {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, size = bytes.len(), "Failed to load PDF");
            return Extraction::default();
        }
    };

    let pages = doc.get_pages();
    debug!(page_count = pages.len(), "Extracting text from PDF");

    let mut parts = Vec::with_capacity(pages.len());
    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) if !page_text.trim().is_empty() => parts.push(page_text),
            Ok(_) => {}
            Err(e) => {
                warn!(page = page_num, error = %e, "Failed to extract text from page, skipping");
            }
        }
    }

    let raw = parts.join("\n");
    let text = normalize_text(&raw);

    let title_guess = if text.is_empty() {
        None
    } else {
        metadata_title(&doc).or_else(|| title_from_text(&text))
    };

    debug!(
        raw_len = raw.len(),
        text_len = text.len(),
        has_title = title_guess.is_some(),
        "Text extraction complete"
    );

    Extraction {
        text,
        title_guess,
        page_count: Some(pages.len()),
    }
}

/// Join words hyphenated across line breaks, then collapse whitespace
pub fn normalize_text(raw: &str) -> String {
    let joined = RE_HYPHEN_BREAK.replace_all(raw, "");
    RE_WHITESPACE.replace_all(&joined, " ").trim().to_string()
}

/// `Title` entry of the document information dictionary. Either the
/// dictionary or the title itself may be an indirect object.
fn metadata_title(doc: &Document) -> Option<String> {
    let (_, info) = doc.dereference(doc.trailer.get(b"Info").ok()?).ok()?;
    let (_, title) = doc.dereference(info.as_dict().ok()?.get(b"Title").ok()?).ok()?;

    let raw = match title {
        Object::String(bytes, _) => decode_pdf_text(bytes),
        _ => return None,
    };

    let title = raw.trim();
    (title.chars().count() > MIN_TITLE_CHARS).then(|| title.to_string())
}

/// First line-like segment of the text that looks like a title
fn title_from_text(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| {
            line.chars().count() > MIN_TITLE_CHARS && !line.chars().all(|c| c.is_ascii_digit())
        })
        .map(|line| line.chars().take(MAX_TITLE_CHARS).collect())
}

/// Decode a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1
fn decode_pdf_text(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::PdfBuilder;

    #[test]
    fn test_normalize_text() {
        let input = "Hello   World\n\nTest";
        assert_eq!(normalize_text(input), "Hello World Test");
    }

    #[test]
    fn test_dehyphenation() {
        assert_eq!(normalize_text("sign lan-\n   guage retrieval"), "sign language retrieval");
        assert_eq!(normalize_text("contras- \r\ntive"), "contrastive");
        // A hyphen inside a line is kept
        assert_eq!(normalize_text("text-to-sign-video"), "text-to-sign-video");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(normalize_text(" \n\t \n"), "");
    }

    #[test]
    fn test_title_from_text() {
        assert_eq!(title_from_text("12345"), None);
        assert_eq!(title_from_text("abc"), None);
        assert_eq!(title_from_text("Deep Nets").as_deref(), Some("Deep Nets"));

        let long = "x".repeat(250);
        assert_eq!(title_from_text(&long).map(|t| t.chars().count()), Some(100));
    }

    #[test]
    fn test_decode_pdf_text() {
        assert_eq!(decode_pdf_text(b"Plain title"), "Plain title");
        assert_eq!(decode_pdf_text(&[0xFE, 0xFF, 0x00, 0x43, 0x00, 0x69]), "Ci");
        assert_eq!(decode_pdf_text(&[0x43, 0xE9]), "C\u{e9}");
    }

    #[test]
    fn test_extract_prefers_metadata_title() {
        let bytes = PdfBuilder::new()
            .title("Sign Language Retrieval Survey")
            .page(&["An overview of retrieval methods"])
            .build();

        let extraction = extract(&bytes);
        assert_eq!(extraction.title_guess.as_deref(), Some("Sign Language Retrieval Survey"));
        assert!(extraction.text.contains("retrieval methods"));
        assert_eq!(extraction.page_count, Some(1));
    }

    #[test]
    fn test_extract_follows_indirect_metadata_title() {
        let bytes = PdfBuilder::new()
            .title("Indirect Metadata Title")
            .indirect_title()
            .page(&["1", "body"])
            .build();

        let extraction = extract(&bytes);
        assert_eq!(extraction.title_guess.as_deref(), Some("Indirect Metadata Title"));
        assert_eq!(extraction.text, "1 body");
    }

    #[test]
    fn test_extract_falls_back_to_text_title() {
        let bytes = PdfBuilder::new()
            .title("abc")
            .page(&["Graph Neural Networks for Chemistry"])
            .build();

        let extraction = extract(&bytes);
        assert_eq!(
            extraction.title_guess.as_deref(),
            Some("Graph Neural Networks for Chemistry")
        );
    }

    #[test]
    fn test_extract_joins_pages_in_order() {
        let bytes = PdfBuilder::new()
            .page(&["first page"])
            .page(&["second page"])
            .build();

        let extraction = extract(&bytes);
        assert_eq!(extraction.page_count, Some(2));
        let first = extraction.text.find("first").unwrap();
        let second = extraction.text.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_extract_garbage_is_empty() {
        let extraction = extract(b"definitely not a pdf");
        assert!(extraction.is_empty());
        assert!(extraction.title_guess.is_none());
        assert!(extraction.page_count.is_none());
    }

    #[test]
    fn test_extract_blank_pages_is_empty() {
        let bytes = PdfBuilder::new().title("Has Metadata").page(&[]).build();
        let extraction = extract(&bytes);
        assert!(extraction.is_empty());
        assert!(extraction.title_guess.is_none());
    }
}
