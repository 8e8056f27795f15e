//! Embedded PDF text using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use crate::error::SourceError;

/// Text layer of a PDF.
#[derive(Debug, Clone)]
pub struct PdfText {
    pub text: String,
    pub page_count: usize,
}

/// Load a PDF and pull its text layer.
///
/// Documents encrypted with an empty user password are decrypted first. A text
/// layer shorter than `min_text_length` means the PDF is a scan that needs an
/// OCR pass, which happens outside this crate.
pub fn extract_pdf_text(data: &[u8], min_text_length: usize) -> Result<PdfText, SourceError> {
    let mut doc = Document::load_mem(data).map_err(|e| SourceError::Parse(e.to_string()))?;

    let raw_data = if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(SourceError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| SourceError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
        decrypted
    } else {
        data.to_vec()
    };

    let page_count = doc.get_pages().len();
    if page_count == 0 {
        return Err(SourceError::NoPages);
    }

    let text = pdf_extract::extract_text_from_mem(&raw_data)
        .map_err(|e| SourceError::TextExtraction(e.to_string()))?;

    let text_len = text.trim().chars().count();
    debug!("PDF has {} pages and {} chars of text", page_count, text_len);
    if text_len < min_text_length {
        return Err(SourceError::Unsupported(format!(
            "scanned PDF ({} chars of text), run OCR first",
            text_len
        )));
    }

    Ok(PdfText { text, page_count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = extract_pdf_text(b"definitely not a pdf", 20).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
