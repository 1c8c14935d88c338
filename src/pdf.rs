use std::time::Duration;
use lopdf::Document;
use crate::article::{truncate_chars, FULL_TEXT_CHAR_LIMIT};
use crate::catalog::HTTP_CLIENT;
use crate::error::{AppError, Result};

pub const PDF_TIMEOUT: Duration = Duration::from_secs(60);
pub const MAX_PAGES: u32 = 10;

/// Downloads a PDF and returns the text of its first pages.
///
/// Any failure is logged and reported as `None`; a missing full text never
/// fails the surrounding fetch.
pub async fn extract_pdf_text(pdf_url: &str) -> Option<String> {
    match download_and_extract(pdf_url).await {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(pdf_url, error = %e, "failed to extract PDF text");
            None
        }
    }
}

async fn download_and_extract(pdf_url: &str) -> Result<String> {
    let response = HTTP_CLIENT
        .get(pdf_url)
        .timeout(PDF_TIMEOUT)
        .send()
        .await?
        .error_for_status()?;
    let bytes = response.bytes().await?;

    // lopdf is synchronous and CPU bound
    tokio::task::spawn_blocking(move || text_from_bytes(&bytes, MAX_PAGES))
        .await
        .map_err(|e| AppError::UpstreamFailure(format!("PDF extraction task failed: {}", e)))?
        .map(|text| cap_text(&text, FULL_TEXT_CHAR_LIMIT))
}

pub fn text_from_bytes(bytes: &[u8], max_pages: u32) -> Result<String> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| AppError::UpstreamFailure(format!("Unreadable PDF: {}", e)))?;

    let mut parts = Vec::new();
    for page in doc.get_pages().into_keys().take(max_pages as usize) {
        match doc.extract_text(&[page]) {
            Ok(text) => parts.push(text),
            Err(e) => tracing::debug!(page, error = %e, "skipping unreadable PDF page"),
        }
    }
    Ok(parts.join("\n"))
}

/// Caps `text` at `max_chars` characters, marking the cut with `...`.
pub fn cap_text(text: &str, max_chars: usize) -> String {
    let capped = truncate_chars(text, max_chars);
    if capped.len() < text.len() {
        format!("{}...", capped)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(cap_text("abc", 10), "abc");
    }

    #[test]
    fn long_text_is_capped_with_marker() {
        let text = "x".repeat(FULL_TEXT_CHAR_LIMIT + 5);
        let capped = cap_text(&text, FULL_TEXT_CHAR_LIMIT);
        assert_eq!(capped.chars().count(), FULL_TEXT_CHAR_LIMIT + 3);
        assert!(capped.ends_with("..."));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(text_from_bytes(b"definitely not a pdf", MAX_PAGES).is_err());
    }
}
