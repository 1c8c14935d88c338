use serde::{Deserialize, Serialize};
use crate::error::{AppError, Result};

/// Upper bound on the characters of full text ever forwarded to the model.
pub const FULL_TEXT_CHAR_LIMIT: usize = 50_000;

/// An article submitted for analysis.
///
/// Extra catalog fields (authors, pdf_url, ...) are tolerated on input so a
/// fetched article can be posted back as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub arxiv_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Article {
    pub fn new(
        arxiv_id: impl Into<String>,
        title: impl Into<String>,
        abstract_text: impl Into<String>,
    ) -> Self {
        Self {
            arxiv_id: arxiv_id.into(),
            title: title.into(),
            abstract_text: abstract_text.into(),
            full_text: None,
            categories: Vec::new(),
        }
    }

    pub fn with_full_text(mut self, full_text: impl Into<String>) -> Self {
        self.full_text = Some(full_text.into());
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Rejects articles without a title or abstract.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.abstract_text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Title and abstract are required".to_string(),
            ));
        }
        Ok(())
    }

    /// Full text cut to [`FULL_TEXT_CHAR_LIMIT`] characters.
    pub fn full_text_excerpt(&self) -> Option<&str> {
        self.full_text
            .as_deref()
            .map(|text| truncate_chars(text, FULL_TEXT_CHAR_LIMIT))
    }
}

/// Returns the prefix of `text` holding at most `limit` characters.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
