//! Keyword extraction from package metadata

use crate::types::{KeywordField, PackageMetadata};
use crate::MAX_KEYWORDS;

/// Extract up to [`MAX_KEYWORDS`] keywords in order of appearance.
pub fn extract_keywords(metadata: &PackageMetadata) -> Vec<String> {
    extract_keywords_capped(metadata, MAX_KEYWORDS)
}

/// Like [`extract_keywords`] with an explicit cap.
///
/// Tokens are taken verbatim: no case folding, no stop words.
pub fn extract_keywords_capped(metadata: &PackageMetadata, cap: usize) -> Vec<String> {
    match &metadata.keywords {
        None => Vec::new(),
        Some(KeywordField::Text(text)) => text
            .split_whitespace()
            .take(cap)
            .map(str::to_string)
            .collect(),
        Some(KeywordField::List(items)) => items
            .iter()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .take(cap)
            .map(str::to_string)
            .collect(),
    }
}
