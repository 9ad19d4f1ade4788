//! Utility functions for the package finder application

use crate::error::{PyLibFinderError, Result};
use std::time::Duration;

/// Longest package name accepted before hitting the registry
pub const MAX_PACKAGE_NAME_LEN: usize = 128;

/// Check that a name is a plausible PyPI project name.
///
/// Case is preserved and nothing is normalized; this only rejects input that
/// could never name a project (and would otherwise be spliced into a URL).
pub fn validate_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PyLibFinderError::InvalidPackageName(
            name.to_string(),
            "Package name cannot be empty",
        ));
    }

    if name.len() > MAX_PACKAGE_NAME_LEN {
        return Err(PyLibFinderError::InvalidPackageName(
            name.to_string(),
            "Package name cannot be longer than 128 characters",
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(PyLibFinderError::InvalidPackageName(
            name.to_string(),
            "Only ASCII letters, digits, '-', '_' and '.' are allowed",
        ));
    }

    let edges_ok = name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.ends_with(|c: char| c.is_ascii_alphanumeric());
    if !edges_ok {
        return Err(PyLibFinderError::InvalidPackageName(
            name.to_string(),
            "Names must start and end with a letter or digit",
        ));
    }

    Ok(())
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a timeout string (e.g., "30", "30s", "2m", "1h")
pub fn parse_timeout(input: &str) -> Result<Duration> {
    let input = input.trim().to_lowercase();

    let (digits, multiplier) = match input.char_indices().last() {
        Some((idx, 's')) => (&input[..idx], 1),
        Some((idx, 'm')) => (&input[..idx], 60),
        Some((idx, 'h')) => (&input[..idx], 3600),
        _ => (input.as_str(), 1),
    };

    digits
        .parse::<u64>()
        .ok()
        .filter(|value| *value > 0)
        .map(|value| Duration::from_secs(value * multiplier))
        .ok_or_else(|| {
            PyLibFinderError::ValidationError(format!(
                "Invalid timeout format: '{}'. Use formats like '30s', '5m', '1h'",
                input
            ))
        })
}
