//! Keyword to package resolution

use async_trait::async_trait;

/// Resolves a single keyword to at most one candidate package.
///
/// Implementations must not fail: anything that goes wrong resolves to `None`.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, keyword: &str) -> Option<String>;
}

/// Static keyword table standing in for full-text registry search.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordTableResolver;

impl KeywordTableResolver {
    /// Keyword spellings (lowercase) and the package each resolves to
    pub const TABLE: &'static [(&'static str, &'static str)] = &[
        ("web", "flask"),
        ("data", "pandas"),
        ("ml", "scikit-learn"),
        ("machine learning", "scikit-learn"),
    ];

    pub fn new() -> Self {
        Self
    }

    /// Synchronous lookup used by the async implementation
    pub fn lookup(keyword: &str) -> Option<&'static str> {
        let keyword = keyword.to_lowercase();
        Self::TABLE
            .iter()
            .find(|(k, _)| *k == keyword)
            .map(|(_, package)| *package)
    }
}

#[async_trait]
impl Resolver for KeywordTableResolver {
    async fn resolve(&self, keyword: &str) -> Option<String> {
        Self::lookup(keyword).map(str::to_string)
    }
}
