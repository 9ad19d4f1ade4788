//! Explicit state for following recommendations from one package to the next

use serde::Serialize;

/// What the presentation layer remembers between lookups.
///
/// Selecting a recommendation does not look anything up itself; it hands
/// back the next query so the caller can run the lookup and recommendation
/// again and then [`ExploreSession::show`] the new results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExploreSession {
    current: Option<String>,
    similar: Vec<String>,
    history: Vec<String>,
}

impl ExploreSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) from a query typed by the user
    pub fn start<S: Into<String>>(&mut self, query: S) -> &str {
        let query = query.into();
        self.similar.clear();
        if let Some(previous) = self.current.replace(query) {
            self.history.push(previous);
        }
        self.current.as_deref().unwrap_or_default()
    }

    /// Record the recommendations shown for the current query
    pub fn show(&mut self, similar: Vec<String>) {
        self.similar = similar;
    }

    /// Pick a shown recommendation by 1-based position and make it the
    /// current query. Returns `None` when the position is out of range.
    pub fn select(&mut self, position: usize) -> Option<String> {
        let next = position
            .checked_sub(1)
            .and_then(|idx| self.similar.get(idx))
            .cloned()?;
        self.start(next.clone());
        Some(next)
    }

    /// Go back to the previous query, if any
    pub fn back(&mut self) -> Option<String> {
        let previous = self.history.pop()?;
        self.similar.clear();
        self.current = Some(previous.clone());
        Some(previous)
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn similar(&self) -> &[String] {
        &self.similar
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}
