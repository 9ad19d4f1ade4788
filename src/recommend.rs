//! Similar-package recommendation engine
//!
//! Recommendations are tried in three tiers, stopping at the first one that
//! yields anything:
//!
//! 1. keywords from the package metadata, each resolved to a candidate
//!    package by the configured [`Resolver`];
//! 2. the representative list of the category the name classifies into;
//! 3. a shuffled sample across every category.
//!
//! The result never contains the queried name, never repeats an entry and
//! never exceeds the configured maximum (5 by default).

use crate::category::{all_packages, classify};
use crate::client::Registry;
use crate::config::RecommendationConfig;
use crate::keywords::extract_keywords_capped;
use crate::resolver::{KeywordTableResolver, Resolver};
use crate::types::PackageMetadata;
use crate::{MAX_KEYWORDS, MAX_RECOMMENDATIONS};
use futures_util::future::join_all;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Produces ordered lists of packages similar to a queried one
#[derive(Clone)]
pub struct Recommender {
    registry: Arc<dyn Registry>,
    resolver: Arc<dyn Resolver>,
    settings: RecommendationConfig,
}

impl Recommender {
    /// Engine with the default keyword table resolver
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self::with_resolver(registry, Arc::new(KeywordTableResolver::new()))
    }

    pub fn with_resolver(registry: Arc<dyn Registry>, resolver: Arc<dyn Resolver>) -> Self {
        Self {
            registry,
            resolver,
            settings: RecommendationConfig::default(),
        }
    }

    /// Override keyword cap, result cap and resolver concurrency. The caps
    /// never rise above [`MAX_KEYWORDS`] and [`MAX_RECOMMENDATIONS`].
    pub fn with_settings(mut self, settings: RecommendationConfig) -> Self {
        self.settings = RecommendationConfig {
            max_keywords: settings.max_keywords.min(MAX_KEYWORDS),
            max_results: settings.max_results.min(MAX_RECOMMENDATIONS),
            concurrency: settings.concurrency,
        };
        self
    }

    pub fn settings(&self) -> &RecommendationConfig {
        &self.settings
    }

    /// Recommend packages similar to `queried_name`.
    ///
    /// Looks the package up first; when the lookup fails or the package does
    /// not exist, nothing is recommended.
    pub async fn recommend(&self, queried_name: &str) -> Vec<String> {
        let metadata = match self.registry.lookup(queried_name).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                debug!("No metadata for '{}', skipping recommendations", queried_name);
                return Vec::new();
            }
            Err(e) => {
                warn!("Metadata lookup for '{}' failed: {}", queried_name, e);
                return Vec::new();
            }
        };

        self.recommend_with_metadata(queried_name, &metadata).await
    }

    /// Recommend from metadata the caller already fetched.
    pub async fn recommend_with_metadata(
        &self,
        queried_name: &str,
        metadata: &PackageMetadata,
    ) -> Vec<String> {
        let keywords = extract_keywords_capped(metadata, self.settings.max_keywords);

        if !keywords.is_empty() {
            debug!("Resolving keywords {:?} for '{}'", keywords, queried_name);
            let resolved = self.resolve_keywords(keywords).await;
            let picks = unique_excluding(
                resolved.into_iter().flatten(),
                queried_name,
                self.settings.max_results,
            );

            if !picks.is_empty() {
                debug!(
                    "Keyword recommendations for '{}': {:?}",
                    queried_name, picks
                );
                return picks;
            }
        }

        self.fallback(queried_name)
    }

    /// Category-table recommendations, used when keywords yield nothing.
    pub fn fallback(&self, queried_name: &str) -> Vec<String> {
        let limit = self.settings.max_results;

        match classify(queried_name) {
            Some(category) => {
                debug!("'{}' classified as {}", queried_name, category);
                unique_excluding(category.packages().iter().copied(), queried_name, limit)
            }
            None => {
                debug!("'{}' is unclassified, sampling all categories", queried_name);
                let mut pool: Vec<&str> = all_packages().collect();
                pool.shuffle(&mut rand::thread_rng());
                unique_excluding(pool, queried_name, limit)
            }
        }
    }

    /// Resolve every keyword with at most `concurrency` resolutions in
    /// flight. Output position `i` always holds the result for keyword `i`.
    async fn resolve_keywords(&self, keywords: Vec<String>) -> Vec<Option<String>> {
        let permits = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));

        let workers: Vec<_> = keywords
            .into_iter()
            .map(|keyword| {
                let resolver = Arc::clone(&self.resolver);
                let permits = Arc::clone(&permits);
                tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await.ok()?;
                    resolver.resolve(&keyword).await
                })
            })
            .collect();

        join_all(workers)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(candidate) => candidate,
                Err(e) => {
                    warn!("Keyword resolution worker failed: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// First-seen-wins de-duplication that drops `excluded` and stops at `limit`
fn unique_excluding<I, S>(candidates: I, excluded: &str, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut picks: Vec<String> = Vec::with_capacity(limit);

    for candidate in candidates {
        if picks.len() >= limit {
            break;
        }
        let candidate = candidate.into();
        if candidate != excluded && !picks.contains(&candidate) {
            picks.push(candidate);
        }
    }

    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::client::MockRegistry;
    use crate::error::PyLibFinderError;
    use crate::types::KeywordField;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn metadata(name: &str, keywords: Option<&str>) -> PackageMetadata {
        PackageMetadata {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            keywords: keywords.map(|k| KeywordField::Text(k.to_string())),
            ..Default::default()
        }
    }

    fn registry_returning(found: Option<PackageMetadata>) -> Arc<dyn Registry> {
        let mut registry = MockRegistry::new();
        registry
            .expect_lookup()
            .times(1)
            .returning(move |_| Ok(found.clone()));
        Arc::new(registry)
    }

    /// Resolves from a map, sleeping a per-keyword delay first
    struct ScriptedResolver {
        answers: HashMap<&'static str, (&'static str, u64)>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedResolver {
        fn new(answers: &[(&'static str, &'static str, u64)]) -> Self {
            Self {
                answers: answers.iter().map(|(k, v, d)| (*k, (*v, *d))).collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Resolver for ScriptedResolver {
        async fn resolve(&self, keyword: &str) -> Option<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let answer = self.answers.get(keyword).copied();
            if let Some((_, delay_ms)) = answer {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            answer.map(|(package, _)| package.to_string())
        }
    }

    struct PanickingResolver;

    #[async_trait]
    impl Resolver for PanickingResolver {
        async fn resolve(&self, keyword: &str) -> Option<String> {
            if keyword == "boom" {
                panic!("resolver exploded");
            }
            Some(format!("{}-pkg", keyword))
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_keyword_hit() {
        let recommender = Recommender::new(registry_returning(Some(metadata("somepkg", Some("web")))));
        assert_eq!(recommender.recommend("somepkg").await, vec!["flask"]);
    }

    #[tokio::test]
    async fn test_not_found_yields_nothing() {
        let recommender = Recommender::new(registry_returning(None));
        assert!(recommender.recommend("django").await.is_empty());
    }

    #[tokio::test]
    async fn test_transient_error_yields_nothing() {
        let mut registry = MockRegistry::new();
        registry
            .expect_lookup()
            .returning(|_| Err(PyLibFinderError::network("connection reset")));

        let recommender = Recommender::new(Arc::new(registry));
        assert!(recommender.recommend("django").await.is_empty());
    }

    #[tokio::test]
    async fn test_classified_fallback_in_table_order() {
        let recommender = Recommender::new(registry_returning(Some(metadata("django", None))));
        assert_eq!(
            recommender.recommend("django").await,
            vec!["flask", "fastapi", "bottle", "pyramid"]
        );
    }

    #[tokio::test]
    async fn test_unresolvable_keywords_fall_back_to_category() {
        let recommender =
            Recommender::new(registry_returning(Some(metadata("numpy", Some("arrays math")))));
        assert_eq!(
            recommender.recommend("numpy").await,
            vec!["pandas", "matplotlib", "seaborn", "scipy"]
        );
    }

    #[tokio::test]
    async fn test_keyword_resolving_to_self_falls_back() {
        let recommender = Recommender::new(registry_returning(Some(metadata("flask", Some("web")))));
        assert_eq!(
            recommender.recommend("flask").await,
            vec!["django", "fastapi", "bottle", "pyramid"]
        );
    }

    #[tokio::test]
    async fn test_unclassified_samples_across_categories() {
        let recommender =
            Recommender::new(registry_returning(Some(metadata("randomthing123", None))));
        let picks = recommender.recommend("randomthing123").await;

        assert_eq!(picks.len(), 5);
        let unique: HashSet<_> = picks.iter().collect();
        assert_eq!(unique.len(), 5);
        let pool: HashSet<_> = all_packages().collect();
        assert!(picks.iter().all(|p| pool.contains(p.as_str())));
    }

    #[tokio::test]
    async fn test_unclassified_member_is_excluded() {
        let mut registry = MockRegistry::new();
        registry
            .expect_lookup()
            .returning(|name| Ok(Some(metadata(name, None))));
        let recommender = Recommender::new(Arc::new(registry));

        for _ in 0..20 {
            let picks = recommender.recommend("pytest").await;
            assert_eq!(picks.len(), 5);
            assert!(!picks.iter().any(|p| p == "pytest"));
        }
    }

    #[tokio::test]
    async fn test_classified_path_is_idempotent() {
        let mut registry = MockRegistry::new();
        registry
            .expect_lookup()
            .times(2)
            .returning(|name| Ok(Some(metadata(name, Some("unknown words")))));
        let recommender = Recommender::new(Arc::new(registry));

        let first = recommender.recommend("mlflow").await;
        let second = recommender.recommend("mlflow").await;
        assert_eq!(first, second);
        assert_eq!(first, Category::Ml.packages().to_vec());
    }

    #[tokio::test]
    async fn test_order_follows_keywords_not_completion() {
        let resolver = Arc::new(ScriptedResolver::new(&[
            ("slow", "first", 80),
            ("medium", "second", 40),
            ("fast", "third", 0),
        ]));
        let recommender = Recommender::with_resolver(
            registry_returning(Some(metadata("pkg", Some("slow medium fast")))),
            resolver,
        );

        assert_eq!(
            recommender.recommend("pkg").await,
            vec!["first", "second", "third"]
        );
    }

    #[tokio::test]
    async fn test_duplicates_and_misses_are_dropped() {
        let resolver = Arc::new(ScriptedResolver::new(&[
            ("a", "flask", 0),
            ("b", "flask", 0),
            ("d", "pandas", 0),
        ]));
        let recommender = Recommender::with_resolver(
            registry_returning(Some(metadata("pkg", Some("a b d c")))),
            resolver,
        );

        assert_eq!(recommender.recommend("pkg").await, vec!["flask", "pandas"]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let answers: Vec<_> = ["k1", "k2", "k3"].iter().map(|k| (*k, *k, 30)).collect();
        let resolver = Arc::new(ScriptedResolver::new(&answers));
        let recommender = Recommender::with_resolver(
            registry_returning(Some(metadata("pkg", Some("k1 k2 k3")))),
            resolver.clone(),
        )
        .with_settings(RecommendationConfig {
            concurrency: 2,
            ..RecommendationConfig::default()
        });

        let picks = recommender.recommend("pkg").await;
        assert_eq!(picks, vec!["k1", "k2", "k3"]);
        assert!(resolver.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_keywords_beyond_cap_are_ignored() {
        let recommender = Recommender::with_resolver(
            registry_returning(Some(metadata("pkg", Some("a b c d e f g")))),
            Arc::new(PanickingResolver),
        );

        assert_eq!(
            recommender.recommend("pkg").await,
            vec!["a-pkg", "b-pkg", "c-pkg"]
        );
    }

    #[tokio::test]
    async fn test_oversized_settings_are_clamped() {
        let oversized = RecommendationConfig {
            max_keywords: 7,
            max_results: 8,
            concurrency: 4,
        };
        let recommender = Recommender::with_resolver(
            registry_returning(Some(metadata("randomthing123", None))),
            Arc::new(PanickingResolver),
        )
        .with_settings(oversized);

        assert_eq!(
            recommender.settings(),
            &RecommendationConfig {
                max_keywords: 3,
                max_results: 5,
                concurrency: 4,
            }
        );
        assert_eq!(recommender.recommend("randomthing123").await.len(), 5);

        let keyworded = Recommender::with_resolver(
            registry_returning(Some(metadata("pkg", Some("a b c d e f g")))),
            Arc::new(PanickingResolver),
        )
        .with_settings(RecommendationConfig {
            max_keywords: 7,
            max_results: 8,
            concurrency: 4,
        });
        assert_eq!(keyworded.recommend("pkg").await.len(), 3);
    }

    #[tokio::test]
    async fn test_panicking_worker_counts_as_miss() {
        let recommender = Recommender::with_resolver(
            registry_returning(Some(metadata("pkg", Some("boom web")))),
            Arc::new(PanickingResolver),
        );
        assert_eq!(recommender.recommend("pkg").await, vec!["web-pkg"]);
    }

    #[test]
    fn test_unique_excluding() {
        let picks = unique_excluding(["a", "b", "a", "q", "c", "d"], "q", 3);
        assert_eq!(picks, vec!["a", "b", "c"]);
        assert!(unique_excluding(Vec::<String>::new(), "q", 5).is_empty());
    }
}
