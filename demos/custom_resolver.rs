//! Plugging a different keyword resolver into the recommendation engine
//!
//! Run with: `cargo run --example custom_resolver`

use async_trait::async_trait;
use pylib_finder::{
    KeywordTableResolver, PypiClient, RecommendationConfig, Recommender, Resolver, Result,
};
use std::sync::Arc;

/// Extends the built-in table with a few extra keywords
struct ExtendedResolver {
    fallback: KeywordTableResolver,
}

#[async_trait]
impl Resolver for ExtendedResolver {
    async fn resolve(&self, keyword: &str) -> Option<String> {
        match keyword.to_lowercase().as_str() {
            "http" => Some("httpx".to_string()),
            "testing" => Some("pytest".to_string()),
            "cli" => Some("click".to_string()),
            _ => self.fallback.resolve(keyword).await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Custom Resolver Example ===\n");

    let client = Arc::new(PypiClient::new()?);
    let resolver = Arc::new(ExtendedResolver {
        fallback: KeywordTableResolver::new(),
    });

    let recommender = Recommender::with_resolver(client, resolver).with_settings(
        RecommendationConfig {
            max_keywords: 3,
            max_results: 3,
            concurrency: 2,
        },
    );

    for package in ["requests", "pytest-cov", "typer"] {
        let similar = recommender.recommend(package).await;
        if similar.is_empty() {
            println!("{}: no similar packages found", package);
        } else {
            println!("{}: {}", package, similar.join(", "));
        }
    }

    Ok(())
}
