//! # PyLib Finder
//!
//! Python package lookup tool with a CLI, an HTTP API and a library API for
//! querying PyPI and suggesting similar packages.
//!
//! ## Features
//!
//! - **Package lookup** - Version, summary, author, license, links and requirements
//! - **Install commands** - Ready-to-paste `pip`, `pip3` and virtualenv snippets
//! - **Similar packages** - Keyword heuristics with a curated category fallback
//! - **Explore mode** - Follow recommendations from package to package
//! - **REST API server** - Run as an HTTP server for integration
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use pylib_finder::{PypiClient, Recommender, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Arc::new(PypiClient::new()?);
//!
//!     let package = client.get_package("requests").await?;
//!     println!("{} {}", package.name, package.version);
//!
//!     let recommender = Recommender::new(client);
//!     for name in recommender.recommend("requests").await {
//!         println!("similar: {}", name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Error Handling
//!
//! ```rust,no_run
//! use pylib_finder::{PypiClient, PyLibFinderError, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = PypiClient::new()?;
//!
//! match client.get_package("no-such-package-xyz").await {
//!     Ok(package) => println!("Found: {}", package.name),
//!     Err(PyLibFinderError::PackageNotFound(name)) => println!("'{}' not found", name),
//!     Err(e) if e.is_recoverable() => println!("Temporary error, can retry: {}", e),
//!     Err(e) => println!("Error: {}", e.user_message()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! pylib-finder info pandas
//! pylib-finder similar django --format json
//! pylib-finder explore flask
//! pylib-finder server --port 8080
//! ```
//!
//! ## Configuration
//!
//! Configure via file (`pylib-finder.toml`) or environment variables
//! (`PYLIB_FINDER__SECTION__KEY`):
//!
//! ```toml
//! [pypi]
//! timeout_seconds = 30
//!
//! [recommendations]
//! max_results = 5
//! ```

pub mod category;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod keywords;
pub mod recommend;
pub mod resolver;
pub mod server;
pub mod session;
pub mod types;
pub mod utils;

pub use category::{classify, Category};
pub use client::{PypiClient, PypiClientBuilder, Registry};
pub use error::{PyLibFinderError, Result};
pub use keywords::extract_keywords;
pub use recommend::Recommender;
pub use resolver::{KeywordTableResolver, Resolver};
pub use session::ExploreSession;
pub use types::{InstallCommands, KeywordField, PackageDetails, PackageMetadata};

pub use config::{AppConfig, RecommendationConfig, RuntimeEnvironment};

/// Default PyPI JSON API base URL
pub const DEFAULT_API_URL: &str = "https://pypi.org/pypi";

/// Default user agent for requests
pub const DEFAULT_USER_AGENT: &str = "pylib-finder/1.0.0";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Keywords taken from metadata before resolution
pub const MAX_KEYWORDS: usize = 3;

/// Longest recommendation list returned
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Keyword resolutions allowed in flight at once
pub const RESOLVER_CONCURRENCY: usize = 3;

/// Shown when a package has no recommendations
pub const NO_SIMILAR_MESSAGE: &str = "No similar packages found.";

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
