//! HTTP server implementation for the package finder API

use crate::category::Category;
use crate::client::PypiClient;
use crate::config::AppConfig;
use crate::error::{PyLibFinderError, Result};
use crate::recommend::Recommender;
use crate::types::*;
use crate::NO_SIMILAR_MESSAGE;
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

/// Registry client, engine and counters shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<PypiClient>,
    pub recommender: Recommender,
    pub config: AppConfig,
    pub metrics: Arc<ServerMetrics>,
    pub start_time: Instant,
}

impl AppState {
    /// Build the client and recommendation engine described by `config`
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let client = Arc::new(
            PypiClient::builder()
                .base_url(&config.pypi.api_url)
                .user_agent(&config.pypi.user_agent)
                .timeout(Duration::from_secs(config.pypi.timeout_seconds))
                .build()?,
        );

        let recommender = Recommender::new(client.clone())
            .with_settings(config.recommendations.clone());

        Ok(Self {
            client,
            recommender,
            config,
            metrics: Arc::new(ServerMetrics::default()),
            start_time: Instant::now(),
        })
    }
}

/// Request counters behind `/metrics`
#[derive(Default)]
pub struct ServerMetrics {
    requests_total: AtomicU64,
    requests_failed: AtomicU64,
    recommendations_served: AtomicU64,
    recommendations_empty: AtomicU64,
    total_response_time_ms: AtomicU64,
}

impl ServerMetrics {
    pub fn record_request(&self, success: bool, started: Instant) {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_ms
            .fetch_add(elapsed_ms, Ordering::Relaxed);
        if !success {
            self.requests_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_recommendations(&self, count: usize) {
        let counter = if count == 0 {
            &self.recommendations_empty
        } else {
            &self.recommendations_served
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricsResponse {
        let total = self.requests_total.load(Ordering::Relaxed);
        let failed = self.requests_failed.load(Ordering::Relaxed);
        let total_time = self.total_response_time_ms.load(Ordering::Relaxed);

        MetricsResponse {
            requests_total: total,
            requests_successful: total.saturating_sub(failed),
            requests_failed: failed,
            recommendations_served: self.recommendations_served.load(Ordering::Relaxed),
            recommendations_empty: self.recommendations_empty.load(Ordering::Relaxed),
            average_response_time_ms: match total {
                0 => 0.0,
                n => total_time as f64 / n as f64,
            },
            uptime_seconds: uptime.as_secs(),
        }
    }
}

/// Validate `config`, bind and serve until the process stops
pub async fn start_server(config: AppConfig) -> Result<()> {
    config.validate().map_err(PyLibFinderError::validation)?;

    let bind_address = config.bind_address();
    let app = create_router(AppState::from_config(config)?);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Server listening on {}", bind_address);
    info!("Health check: http://{}/health", bind_address);
    info!("API docs: http://{}/", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes plus optional timeout, trace and CORS layers
pub fn create_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/", get(api_docs))
        .route("/api/packages/:name", get(get_package))
        .route("/api/packages/:name/similar", get(get_similar))
        .route("/api/categories", get(list_categories))
        .route("/metrics", get(get_metrics))
        .with_state(state.clone());

    app = app.layer(TimeoutLayer::new(Duration::from_secs(
        state.config.server.request_timeout,
    )));

    if state.config.server.enable_tracing {
        app = app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    }

    if state.config.server.enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_headers(Any)
                .allow_origin(Any),
        );
    }

    app
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: crate::VERSION.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Plain-text endpoint listing
async fn api_docs() -> &'static str {
    r#"# PyLib Finder API

## Available Endpoints

### Health Check
- `GET /health` - Server health status

### Packages
- `GET /api/packages/{name}` - Package details and install commands
- `GET /api/packages/{name}/similar` - Up to 5 similar packages

### Categories
- `GET /api/categories` - Curated packages per category

### Monitoring
- `GET /metrics` - Server metrics

## Examples

```bash
curl http://localhost:3000/api/packages/requests
curl http://localhost:3000/api/packages/django/similar
```
"#
}

/// Package details with install commands
async fn get_package(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> std::result::Result<Json<PackageResponse>, AppError> {
    let started = Instant::now();
    let result = state.client.get_package(&name).await;
    state.metrics.record_request(result.is_ok(), started);

    let metadata = result.map_err(|e| {
        error!("Failed to get package '{}': {}", name, e);
        AppError::from(e)
    })?;

    Ok(Json(PackageResponse {
        details: PackageDetails::from(&metadata),
        install: InstallCommands::for_package(&metadata.name),
    }))
}

/// Recommend similar packages. Always answers 200; an empty list carries a
/// message instead of an error.
async fn get_similar(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<SimilarResponse> {
    let started = Instant::now();
    let similar = state.recommender.recommend(&name).await;
    state.metrics.record_recommendations(similar.len());
    state.metrics.record_request(true, started);

    let message = similar
        .is_empty()
        .then(|| NO_SIMILAR_MESSAGE.to_string());

    Json(SimilarResponse {
        request_id: uuid::Uuid::new_v4().to_string(),
        package: name,
        similar,
        message,
    })
}

/// List the category table
async fn list_categories() -> Json<Vec<CategoryEntry>> {
    Json(
        Category::ALL
            .into_iter()
            .map(|category| CategoryEntry {
                category: category.to_string(),
                packages: category.packages().iter().map(|p| p.to_string()).collect(),
            })
            .collect(),
    )
}

async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(state.metrics.snapshot(state.start_time.elapsed()))
}

/// Handler failure mapped onto an HTTP status
#[derive(Debug)]
pub enum AppError {
    Internal(PyLibFinderError),
    Unavailable(PyLibFinderError),
    BadRequest(String),
    NotFound(String),
}

impl From<PyLibFinderError> for AppError {
    fn from(err: PyLibFinderError) -> Self {
        match err {
            PyLibFinderError::PackageNotFound(_) => Self::NotFound(err.user_message()),
            PyLibFinderError::ValidationError(_) | PyLibFinderError::InvalidPackageName(_, _) => {
                Self::BadRequest(err.to_string())
            }
            e if e.is_recoverable() => Self::Unavailable(e),
            e => Self::Internal(e),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Unavailable(e) => (StatusCode::SERVICE_UNAVAILABLE, e.user_message()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = serde_json::json!({
            "error": message,
            "timestamp": Utc::now().to_rfc3339()
        });

        (status, Json(body)).into_response()
    }
}
