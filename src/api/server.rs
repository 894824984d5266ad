//! Fleet Dashboard API Server implementation
//!
//! HTTP REST API server using Axum.
//! Serves dashboards, reports and charts for uploaded or local workbooks.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::core::sheets::FleetWorkbook;
use crate::error::{FleetError, FleetResult};
use crate::excel::{content_hash, FleetImporter};

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Parsed workbooks kept in memory; the oldest is dropped first
pub const MAX_CACHED_WORKBOOKS: usize = 8;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Parsed workbooks by content hash, evicted in insertion order
#[derive(Default)]
struct WorkbookCache {
    entries: HashMap<String, Arc<FleetWorkbook>>,
    order: VecDeque<String>,
}

impl WorkbookCache {
    fn insert(&mut self, hash: String, workbook: Arc<FleetWorkbook>, capacity: usize) {
        if self.entries.insert(hash.clone(), workbook).is_none() {
            self.order.push_back(hash);
        }
        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                tracing::debug!(hash = %oldest, "workbook evicted from cache");
                self.entries.remove(&oldest);
            }
        }
    }
}

/// Shared application state
pub struct AppState {
    pub version: String,
    capacity: usize,
    cache: Mutex<WorkbookCache>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

impl AppState {
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_capacity(version, MAX_CACHED_WORKBOOKS)
    }

    /// State keeping at most `capacity` parsed workbooks (at least one)
    pub fn with_capacity(version: impl Into<String>, capacity: usize) -> Self {
        Self {
            version: version.into(),
            capacity: capacity.max(1),
            cache: Mutex::new(WorkbookCache::default()),
        }
    }

    fn lock_cache(&self) -> FleetResult<std::sync::MutexGuard<'_, WorkbookCache>> {
        self.cache
            .lock()
            .map_err(|_| FleetError::Validation("workbook cache unavailable".to_string()))
    }

    /// Parse workbook bytes, reusing the cached copy for identical content
    pub fn load_bytes(&self, bytes: &[u8]) -> FleetResult<Arc<FleetWorkbook>> {
        let hash = content_hash(bytes);
        if let Some(cached) = self.lock_cache()?.entries.get(&hash) {
            tracing::debug!(%hash, "workbook cache hit");
            return Ok(Arc::clone(cached));
        }

        let workbook = Arc::new(FleetWorkbook::from_data(FleetImporter::import_bytes(bytes)?)?);
        self.lock_cache()?
            .insert(hash, Arc::clone(&workbook), self.capacity);
        Ok(workbook)
    }

    pub fn load_path(&self, path: &Path) -> FleetResult<Arc<FleetWorkbook>> {
        let bytes = std::fs::read(path)?;
        self.load_bytes(&bytes)
    }

    /// A previously uploaded workbook
    pub fn cached(&self, file_id: &str) -> FleetResult<Arc<FleetWorkbook>> {
        self.lock_cache()?
            .entries
            .get(file_id)
            .cloned()
            .ok_or_else(|| FleetError::UnknownFile(file_id.to_string()))
    }

    pub fn cached_count(&self) -> usize {
        self.cache.lock().map(|c| c.entries.len()).unwrap_or(0)
    }
}

/// Routes and middleware of the server
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Core API endpoints
        .route("/api/v1/upload", post(handlers::upload))
        .route("/api/v1/sheets", post(handlers::sheets))
        .route("/api/v1/vehicles", post(handlers::vehicles))
        .route("/api/v1/dashboard", post(handlers::dashboard))
        .route("/api/v1/report", post(handlers::report))
        .route("/api/v1/chart", post(handlers::chart))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetdash=info,tower_http=info".into()),
        )
        .init();

    let app = build_router(Arc::new(AppState::default()));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("🚗 Fleet Dashboard API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/upload, /api/v1/sheets, /api/v1/vehicles, /api/v1/dashboard, /api/v1/report, /api/v1/chart");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Fleet Dashboard API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
