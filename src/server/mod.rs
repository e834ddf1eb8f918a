//! # HTTP Server for Batch QR Generation
//!
//! Serves an HTML form and returns the generated archive as a download.
//!
//! ## Usage
//!
//! ```bash
//! qrbatch serve --listen 0.0.0.0:8080
//! ```
//!
//! Then open http://localhost:8080 in a browser, fill in label/link rows and
//! submit to download `qr_codes.zip`.
//!
//! ## Routes
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | GET | `/` | - |
//! | POST | `/generate` | multipart, repeated `name[]` / `link[]` |
//! | POST | `/api/generate` | JSON `{"entries": [{"label", "target"}]}` |

mod handlers;
mod state;
mod static_files;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::batch::Pipeline;
use crate::error::QrBatchError;

/// Form bodies are small; this still allows a few thousand rows.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Build the router. Exposed separately from [`serve`] so it can be driven
/// without a socket.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(static_files::index_handler))
        .route("/generate", post(handlers::generate::form))
        .route("/api/generate", post(handlers::generate::json))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use qrbatch::batch::Pipeline;
/// use qrbatch::config::BatchConfig;
/// use qrbatch::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), qrbatch::error::QrBatchError> {
/// let pipeline = Pipeline::from_config(BatchConfig::default())?;
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
/// };
///
/// serve(config, pipeline).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, pipeline: Pipeline) -> Result<(), QrBatchError> {
    let batch_config = pipeline.config().clone();
    let app = router(Arc::new(AppState::new(pipeline)));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            QrBatchError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    tracing::info!(
        listen = %config.listen_addr,
        error_correction = %batch_config.error_correction,
        max_version = batch_config.max_version,
        "qrbatch HTTP server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| QrBatchError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}
