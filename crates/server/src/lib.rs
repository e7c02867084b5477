//! # server
//!
//! HTTP prediction service for the monthly accident forecaster.
//!
//! The service loads one fitted model artifact at startup and answers
//! `POST /predict` with the point estimate for a requested month.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /predict` | `{"year", "month"}` in, `{"prediction"}` out |
//! | `GET /health` | always 200, with `model_loaded` |
//! | `GET /health/live` | liveness probe |
//! | `GET /health/ready` | 503 until the model is loaded |

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use config::ServerConfig;
pub use error::{ApiError, ServerError};
pub use state::{AppState, ModelSlot};

/// Build the router with middleware.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .route("/predict", post(routes::predict))
        .route("/health", get(routes::health))
        // Kubernetes-style probes
        .route("/health/live", get(routes::liveness))
        .route("/health/ready", get(routes::readiness))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Load the model, then serve until ctrl-c.
///
/// The artifact is loaded before the listener is bound, so a bad
/// `MODEL_PATH` fails fast and no request ever sees an empty slot.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let state = AppState::new();

    info!(path = %config.model_path.display(), "loading model");
    let model = algorithm::artifact::load(&config.model_path)?;
    if let Some((first, last)) = model.span() {
        info!(
            observations = model.n_observations(),
            %first,
            %last,
            "model loaded"
        );
    }
    state.model.install(model)?;

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("accidents-server v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
