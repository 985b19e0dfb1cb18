use assessor_web::{error_logging_middleware, request_id_middleware};
use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{context::AppContext, handlers};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub enable_request_id: bool,
    pub enable_tracing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enable_request_id: true,
            enable_tracing: true,
        }
    }
}

impl From<&assessor_config::ServerConfig> for AppConfig {
    fn from(server: &assessor_config::ServerConfig) -> Self {
        Self {
            enable_request_id: server.enable_request_id,
            enable_tracing: server.enable_tracing,
        }
    }
}

pub fn create_app(context: AppContext, config: AppConfig) -> Router {
    let mut app = Router::new()
        .route("/healthz", get(handlers::liveness_check))
        .route("/readyz", get(handlers::readiness_check))
        .route("/api/data", get(handlers::generate_data))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(context)
        .layer(middleware::from_fn(error_logging_middleware));

    if config.enable_tracing {
        app = app.layer(TraceLayer::new_for_http());
    }

    if config.enable_request_id {
        app = app.layer(middleware::from_fn(request_id_middleware));
    }

    app
}
