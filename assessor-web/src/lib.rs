//! # Assessor Web Utilities
//!
//! Middleware shared by the assessor HTTP service:
//!
//! - **Request IDs**: every response carries `X-Request-ID`, propagated from
//!   the request or generated
//! - **Error logging**: 5xx responses are logged with their request id
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use assessor_web::{error_logging_middleware, request_id_middleware};
//!
//! let app: Router = Router::new()
//!     .route("/healthz", get(|| async { "ok" }))
//!     .layer(middleware::from_fn(error_logging_middleware))
//!     .layer(middleware::from_fn(request_id_middleware));
//! ```

pub mod middleware;

pub use middleware::{error_logging_middleware, request_id_middleware, RequestId, REQUEST_ID_HEADER};
