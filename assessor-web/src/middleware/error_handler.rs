use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::error;

use super::request_id::RequestId;

/// Log every server error response; the response itself passes through
/// untouched
pub async fn error_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request.extensions().get::<RequestId>().cloned();

    let response = next.run(request).await;

    if response.status().is_server_error() {
        error!(
            status = response.status().as_u16(),
            %method,
            path = %path,
            request_id = request_id.as_ref().map(RequestId::as_str).unwrap_or("-"),
            "Server error response"
        );
    }

    response
}
