pub mod error_handler;
pub mod request_id;

pub use error_handler::error_logging_middleware;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
