pub mod api_error;
pub mod error_code;
pub mod query_error;
pub mod request_error;
