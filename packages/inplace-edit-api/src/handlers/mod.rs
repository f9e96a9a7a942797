//! HTTP endpoint implementations.

mod request_utils;
mod response;
mod update_field;

pub use request_utils::{admin_user_from_headers, ADMIN_USER_HEADER};
pub use response::{error_response, ApiError, ErrorResponse};
pub use update_field::update_field;
