//! Request utilities for HTTP endpoints.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{HeaderMap, Request};
use tokio::time;

use crate::router::RouterError;
use inplace_edit_core::error::UpdateFieldError;
use inplace_edit_core::host::AdminUser;

/// Header carrying the authenticated admin, set by the host's auth layer.
pub const ADMIN_USER_HEADER: &str = "x-admin-user";

/// Helper function to read request body with timeout and size limit
pub(crate) async fn read_request_body_with_timeout<B>(
    req: Request<B>,
    timeout_ms: u64,
    max_bytes: usize,
) -> Result<Bytes, RouterError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let body = Limited::new(req.into_body(), max_bytes);
    let collected = time::timeout(timeout_duration, body.collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                RouterError::PayloadTooLarge
            } else {
                RouterError::InternalError(format!("Failed to read request body: {}", e))
            }
        })?;
    Ok(collected.to_bytes())
}

/// Extracts the admin user supplied by the host's authentication layer.
pub fn admin_user_from_headers(headers: &HeaderMap) -> Option<AdminUser> {
    headers
        .get(ADMIN_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(AdminUser::new)
}

/// Map UpdateFieldError to appropriate RouterError
pub(crate) fn map_update_error_to_router_error(e: UpdateFieldError) -> RouterError {
    match e {
        UpdateFieldError::UnknownPluginInstance(_)
        | UpdateFieldError::UnknownResource(_)
        | UpdateFieldError::RecordNotFound { .. } => RouterError::NotFound(e.to_string()),
        UpdateFieldError::FieldNotEditable { .. }
        | UpdateFieldError::InvalidValue { .. }
        | UpdateFieldError::InvalidRecordId(_) => RouterError::BadRequest(e.to_string()),
        UpdateFieldError::UnknownDataSource(_) | UpdateFieldError::Host(_) => {
            tracing::error!("Field update failed: {}", e);
            RouterError::InternalError(e.to_string())
        }
    }
}
