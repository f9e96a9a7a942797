//! Single-field update endpoint.

use hyper::body::{Body, Bytes};
use hyper::{Request, Response};

use crate::router::{AppState, RouterError};
use inplace_edit_core::UpdateFieldRequest;

use super::request_utils::{
    admin_user_from_headers, map_update_error_to_router_error, read_request_body_with_timeout,
};
use super::response::build_response;

/// Updates one field of one record.
///
/// # Endpoint
/// `POST /plugin/{pluginInstanceId}/update-field`
///
/// # Request Body
/// ```json
/// {
///   "resourceId": "posts",
///   "recordId": 42,
///   "field": "status",
///   "value": "published"
/// }
/// ```
///
/// # Response
/// - **200 OK**: Returns the record as re-read after the update
/// ```json
/// {
///   "record": {"id": 42, "status": "published", "publishedAt": "2024-01-01T00:00:00Z"}
/// }
/// ```
/// - **200 OK**: The host's update operation refused the change
/// ```json
/// {
///   "error": "Action is not allowed"
/// }
/// ```
///
/// # Errors
/// - **400 Bad Request**: Malformed body, field not editable in place, or value/record id of the wrong type
/// - **401 Unauthorized**: No admin user supplied
/// - **404 Not Found**: Unknown resource or record
/// - **413 Payload Too Large**: Body exceeds the configured limit
/// - **500 Internal Server Error**: Data source failure
///
/// # Example
/// ```bash
/// curl -X POST http://localhost:8080/plugin/1a2b3c4d/update-field \
///   -H "Content-Type: application/json" \
///   -H "x-admin-user: alice" \
///   -d '{"resourceId": "posts", "recordId": 42, "field": "status", "value": "published"}'
/// ```
pub async fn update_field<B>(
    req: Request<B>,
    instance_id: &str,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let admin_user = admin_user_from_headers(req.headers()).ok_or(RouterError::Unauthorized)?;

    let body_bytes = read_request_body_with_timeout(
        req,
        state.config.request_timeout_ms,
        state.config.max_body_bytes,
    )
    .await?;

    let request: UpdateFieldRequest = serde_json::from_slice(&body_bytes)
        .map_err(|e| RouterError::BadRequest(format!("Failed to parse request: {}", e)))?;

    let response = state
        .service
        .update_field(instance_id, request, &admin_user)
        .await
        .map_err(map_update_error_to_router_error)?;

    let json = serde_json::to_vec(&response)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;

    build_response(200, json)
}
