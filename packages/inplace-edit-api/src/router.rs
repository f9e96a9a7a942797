//! Matchit routing configuration.

use std::sync::Arc;

use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handlers;
use inplace_edit_core::config::ServerConfig;
use inplace_edit_core::FieldUpdater;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Field update service over the sealed admin configuration
    pub service: FieldUpdater,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a router with one update-field route per plugin instance.
    ///
    /// # Errors
    /// `RouterError::InternalError` if two instances map to the same path.
    pub fn new(state: AppState) -> Result<Self, RouterError> {
        let mut router = MatchitRouter::new();

        for plugin in state.service.config().plugin_instances() {
            let path = plugin.endpoint_path();
            router
                .insert(
                    path.clone(),
                    RouteHandler::UpdateField {
                        instance_id: plugin.instance_id().to_string(),
                    },
                )
                .map_err(|e| {
                    RouterError::InternalError(format!("Failed to insert {} route: {}", path, e))
                })?;
            tracing::info!(
                "Registered POST {} for resource {}",
                path,
                plugin.resource_id()
            );
        }

        Ok(Self {
            inner: router,
            state,
        })
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// # Arguments
    /// * `req` - HTTP request
    ///
    /// # Returns
    /// `Result<Response<Bytes>, RouterError>` containing the response or an error.
    pub async fn route<B>(&self, req: Request<B>) -> Result<Response<Bytes>, RouterError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let path = req.uri().path().to_string();

        match self.inner.at(&path) {
            Ok(matched) => matched.value.handle(req, self.state.clone()).await,
            Err(_) => Err(RouterError::NotFound(format!("No route found for {}", path))),
        }
    }
}

/// Route handler function.
enum RouteHandler {
    UpdateField { instance_id: String },
}

impl RouteHandler {
    /// Handles a request matched to this route.
    async fn handle<B>(
        &self,
        req: Request<B>,
        state: AppState,
    ) -> Result<Response<Bytes>, RouterError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        match self {
            RouteHandler::UpdateField { instance_id } => {
                if req.method() == hyper::Method::POST {
                    handlers::update_field(req, instance_id, state).await
                } else {
                    Err(RouterError::MethodNotAllowed)
                }
            }
        }
    }
}

/// Router error type.
#[derive(Debug)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest(String),
    NotFound(String),
    Unauthorized,
    PayloadTooLarge,
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            RouterError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            RouterError::Unauthorized => write!(f, "Unauthorized"),
            RouterError::PayloadTooLarge => write!(f, "Payload Too Large"),
        }
    }
}

impl std::error::Error for RouterError {}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let (status, message) = match &err {
            RouterError::MethodNotAllowed => (405, "Method Not Allowed"),
            RouterError::InternalError(msg) => (500, msg.as_str()),
            RouterError::Timeout => (408, "Request Timeout"),
            RouterError::BadRequest(msg) => (400, msg.as_str()),
            RouterError::NotFound(msg) => (404, msg.as_str()),
            RouterError::Unauthorized => (401, "Unauthorized"),
            RouterError::PayloadTooLarge => (413, "Payload Too Large"),
        };

        let error_response = handlers::error_response(status, message.to_string(), None);
        let body = serde_json::to_vec(&error_response)
            .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":{{\"code\":\"500\",\"message\":\"Failed to serialize error: {}\",\"details\":null}}}}", e).into_bytes());

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Bytes::from(body))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Bytes::from("Internal Server Error"));
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}
