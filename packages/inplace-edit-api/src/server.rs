//! Hyper server setup and request handling.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming as IncomingBody};
use hyper::{Request, Response, Result as HyperResult};
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use crate::router::Router;

/// HTTP server for the in-place edit API.
pub struct Server {
    addr: SocketAddr,
    router: Arc<Router>,
}

impl Server {
    /// Creates a new server instance.
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to
    /// * `router` - Request router
    pub fn new(addr: SocketAddr, router: Router) -> Self {
        Self {
            addr,
            router: Arc::new(router),
        }
    }

    /// Starts the HTTP server and runs until the listener fails.
    ///
    /// # Returns
    /// `Result<(), std::io::Error>` indicating success or failure.
    pub async fn serve(self) -> Result<(), std::io::Error> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Starts the HTTP server and stops accepting once `signal` resolves.
    ///
    /// Connections already open finish their in-flight requests before this
    /// returns.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr).await?;
        self.run(listener, signal).await
    }

    /// Serves an already bound listener until `signal` resolves, then drains
    /// open connections.
    pub async fn run<F>(self, listener: TcpListener, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Server listening on http://{}", listener.local_addr()?);

        let builder = ConnectionBuilder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, _) = accepted?;
                    let io = TokioIo::new(stream);
                    let router = Arc::clone(&self.router);

                    let conn = builder.serve_connection_with_upgrades(
                        io,
                        hyper::service::service_fn(move |req| handle_request(req, router.clone())),
                    );
                    let conn = graceful.watch(conn.into_owned());
                    tokio::task::spawn(async move {
                        if let Err(err) = conn.await {
                            tracing::error!("Error serving connection: {}", err);
                        }
                    });
                }
                () = &mut signal => {
                    tracing::info!("Shutdown requested, draining open connections");
                    break;
                }
            }
        }

        drop(listener);
        graceful.shutdown().await;
        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Handles an incoming HTTP request.
async fn handle_request(
    req: Request<IncomingBody>,
    router: Arc<Router>,
) -> HyperResult<Response<Full<Bytes>>> {
    match router.route(req).await {
        Ok(response) => Ok(response.map(Full::new)),
        Err(err) => {
            tracing::debug!("Error handling request: {}", err);
            Ok(Response::from(err).map(Full::new))
        }
    }
}
