//! Admin API server with in-place list editing.
//!
//! Loads resources and plugin attachments from a TOML file, backs every data
//! source with an in-memory connector seeded from fixtures, seals the admin
//! configuration and serves the update-field endpoints.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use inplace_edit_api::{
    router::{AppState, Router},
    server::Server,
};
use inplace_edit_core::config::AppConfig;
use inplace_edit_core::host::{ConnectorRegistry, MemoryConnector, UpdatePipeline};
use inplace_edit_core::FieldUpdater;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the admin server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Port to listen on (overrides the configuration file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host address to bind to (overrides the configuration file)
    #[arg(long)]
    host: Option<String>,

    /// Request body timeout in milliseconds (overrides the configuration file)
    #[arg(long)]
    request_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut app_config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => {
            tracing::warn!("No configuration file given, serving without resources");
            AppConfig::default()
        }
    };
    if let Some(port) = args.port {
        app_config.server.port = port;
    }
    if let Some(host) = args.host {
        app_config.server.host = host;
    }
    if let Some(timeout) = args.request_timeout_ms {
        app_config.server.request_timeout_ms = timeout;
    }

    // One in-memory connector per data source
    let mut memory: HashMap<String, Arc<MemoryConnector>> = HashMap::new();
    for resource in &app_config.resources {
        memory
            .entry(resource.data_source.clone())
            .or_insert_with(|| Arc::new(MemoryConnector::new()));
    }

    for fixture in &app_config.fixtures {
        let resource = app_config
            .resources
            .iter()
            .find(|r| r.resource_id == fixture.resource_id)
            .ok_or_else(|| anyhow!("Fixture for unknown resource '{}'", fixture.resource_id))?;
        let connector = &memory[&resource.data_source];
        for record in &fixture.records {
            let serde_json::Value::Object(record) = record else {
                return Err(anyhow!(
                    "Fixture record for '{}' is not a table",
                    fixture.resource_id
                ));
            };
            connector
                .insert(resource, record.clone())
                .with_context(|| format!("Failed to seed '{}'", fixture.resource_id))?;
        }
        tracing::info!(
            "Seeded {} records into {}",
            connector.len(&resource.resource_id),
            resource.resource_id
        );
    }

    let mut registry = ConnectorRegistry::new();
    for (name, connector) in memory {
        registry.register(name, connector);
    }
    let connectors = Arc::new(registry);

    let admin = app_config
        .admin_builder()
        .build(&connectors)
        .await
        .context("Invalid admin configuration")?;
    let admin = Arc::new(admin);

    for plugin in admin.plugin_instances() {
        tracing::info!(
            "In-place edit on {} columns {:?} at {}",
            plugin.resource_id(),
            plugin.options().columns,
            plugin.endpoint_path()
        );
    }

    let service = FieldUpdater::new(
        admin,
        connectors.clone(),
        Arc::new(UpdatePipeline::new(connectors)),
    );
    let server_config = Arc::new(app_config.server.clone());
    let router = Router::new(AppState {
        service,
        config: server_config.clone(),
    })?;

    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port).parse()?;
    let server = Server::new(addr, router);

    tracing::info!(
        "Starting admin server on {} (request timeout {} ms)",
        addr,
        server_config.request_timeout_ms
    );

    let shutdown = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl_c: {}", err);
        }
        tracing::info!("Shutting down server...");
    };
    server
        .serve_with_shutdown(shutdown)
        .await
        .context("Server error")?;

    Ok(())
}
