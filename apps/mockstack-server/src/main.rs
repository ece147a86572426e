//! MockStack Server - LocalStack-compatible AWS emulator.
//!
//! Hosts every compiled-in service behind one gateway. Requests are routed by
//! `X-Amz-Target` (JSON-RPC services) or URL path prefix (REST services).
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:4566 mockstack-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4566` | Bind address |
//! | `SERVICES` | *(empty = all)* | Comma-separated list of services to enable |
//! | `DEFAULT_REGION` | `us-east-1` | Region for requests that carry none |
//! | `ACCOUNT_ID` | `000000000000` | Account used in ARNs |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `text` | `json` for structured log lines |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mockstack_core::MockStackConfig;
use mockstack_gateway::{Dispatcher, GatewayService, ServiceRegistry};

/// Server version reported at start-up.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Services this binary can host, in registration order.
const COMPILED_SERVICES: &[&str] = &[
    #[cfg(feature = "batch")]
    "batch",
    #[cfg(feature = "sns")]
    "sns",
    #[cfg(feature = "ecs")]
    "ecs",
];

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
/// `LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing(config: &MockStackConfig) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log level filter: {}", config.log_level))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

/// Register every compiled-in service that `config` enables.
fn build_registry(config: &MockStackConfig) -> Result<ServiceRegistry> {
    for name in &config.services {
        if !COMPILED_SERVICES.contains(&name.as_str()) {
            warn!(service = %name, "requested service is not compiled in, ignoring");
        }
    }

    let mut registry = ServiceRegistry::new();

    #[cfg(feature = "batch")]
    if config.is_service_enabled(mockstack_batch::SERVICE_NAME) {
        let provider = Arc::new(mockstack_batch::MockStackBatch::new());
        registry
            .register(mockstack_batch::descriptor(provider))
            .context("failed to register batch")?;
    }

    #[cfg(feature = "sns")]
    if config.is_service_enabled(mockstack_sns::SERVICE_NAME) {
        let provider = Arc::new(mockstack_sns::MockStackSns::new());
        registry
            .register(mockstack_sns::descriptor(provider))
            .context("failed to register sns")?;
    }

    #[cfg(feature = "ecs")]
    if config.is_service_enabled(mockstack_ecs::SERVICE_NAME) {
        let provider = Arc::new(mockstack_ecs::MockStackEcs::new());
        registry
            .register(mockstack_ecs::descriptor(provider))
            .context("failed to register ecs")?;
    }

    if registry.is_empty() {
        anyhow::bail!(
            "no services enabled. Check the SERVICES environment variable \
             and compiled feature flags."
        );
    }
    Ok(registry)
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: GatewayService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check by connecting to the gateway and requesting the health endpoint.
///
/// Succeeds if the response is 200 OK and reports at least one running service.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request =
        format!("GET /_localstack/health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = MockStackConfig::from_env().context("invalid configuration")?;

    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config)?;

    let registry = build_registry(&config)?;
    let service_names: Vec<&str> = registry.names().collect();
    info!(services = ?service_names, "services registered");

    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        config.account_id.clone(),
        config.default_region.clone(),
    );
    let gateway = GatewayService::new(dispatcher);

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        region = %config.default_region,
        account = %config.account_id,
        version = VERSION,
        "starting MockStack Server",
    );

    serve(listener, gateway).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_services(services: &[&str]) -> MockStackConfig {
        MockStackConfig {
            services: services.iter().map(|s| (*s).to_owned()).collect(),
            ..MockStackConfig::default()
        }
    }

    #[test]
    fn test_should_register_all_compiled_services_by_default() {
        let registry = build_registry(&MockStackConfig::default()).unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, COMPILED_SERVICES);
    }

    #[cfg(all(feature = "sns", feature = "ecs"))]
    #[test]
    fn test_should_register_only_enabled_services() {
        let registry = build_registry(&config_with_services(&["sns", "nope"])).unwrap();
        assert!(registry.lookup("sns").is_some());
        assert!(registry.lookup("ecs").is_none());
    }

    #[test]
    fn test_should_fail_when_nothing_is_enabled() {
        assert!(build_registry(&config_with_services(&["nope"])).is_err());
    }
}
