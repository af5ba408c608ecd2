//! Cache Proxy - A multi-client caching HTTP/1.0 forward proxy
//!
//! # Startup Sequence
//! 1. Parse the listening port from the command line
//! 2. Initialize tracing subscriber for logging
//! 3. Load tuning parameters from environment variables
//! 4. Create the shared response cache
//! 5. Bind the proxy socket (failure exits non-zero)
//! 6. Optionally start the admin API
//! 7. Accept connections until SIGINT/SIGTERM

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_proxy::{api::serve_admin, Config, ProxyServer, ResponseCache};

/// Caching HTTP/1.0 forward proxy.
#[derive(Parser)]
#[command(name = "cache_proxy", version)]
#[command(about = "A multi-client caching HTTP/1.0 forward proxy", long_about = None)]
struct Cli {
    /// TCP port to accept client connections on
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Exits with a usage message on stderr if the port is missing or invalid
    let cli = Cli::parse();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting caching proxy");

    let config = Config::from_env(cli.port);
    info!(
        "Configuration loaded: port={}, cache_capacity={}, eviction_policy={}, origin_port={}, read_timeout={:?}",
        config.listen_port,
        config.cache_capacity,
        config.eviction_policy,
        config.origin_port,
        config.read_timeout()
    );

    let cache = ResponseCache::from_config(&config);

    let server = ProxyServer::bind(&config, cache.clone())
        .inspect_err(|e| error!(error = %e, "unable to start proxy"))
        .with_context(|| format!("unable to listen on port {}", config.listen_port))?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let admin = config.admin_port.map(|port| {
        let cache = cache.clone();
        let stop = stopped(stop_rx.clone());
        tokio::spawn(async move {
            if let Err(e) = serve_admin(port, cache, stop).await {
                error!(error = %e, "admin API stopped");
            }
        })
    });

    server.run(stopped(stop_rx)).await;

    if let Some(admin) = admin {
        let _ = admin.await;
    }

    info!("Proxy shutdown complete");
    Ok(())
}

/// Resolves once a shutdown has been requested.
async fn stopped(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
