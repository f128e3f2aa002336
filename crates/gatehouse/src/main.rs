mod app;
mod config;
mod error;
mod handlers;
mod state;
mod users;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gatehouse_auth::{
    http_client, AppleProvider, AuthConfig, AuthState, Authenticator, GoogleProvider,
};
use gatehouse_core::auth::ProviderRegistry;
use gatehouse_core::store::SessionStore;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::create_app,
    config::{Config, RedisConfig},
    state::AppState,
    users::InMemoryUserRepository,
};

// Session backends: exactly one must be enabled
#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!("Cannot enable both 'memory' and 'redis' session features");

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!("Must enable exactly one session feature: 'memory' or 'redis'");

/// gatehouse - Google and Apple sign-in with server-side sessions
#[derive(Parser, Debug)]
#[command(name = "gatehouse")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to [default: server.host, 0.0.0.0]
    #[arg(long, short = 'H', env = "HOST")]
    host: Option<String>,

    /// Port to listen on [default: server.port, 8080]
    #[arg(long, short, env = "PORT")]
    port: Option<u16>,

    /// Configuration file (YAML, TOML or JSON)
    #[arg(long, short, env = "GATEHOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    config
        .auth
        .validate()
        .context("invalid auth configuration")?;

    let registry = provider_registry(&config.auth)?;
    tracing::info!(providers = ?registry.list(), "Registered OAuth providers");

    let store = session_store(&config.redis).await?;

    let authenticator = Authenticator::new(Arc::new(registry), store)
        .with_ttls(config.auth.state_ttl(), config.auth.session_ttl());
    let auth = AuthState::new(Arc::new(authenticator), &config.auth);
    let state = AppState::new(auth, Arc::new(InMemoryUserRepository::with_demo_data()));

    let app = create_app(state);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to the CLI, then the configured host:port
        None => {
            let host = cli.host.unwrap_or(config.server.host);
            let port = cli.port.unwrap_or(config.server.port);
            let addr = format!("{host}:{port}");
            TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gatehouse=debug,gatehouse_auth=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Builds one provider per configured section.
///
/// An unreadable or unusable Apple signing key aborts startup here.
fn provider_registry(config: &AuthConfig) -> Result<ProviderRegistry> {
    let http = http_client(config.http_timeout()).context("failed to build HTTP client")?;
    let mut registry = ProviderRegistry::new();

    if let Some(google) = &config.google {
        let provider = GoogleProvider::from_config(google, http.clone())
            .context("failed to configure Google provider")?;
        registry.add("google", Arc::new(provider));
    }

    if let Some(apple) = &config.apple {
        let provider = AppleProvider::from_config(apple, http)
            .context("failed to configure Apple provider")?;
        tracing::info!(
            expires_at = %provider.credential_expires_at(),
            "Apple client secret must be rotated before it expires"
        );
        registry.add("apple", Arc::new(provider));
    }

    Ok(registry)
}

#[cfg(feature = "redis")]
async fn session_store(config: &RedisConfig) -> Result<Arc<dyn SessionStore>> {
    let store = gatehouse_auth::RedisSessionStore::connect(&config.url, config.pool_size)
        .await
        .with_context(|| format!("failed to connect to Redis at {}", config.url))?;
    Ok(Arc::new(store))
}

#[cfg(feature = "memory")]
async fn session_store(_config: &RedisConfig) -> Result<Arc<dyn SessionStore>> {
    tracing::warn!("Using in-memory session store; sessions are lost on restart");
    Ok(Arc::new(gatehouse_auth::MemorySessionStore::default()))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
