//! Party manager binary entrypoint wiring the REST API, SSE stream and proxy host.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use party_manager_back::{
    config::AppConfig,
    proxy::{LocalProxy, ProxyHost},
    routes,
    services::proxy_supervisor,
    state::{AppState, SharedState},
};

const DEFAULT_PORT: u16 = 7000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let (proxy, bridged) = match bridge_proxy(&config)? {
        Some(proxy) => (proxy, true),
        None => {
            info!(
                servers = config.servers().len(),
                "no proxy bridge configured; using in-process proxy roster"
            );
            let local: Arc<dyn ProxyHost> =
                Arc::new(LocalProxy::with_servers(config.servers().iter().cloned()));
            (local, false)
        }
    };

    let app_state = AppState::new(config, proxy);
    if bridged {
        tokio::spawn(proxy_supervisor::run(app_state.clone()));
    }

    let app = build_router(app_state);

    let port = env::var("PARTY_API_PORT")
        .or_else(|_| env::var("PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the HTTP bridge client when `proxy_bridge` is configured.
#[cfg(feature = "proxy-bridge")]
fn bridge_proxy(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn ProxyHost>>> {
    use party_manager_back::proxy::bridge::BridgeProxy;

    let Some(bridge) = config.proxy_bridge() else {
        return Ok(None);
    };
    let proxy: Arc<dyn ProxyHost> =
        Arc::new(BridgeProxy::new(bridge).context("building proxy bridge client")?);
    info!(base_url = %bridge.base_url, "using proxy bridge");
    Ok(Some(proxy))
}

#[cfg(not(feature = "proxy-bridge"))]
fn bridge_proxy(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn ProxyHost>>> {
    if config.proxy_bridge().is_some() {
        tracing::warn!("proxy bridge configured but the `proxy-bridge` feature is disabled");
    }
    Ok(None)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
