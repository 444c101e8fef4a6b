//! Server startup, shared state, and shutdown coordination.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use {
    axum::{
        Router,
        routing::{get, post},
    },
    tokio::{net::TcpListener, sync::Mutex},
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::{error, info},
};

use veer_browser::SessionController;

use crate::routes;

/// How long graceful shutdown may take before the process force-exits.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(8);

/// Shared app state: the controller is a single explicitly owned instance,
/// and the mutex serializes concurrent requests against it.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Mutex<SessionController>>,
}

impl AppState {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
        }
    }
}

/// Build the API router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/browser/init", post(routes::init))
        .route("/browser/navigate", post(routes::navigate))
        .route("/browser/screenshot", post(routes::screenshot))
        .route("/browser/snapshot", post(routes::snapshot))
        .route("/browser/click", post(routes::click))
        .route("/browser/type", post(routes::type_text))
        .route("/browser/content", post(routes::content))
        .route("/browser/evaluate", post(routes::evaluate))
        .route("/browser/wait", post(routes::wait))
        .route("/browser/tabs", get(routes::tabs))
        .route("/browser/tabs/new", post(routes::new_tab))
        .route("/browser/tabs/close", post(routes::close_tab))
        .route("/browser/tabs/select", post(routes::select_tab))
        .route("/browser/close", post(routes::close_browser))
        .route("/session", get(routes::session))
        .route("/save-profile", post(routes::save_profile))
        .fallback(routes::fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the listener, kick off background initialization, and serve until a
/// termination signal arrives.
pub async fn start(bind: &str, port: u16, controller: SessionController) -> anyhow::Result<()> {
    let state = AppState::new(controller);
    let app = build_app(state.clone());

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(port, "browser API server running");
    info!("health check: http://localhost:{port}/health");

    // Initialization runs after the listener is bound so a slow or failed
    // launch never blocks the API; operations retry lazily on first use.
    let init_state = state.clone();
    tokio::spawn(async move {
        info!("initializing browser");
        match init_state.controller.lock().await.initialize().await {
            Ok(()) => info!("browser initialized"),
            Err(e) => error!(error = %e, "failed to initialize browser"),
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    info!("server closed, exiting");
    Ok(())
}

/// Resolves once shutdown should proceed: a termination signal arrives, the
/// controller is closed best-effort, and a detached timer force-exits the
/// process if teardown stalls past [`SHUTDOWN_TIMEOUT`].
async fn shutdown_signal(state: AppState) {
    wait_for_signal().await;
    info!("termination signal received, shutting down gracefully");

    tokio::spawn(async {
        tokio::time::sleep(SHUTDOWN_TIMEOUT).await;
        error!("forced exit after shutdown timeout");
        std::process::exit(1);
    });

    match state.controller.lock().await.close().await {
        Ok(()) => info!("browser session closed"),
        Err(e) => error!(error = %e, "error closing browser session"),
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {},
                _ = terminate.recv() => {},
            }
        },
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
        },
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
