use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use viewpress_api::config::ServerConfig;
use viewpress_api::notifications::NotificationRouter;
use viewpress_api::{routes, state, ws};
use viewpress_automation::{AutomationConfig, DesignAutomationApi, WorkItemManager, WorkItemRegistry};
use viewpress_events::EventBus;

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "viewpress_api=debug,viewpress_automation=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let automation_config = AutomationConfig::from_env().expect("Invalid automation configuration");
    tracing::info!(?automation_config, "Loaded automation configuration");

    // --- Remote compute service ---
    let service = DesignAutomationApi::from_config(&automation_config)
        .expect("Failed to build automation HTTP client");

    // --- CORS ---
    let cors = build_cors_layer(&config);

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    tracing::info!("Event bus created");

    // Spawn notification router (pushes status events to WebSocket clients).
    let notification_router = NotificationRouter::new(Arc::clone(&ws_manager));
    let router_handle = tokio::spawn(notification_router.run(event_bus.subscribe()));

    // --- Work item manager ---
    let workitems = Arc::new(WorkItemManager::new(
        Arc::new(service),
        Arc::new(WorkItemRegistry::new()),
        Arc::clone(&event_bus),
        automation_config.descriptor_template(),
    ));
    tracing::info!("Work item manager started");

    // --- App state ---
    let state = AppState {
        ws_manager: Arc::clone(&ws_manager),
        workitems: Arc::clone(&workitems),
        event_bus: Arc::clone(&event_bus),
    };

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        // -- Middleware stack (applied bottom-up) --
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    // Let detached remote cancellations and callback reconciliation finish.
    workitems.shutdown().await;
    let stale = workitems.registry().ids().await;
    if !stale.is_empty() {
        tracing::warn!(
            count = stale.len(),
            ids = ?stale,
            "Work items never finalized (no callback, poll or cancel)",
        );
    }

    // Drop every bus sender to close the broadcast channel, which stops
    // the notification router.
    drop(workitems);
    drop(event_bus);
    let _ = tokio::time::timeout(grace, router_handle).await;
    tracing::info!("Notification router shut down");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid, so that
/// misconfiguration fails fast.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
