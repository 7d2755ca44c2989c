//! Campussync server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use campussync_api::{middleware::AppState, router as api_router};
use campussync_common::{Config, LocalStorage};
use campussync_core::{ComplaintService, EscalationService, LifecycleService, UserService};
use campussync_db::repositories::{
    ComplaintHistoryRepository, ComplaintRepository, UserRepository,
};
use campussync_scheduler::{EscalationExecutor, SchedulerConfig, run_scheduler};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campussync=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting campussync server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = campussync_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    campussync_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let complaint_repo = ComplaintRepository::new(Arc::clone(&db));
    let history_repo = ComplaintHistoryRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo.clone(), &config);
    let complaint_service = ComplaintService::new(
        complaint_repo.clone(),
        history_repo.clone(),
        user_repo.clone(),
    );
    let lifecycle_service = LifecycleService::new(complaint_repo.clone());
    let escalation_service = EscalationService::new(
        complaint_repo.clone(),
        lifecycle_service.clone(),
        &config,
    );

    let storage = Arc::new(LocalStorage::new(config.upload.dir.clone()));

    // Create app state
    let state = AppState {
        user_service,
        complaint_service,
        lifecycle_service,
        storage,
        upload: config.upload.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            campussync_api::middleware::auth_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(config.upload.max_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the escalation scheduler
    info!("Starting escalation scheduler...");
    let executor = Arc::new(EscalationExecutor::new(escalation_service));
    run_scheduler(SchedulerConfig::from_config(&config), executor).await;
    info!("Escalation scheduler started");

    // Start server with graceful shutdown
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
