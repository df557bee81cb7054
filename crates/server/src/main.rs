//! Pulse-feed server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use apalis::prelude::*;
use axum::middleware;
use pulse_api::{middleware::AppState, router as api_router, tenant_middleware};
use pulse_common::Config;
use pulse_core::{ActivityService, FanOutDispatcher, FanOutService, FeedService, FollowService};
use pulse_db::repositories::{ActivityRepository, FeedItemRepository, FollowRepository};
use pulse_queue::workers::{FanOutContext, fan_out_worker};
use pulse_queue::{FanOutJob, RedisFanOutDispatcher};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
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
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting pulse-feed server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = pulse_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    pulse_db::migrate(&db).await?;
    info!("Migrations completed");

    // Connect to Redis and initialize job queue
    info!("Connecting to Redis...");
    let redis_client =
        redis::Client::open(config.redis.url.as_str()).expect("Failed to create Redis client");
    let redis_conn = redis::aio::ConnectionManager::new(redis_client)
        .await
        .expect("Failed to connect to Redis");
    let redis_storage = apalis_redis::RedisStorage::<FanOutJob>::new(redis_conn);
    info!("Connected to Redis job queue");

    // Create fan-out dispatcher
    let dispatcher: FanOutDispatcher =
        Arc::new(RedisFanOutDispatcher::new(redis_storage.clone()));

    // Initialize repositories
    let db = Arc::new(db);
    let activity_repo = ActivityRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));
    let feed_item_repo = FeedItemRepository::new(Arc::clone(&db));

    // Initialize services
    let activity_service = ActivityService::with_dispatcher(
        activity_repo.clone(),
        follow_repo.clone(),
        feed_item_repo.clone(),
        config.fanout.clone(),
        dispatcher,
    );
    let follow_service = FollowService::new(follow_repo.clone());
    let feed_service = FeedService::new(feed_item_repo.clone());

    // Create app state
    let state = AppState {
        activity_service,
        follow_service,
        feed_service,
    };

    // Build router
    let app = api_router()
        .layer(middleware::from_fn(tenant_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start fan-out worker
    info!("Starting fan-out worker...");
    let fan_out_service = FanOutService::new(
        activity_repo,
        follow_repo,
        feed_item_repo,
        config.fanout.clone(),
    );
    let fan_out_ctx = FanOutContext::new(fan_out_service);
    let worker_count = config.fanout.workers;

    // Spawn the worker in the background
    tokio::spawn(async move {
        let monitor = Monitor::new().register({
            WorkerBuilder::new("fan-out")
                .concurrency(worker_count)
                .data(fan_out_ctx)
                .backend(redis_storage)
                .build_fn(fan_out_worker)
        });

        if let Err(e) = monitor.run().await {
            tracing::error!(error = %e, "Fan-out worker failed");
        }
    });
    info!("Fan-out worker started");

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
