//! Quill server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use quill_api::{app, middleware::AppState};
use quill_common::{AppResult, Config};
use quill_core::{
    CommentService, FeedService, FollowingService, GroupService, ModerationFilter, PageCache,
    PostService, UserService,
};
use quill_db::repositories::{
    CommentRepository, FollowingRepository, GroupRepository, PostRepository, UserRepository,
};
use sea_orm::DatabaseConnection;
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

/// Wire repositories and services over one connection pool.
fn build_state(db: DatabaseConnection, config: &Config) -> AppResult<AppState> {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let following_repo = FollowingRepository::new(Arc::clone(&db));

    let moderation = ModerationFilter::new(&config.moderation.banned_words)?;
    info!(words = moderation.words().len(), "Moderation filter loaded");

    Ok(AppState {
        user_service: UserService::new(user_repo.clone())
            .with_admin_usernames(config.server.admin_usernames.clone()),
        group_service: GroupService::new(group_repo.clone()),
        post_service: PostService::new(post_repo.clone(), group_repo.clone(), moderation),
        comment_service: CommentService::new(comment_repo.clone(), post_repo.clone()),
        following_service: FollowingService::new(following_repo.clone(), user_repo.clone()),
        feed_service: FeedService::new(
            post_repo,
            user_repo,
            group_repo,
            comment_repo,
            following_repo,
        ),
        index_cache: PageCache::new(config.cache.index_ttl()),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting quill server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = quill_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    quill_db::migrate(&db).await?;
    info!("Migrations completed");

    let state = build_state(db, &config)?;
    info!(
        ttl_secs = config.cache.index_ttl_secs,
        "Index page cache enabled"
    );

    let app = app(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
