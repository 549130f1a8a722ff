use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use auth::TokenIssuer;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use storefront_service::checkout::service::CheckoutService;
use storefront_service::config::Config;
use storefront_service::coupon::service::CouponService;
use storefront_service::inbound::http::router::create_router;
use storefront_service::inbound::http::router::AppState;
use storefront_service::inbound::http::router::HttpSettings;
use storefront_service::outbound::cache::RedisSessionStore;
use storefront_service::outbound::payments::StripeGateway;
use storefront_service::outbound::repositories::PostgresCouponRepository;
use storefront_service::outbound::repositories::PostgresOrderRepository;
use storefront_service::outbound::repositories::PostgresUserRepository;
use storefront_service::session::service::SessionService;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "storefront-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        environment = ?config.server.environment,
        request_timeout_secs = config.server.request_timeout_secs,
        cache_timeout_ms = config.cache.timeout_ms,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let redis_client = redis::Client::open(config.cache.url.as_str())?;
    let redis_connection = tokio::time::timeout(
        config.cache.timeout(),
        ConnectionManager::new(redis_client),
    )
    .await??;
    tracing::info!(cache = "redis", "Session cache connected");

    let tokens = Arc::new(TokenIssuer::new(
        config.jwt.access_secret.as_bytes(),
        config.jwt.refresh_secret.as_bytes(),
        config.jwt.lifetimes(),
    ));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let coupon_repository = Arc::new(PostgresCouponRepository::new(pg_pool.clone()));
    let order_repository = Arc::new(PostgresOrderRepository::new(pg_pool));
    let session_store = Arc::new(RedisSessionStore::new(
        redis_connection,
        config.cache.timeout(),
    ));
    let payment_gateway = Arc::new(StripeGateway::new(
        &config.payments,
        Duration::from_secs(config.server.request_timeout_secs),
    )?);

    let state = AppState {
        session_service: Arc::new(SessionService::new(user_repository, session_store, tokens)),
        coupon_service: Arc::new(CouponService::new(Arc::clone(&coupon_repository))),
        checkout_service: Arc::new(CheckoutService::new(
            coupon_repository,
            order_repository,
            payment_gateway,
        )),
        settings: HttpSettings {
            environment: config.server.environment,
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
        },
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(
        http_listener,
        create_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
