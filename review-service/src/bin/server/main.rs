use std::sync::Arc;

use auth::TokenIssuer;
use review_service::config::Config;
use review_service::domain::authentication::service::AuthenticationService;
use review_service::domain::user::service::UserService;
use review_service::inbound::http::cookies::CookieSettings;
use review_service::inbound::http::router::create_router;
use review_service::outbound::mail::SmtpMailer;
use review_service::outbound::repositories::PostgresResetTokenRepository;
use review_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "review_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "review-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_ttl_seconds = config.jwt.access_expiration_seconds,
        refresh_ttl_seconds = config.jwt.refresh_expiration_seconds,
        smtp_host = %config.mail.smtp_host,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let issuer = Arc::new(TokenIssuer::new(&config.jwt.token_config())?);
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let reset_token_repository = Arc::new(PostgresResetTokenRepository::new(pg_pool));
    let mailer = Arc::new(SmtpMailer::new(&config.mail)?);
    tracing::info!(enabled = mailer.is_enabled(), "Mailer configured");

    let user_service = Arc::new(UserService::new(Arc::clone(&user_repository)));
    let authentication_service = Arc::new(AuthenticationService::new(
        user_repository,
        reset_token_repository,
        mailer,
        issuer,
        config.mail.reset_link_base.clone(),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        authentication_service,
        user_service,
        CookieSettings {
            secure: config.cookies.secure,
        },
    );

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
