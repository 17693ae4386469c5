use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ec_api::{create_app, AppState};
use ec_core::repositories::{InMemoryRevocationStore, RevocationStore};
use ec_core::services::{
    AuthService, AuthServiceConfig, PasswordService, RetryPolicy, TokenService,
    TokenServiceConfig, VerificationService, VerificationServiceConfig,
};
use ec_infra::{
    DatabasePool, LoggingEmailService, RedisClient, RedisRevocationStore, SqliteRevocationStore,
    SqliteTokenRepository, SqliteUserRepository, SqliteVerificationCodeRepository,
};
use ec_shared::config::{AppConfig, LogFormat, LoggingConfig, RevocationBackend};

type ProductionAuthService = AuthService<
    SqliteUserRepository,
    SqliteTokenRepository,
    Arc<dyn RevocationStore>,
    SqliteVerificationCodeRepository,
    LoggingEmailService,
>;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(&config.logging);

    info!(
        environment = ?config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting e-commerce auth API"
    );

    let pool = DatabasePool::new(config.database.clone())
        .await
        .context("could not open the database")?;
    pool.run_migrations()
        .await
        .context("could not run database migrations")?;

    let revocations = revocation_store(&config, &pool).await?;
    let auth_service = Arc::new(build_auth_service(&config, &pool, revocations).await?);

    match auth_service.cleanup_expired_tokens().await {
        Ok(report) => info!(
            refresh_tokens = report.refresh_tokens,
            revocations = report.revocations,
            "Removed expired tokens"
        ),
        Err(e) => warn!(error = %e, "Startup token cleanup failed"),
    }

    let app_state = web::Data::new(AppState::new(auth_service));
    let server_config = config.server.clone();
    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(app_state.clone(), &server_config));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("could not bind {}", bind_address))?
        .run()
        .await?;

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},actix_web=info,sqlx=warn", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        LogFormat::Compact => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }
}

async fn revocation_store(
    config: &AppConfig,
    pool: &DatabasePool,
) -> anyhow::Result<Arc<dyn RevocationStore>> {
    let store: Arc<dyn RevocationStore> = match config.auth.revocation_backend {
        RevocationBackend::Database => Arc::new(SqliteRevocationStore::new(pool.pool().clone())),
        RevocationBackend::Redis => {
            let client = RedisClient::new(config.cache.clone())
                .await
                .context("could not connect to Redis")?;
            Arc::new(RedisRevocationStore::new(client))
        }
        RevocationBackend::Memory => {
            warn!("Revoked tokens are kept in process memory; run a single instance only");
            Arc::new(InMemoryRevocationStore::new())
        }
    };

    info!(backend = ?config.auth.revocation_backend, "Revocation store ready");
    Ok(store)
}

async fn build_auth_service(
    config: &AppConfig,
    pool: &DatabasePool,
    revocations: Arc<dyn RevocationStore>,
) -> anyhow::Result<ProductionAuthService> {
    let retry = RetryPolicy::from_config(&config.database);

    let token_service = TokenService::new(
        SqliteTokenRepository::new(pool.pool().clone()),
        revocations,
        TokenServiceConfig::from(&config.auth.jwt),
    )?
    .with_retry_policy(retry.clone());

    let verification_service = VerificationService::new(
        Arc::new(SqliteVerificationCodeRepository::new(pool.pool().clone())),
        Arc::new(LoggingEmailService::new(config.auth.verification.sender.clone())),
        VerificationServiceConfig::from(&config.auth.verification),
    )
    .with_retry_policy(retry.clone());

    let passwords = PasswordService::from_config(&config.auth.password)?;
    passwords
        .warm_up()
        .await
        .context("could not prepare password hashing")?;

    let auth_service = AuthService::new(
        Arc::new(SqliteUserRepository::new(pool.pool().clone())),
        Arc::new(token_service),
        Arc::new(verification_service),
        passwords,
        AuthServiceConfig::default(),
    )
    .with_retry_policy(retry);

    Ok(auth_service)
}
