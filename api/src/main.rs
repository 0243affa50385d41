use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use log::{info, warn};

use vm_api::{create_app, AppState, SharedVerificationService};
use vm_core::{
    IdentityRepository, InMemoryIdentityRepository, InMemoryVerificationStore,
    VerificationRecordStore, VerificationService, VerificationServiceConfig,
};
use vm_infra::cache::{RedisClient, RedisVerificationStore};
use vm_infra::database::{DatabasePool, MySqlIdentityRepository, MySqlVerificationStore};
use vm_infra::email::create_notifier;
use vm_shared::config::{AppConfig, LogFormat, LoggingConfig, StoreBackend};

/// How often stale MySQL verification records are purged
const PURGE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(15 * 60);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = vm_api::config::load().context("failed to load configuration")?;
    init_logger(&config.logging);

    info!("Starting Verimail API Server ({})", config.environment);

    config.validate().context("invalid configuration")?;

    let verification = build_verification_service(&config).await?;
    let app_state = web::Data::new(AppState::new(verification));

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Server will bind to: {}", bind_address);

    let server_config = config.server.clone();
    let environment = config.environment;

    let mut server = HttpServer::new(move || {
        create_app(app_state.clone(), &server_config, environment)
    })
    .keep_alive(std::time::Duration::from_secs(config.server.keep_alive));

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    Ok(())
}

/// Initialize env_logger from the logging configuration; `RUST_LOG` wins
fn init_logger(logging: &LoggingConfig) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::new().default_filter_or(&logging.level));

    builder.format_module_path(logging.format == LogFormat::Pretty);
    if !logging.timestamp {
        builder.format_timestamp(None);
    }

    builder.init();
}

/// Wire the record store, identity repository and notifier selected by configuration
async fn build_verification_service(
    config: &AppConfig,
) -> anyhow::Result<Arc<SharedVerificationService>> {
    let service_config = VerificationServiceConfig::from(&config.verification);

    let notifier = create_notifier(
        &config.email,
        config.environment,
        service_config.validity_window,
    )
    .context("failed to create email notifier")?;

    let (store, identities): (Arc<dyn VerificationRecordStore>, Arc<dyn IdentityRepository>) =
        match config.verification.store_backend {
            StoreBackend::Memory => {
                warn!("Using in-memory verification store; state is lost on restart");
                (
                    Arc::new(InMemoryVerificationStore::new()),
                    Arc::new(InMemoryIdentityRepository::new()),
                )
            }
            StoreBackend::Redis => {
                let pool = connect_database(config).await?;
                let client = RedisClient::new(config.cache.clone())
                    .await
                    .context("failed to connect to Redis")?;
                (
                    Arc::new(RedisVerificationStore::new(
                        client,
                        config.verification.record_ttl(),
                    )),
                    Arc::new(MySqlIdentityRepository::new(pool.get_pool().clone())),
                )
            }
            StoreBackend::Mysql => {
                let pool = connect_database(config).await?;
                let store = Arc::new(MySqlVerificationStore::new(pool.get_pool().clone()));
                spawn_purge_task(store.clone(), config);
                (
                    store,
                    Arc::new(MySqlIdentityRepository::new(pool.get_pool().clone())),
                )
            }
        };

    info!(
        "Verification store backend: {:?}, retention: {:?}",
        config.verification.store_backend, config.verification.retention
    );

    let service: SharedVerificationService =
        VerificationService::new(store, identities, notifier, service_config);
    Ok(Arc::new(service))
}

async fn connect_database(config: &AppConfig) -> anyhow::Result<DatabasePool> {
    let pool = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to MySQL")?;
    pool.run_migrations()
        .await
        .context("failed to run database migrations")?;
    info!("{}", pool.get_statistics());
    Ok(pool)
}

/// Periodically delete MySQL records older than both windows
fn spawn_purge_task(store: Arc<MySqlVerificationStore>, config: &AppConfig) {
    let horizon = chrono::Duration::seconds(config.verification.record_ttl().as_secs() as i64);

    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match store.purge_minted_before(chrono::Utc::now() - horizon).await {
                Ok(purged) if purged > 0 => info!("Purged {} stale verification records", purged),
                Ok(_) => {}
                Err(e) => warn!("Failed to purge stale verification records: {}", e),
            }
        }
    });
}
