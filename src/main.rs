//! Old Souqs storefront server.

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use souq_storefront::auth::TokenIssuer;
use souq_storefront::config::StoreBackend;
use souq_storefront::images::ImageHost;
use souq_storefront::publisher::EventPublisher;
use souq_storefront::store::Stores;
use souq_storefront::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(config.json_logs);

    let stores = match config.store {
        StoreBackend::Postgres => {
            let url = config.database_url.as_ref().context("DATABASE_URL is required")?;
            let db = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(config.request_timeout)
                .connect(url.expose_secret())
                .await
                .context("failed to connect to database")?;
            sqlx::migrate!("./migrations").run(&db).await.context("failed to run migrations")?;
            Stores::postgres(db)
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Stores::memory()
        }
    };

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "Failed to connect to NATS, events will not be published");
                None
            }
        },
        None => None,
    };

    let images = config.images.clone().map(ImageHost::new).transpose().context("failed to build image host client")?;
    if images.is_none() {
        warn!("Image host credentials not set, uploads are disabled");
    }

    let state = AppState::new(stores, TokenIssuer::new(&config.auth), images, EventPublisher::new(nats));
    let app = router(state, config.request_timeout);

    let addr = config.socket_addr();
    info!(%addr, "Storefront listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "souq_storefront=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
