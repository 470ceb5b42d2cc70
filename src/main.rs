// src/main.rs

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use plant_shift_api::{
    advisory::AdvisoryClient,
    auth,
    build_router,
    config::{Config, StoreBackend},
    db::{self, MemoryStore, PgStore, Store},
    AppState,
};

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    let cfg = Config::from_env()?;
    init_tracing(cfg.log_json);

    let store: Arc<dyn Store> = match cfg.store {
        StoreBackend::Postgres => {
            let url = cfg
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            Arc::new(PgStore::new(db::connect(url, cfg.db_max_connections).await?))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if let Some((email, password)) = &cfg.bootstrap_admin {
        auth::ensure_admin(store.as_ref(), email, password)
            .await
            .map_err(|e| anyhow::anyhow!("bootstrap admin: {e}"))?;
    }

    let advisory = AdvisoryClient::new(cfg.advisory.clone())?;
    if !advisory.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set; advisory endpoints will report it");
    }

    let api = build_router(AppState::new(store.clone(), advisory));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, store = store.backend_tag(), "API listening");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
