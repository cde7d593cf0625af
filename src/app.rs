/*
 * Responsibility
 * - Config読み込み → 依存生成 (IdentityStore / TokenCodec / AuthGateway) → Router 組み立て
 * - Middleware の適用 (auth gateway / request id / trace / timeout)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health::health};
use crate::config::Config;
use crate::middleware;
use crate::repos::{
    member_repo::{self, PgMemberRepo},
    memory_member_store::InMemoryMemberStore,
};
use crate::services::auth::{build_gateway, build_token_codec};
use crate::services::identity::{IdentityStore, seed_dev_members};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,member_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(?config, "starting member gateway");
    tracing::warn!(
        "paths outside /api/ are anonymous-allowed; the gateway only resolves identity, \
         per-route authorization is up to handlers"
    );

    let store = build_store(&config).await?;
    if config.seed_dev_members {
        seed_dev_members(store.as_ref())
            .await
            .context("failed to seed development members")?;
    }

    let codec = build_token_codec(&config);
    let gateway = build_gateway(codec, store.clone());
    let state = AppState::new(gateway, store, config.cookie_secure);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!(addr = %config.addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn IdentityStore>> {
    match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            member_repo::ensure_schema(&db)
                .await
                .context("failed to prepare members table")?;
            Ok(Arc::new(PgMemberRepo::new(db)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory identity store");
            Ok(Arc::new(InMemoryMemberStore::new()))
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes());

    // gateway はフルパスを見るため nest 後に掛ける
    let router = middleware::auth::access::apply(router, state.clone()).with_state(state);

    middleware::http::apply(router)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
