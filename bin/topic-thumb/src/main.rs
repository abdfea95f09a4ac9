//! # topic-thumb Binary
//!
//! Assembles the webhook receiver from compile-time features and runtime
//! configuration.

use std::sync::Arc;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tt_api::AppState;
use tt_auth_hmac::{HmacWebhookVerifier, UnsignedWebhookVerifier};
use tt_config::Settings;
use tt_core::hooks::{HookRegistry, ThumbnailHook};
use tt_core::traits::{ForumStore, SiteSettings, WebhookVerifier};

#[cfg(not(any(feature = "db-sqlite", feature = "store-memory")))]
compile_error!("enable at least one store feature: db-sqlite or store-memory");

type Stores = (Arc<dyn ForumStore>, Arc<dyn SiteSettings>);

#[cfg(feature = "db-sqlite")]
async fn open_store(settings: &Settings) -> anyhow::Result<Stores> {
    let store = Arc::new(tt_db_sqlite::SqliteForumStore::new(&settings.database.url).await?);
    let forum: Arc<dyn ForumStore> = store.clone();
    let site: Arc<dyn SiteSettings> = store;
    Ok((forum, site))
}

#[cfg(all(feature = "store-memory", not(feature = "db-sqlite")))]
async fn open_store(_settings: &Settings) -> anyhow::Result<Stores> {
    tracing::warn!("using the in-memory store; nothing survives a restart");
    let store = Arc::new(tt_store_memory::MemoryForumStore::new());
    let forum: Arc<dyn ForumStore> = store.clone();
    let site: Arc<dyn SiteSettings> = store;
    Ok((forum, site))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_verifier(settings: &Settings) -> Box<dyn WebhookVerifier> {
    match &settings.webhook.secret {
        Some(secret) => Box::new(HmacWebhookVerifier::new(secret.clone())),
        None => Box::new(UnsignedWebhookVerifier::new()),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(settings.log.json);

    // 1. Host adapter
    let (store, site_settings) = open_store(&settings).await?;

    // 2. Hooks
    let mut hooks = HookRegistry::new();
    hooks.register(Arc::new(ThumbnailHook::new(store.clone(), site_settings)));

    // 3. Shared state
    let state = web::Data::new(AppState {
        store,
        hooks: Arc::new(hooks),
        verifier: build_verifier(&settings),
    });

    let (host, port) = settings.bind_addr();
    tracing::info!(%host, port, "topic-thumb listening");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(tt_api::middleware::security_headers())
            .wrap(tt_api::middleware::standard_middleware())
            .configure(tt_api::configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
