pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use config::Config;
use database::create_database_pool;
use store::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Postgres when `DATABASE_URL` is configured, otherwise the in-memory store.
    /// Seeds the configured Admin account, if any.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => Arc::new(PgStore::new(create_database_pool(url).await?)),
            None => {
                log::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
                Arc::new(MemoryStore::new())
            }
        };

        if let Some(admin) = &config.admin {
            services::users::ensure_admin(store.as_ref(), admin)
                .await
                .context("failed to seed the admin account")?;
        }
        Ok(Self::new(store, config))
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        // Accounts
        .route("/users", post(handlers::auth::create_user))
        .route("/users/register", post(handlers::auth::register))
        .route("/users/login", post(handlers::auth::login))
        .route("/users/me", get(handlers::auth::me))
        // Suppliers
        .route(
            "/suppliers",
            post(handlers::suppliers::create_supplier).get(handlers::suppliers::list_suppliers),
        )
        .route("/suppliers/search", get(handlers::suppliers::search_suppliers))
        .route(
            "/suppliers/:id",
            get(handlers::suppliers::get_supplier)
                .put(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::delete_supplier),
        )
        // Inventory
        .route(
            "/inventory",
            post(handlers::inventory::create_item).get(handlers::inventory::list_items),
        )
        .route("/inventory/low-stock", get(handlers::inventory::low_stock_items))
        .route("/inventory/import", post(handlers::inventory::import_items))
        .route(
            "/inventory/:id",
            get(handlers::inventory::get_item)
                .put(handlers::inventory::update_item)
                .delete(handlers::inventory::delete_item),
        )
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
