#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::net::SocketAddr;

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::routing::get;
use axum_client_ip::ClientIpSource;
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::JwtKeys;
use crate::api::router;
use crate::clicks::ClickAccounting;
use crate::config::AppConfig;
use crate::config::Config;
use crate::redirect::RedirectSettings;
use crate::resolver::Resolver;
use crate::storage::Memory;
use crate::storage::Postgres;
use crate::storage::Storage;

mod analytics;
mod api;
mod clicks;
mod client_ip;
mod config;
mod error;
mod graceful_shutdown;
mod links;
mod password;
mod redirect;
mod resolver;
mod slugs;
mod storage;
#[cfg(test)]
mod tests;
mod users;
mod utils;

const DEFAULT_RUST_LOG: &str = "linkshort=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config::from_env()?;

    // background clicks, drained before exiting
    let tasks = TaskTracker::new();

    let app = setup_app(config.storage, &config.app, tasks.clone()).await?;

    tracing::info!("Listening on {}", config.address);

    let listener = TcpListener::bind(config.address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(graceful_shutdown::handler())
    .await?;

    tasks.close();
    tracing::info!("Waiting for {} pending clicks", tasks.len());
    tasks.wait().await;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if the storage can not be reached or migrated
pub async fn setup_app(
    storage_config: storage::Config,
    config: &AppConfig,
    tasks: TaskTracker,
) -> Result<Router> {
    let router = match storage_config {
        storage::Config::Memory => create_router(Memory::new(), config, tasks),
        storage::Config::Postgres(database_url) => {
            create_router(Postgres::connect(&database_url).await?, config, tasks)
        }
    };

    Ok(router)
}

/// Create the router for Linkshort
fn create_router<S: Storage>(storage: S, config: &AppConfig, tasks: TaskTracker) -> Router {
    let accounting = ClickAccounting::new(storage.clone(), config.click_dispatch, tasks);
    let resolver = Resolver::new(storage.clone(), accounting, config.resolve_cache_ttl);

    let jwt_keys = JwtKeys::new(config.jwt_secret.as_bytes());

    let redirect_settings = RedirectSettings {
        countdown_seconds: config.countdown_seconds,
    };

    Router::new()
        .nest("/api", router::<S>())
        .route("/s/{short_code}", get(redirect::redirect::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(ClientIpSource::ConnectInfo.into_extension())
        .layer(Extension(storage))
        .layer(Extension(resolver))
        .layer(Extension(jwt_keys))
        .layer(Extension(redirect_settings))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}
