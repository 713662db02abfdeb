#![deny(unused_crate_dependencies)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod cache;
mod config;
mod error;
mod fetch;
mod menu;
mod parse;
mod tools;

use std::{sync::Arc, time::Duration};

use axum::http::Method;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

use crate::{
    cache::MenuCache,
    config::Config,
    fetch::{DebugDump, DiningHallClient},
    tools::MenuService,
};

pub use error::Result;

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Drops expired cache entries once per TTL.
fn spawn_sweeper(cache: Arc<MenuCache>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every.max(Duration::from_secs(1)));
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = cache.clean_expired().await;
            if removed > 0 {
                log::debug!("Swept {removed} expired cache entries");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {e}");
    }
    log::info!("shutting down");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let config = Config::from_env();
    log::debug!("{config:?}");

    let mut client = DiningHallClient::new(&config.base_url)?.with_timeout(config.request_timeout)?;
    if let Some(dir) = config.debug_dir.clone() {
        let dump = DebugDump::new(dir);
        log::info!("saving origin pages to {}", dump.dir().display());
        client = client.with_debug_dump(dump);
    }
    let cache = Arc::new(MenuCache::new(chrono::Duration::from_std(config.cache_ttl)?));
    log::info!("caching menus for {}s", cache.ttl().num_seconds());
    spawn_sweeper(Arc::clone(&cache), config.cache_ttl);
    let service = Arc::new(MenuService::new(client, cache));

    let compression_layer: CompressionLayer = CompressionLayer::new()
        .br(true)
        .deflate(true)
        .gzip(true)
        .zstd(true);
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);
    let app = tools::router(service)
        .layer(cors_layer)
        .layer(compression_layer);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    log::info!("listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
