use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use flipwatch_connect::ShareApiClient;
use flipwatch_core::{
    migration::LegacyFavoritesRepositoryTrait,
    share::{ShareService, ShareServiceTrait},
    watchlists::{WatchlistService, WatchlistServiceTrait},
};
use flipwatch_storage_sqlite::{db, WatchlistRecordRepository};

pub struct AppState {
    pub watchlist_service: Arc<dyn WatchlistServiceTrait + Send + Sync>,
    pub share_service: Arc<dyn ShareServiceTrait + Send + Sync>,
    pub public_url: String,
    pub share_timeout: Duration,
}

pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);
    let pool = db::create_pool(&config.db_path)?;
    db::run_migrations(&pool)?;

    let repository = Arc::new(WatchlistRecordRepository::new(
        pool.clone(),
        config.store_key.clone(),
    ));
    let watchlist_service = Arc::new(WatchlistService::new(repository.clone(), config.limits)?);
    migrate_legacy_favorites(watchlist_service.as_ref(), repository.as_ref())?;

    let share_api = Arc::new(ShareApiClient::new(
        &config.share_api_url,
        config.share_api_token.as_deref(),
        config.request_timeout,
    )?);
    let share_service = Arc::new(ShareService::new(share_api));

    Ok(Arc::new(AppState {
        watchlist_service,
        share_service,
        public_url: config.public_url.clone(),
        share_timeout: config.share_timeout,
    }))
}

/// Folds the legacy favorites record into the default watchlist on first start.
fn migrate_legacy_favorites(
    watchlists: &dyn WatchlistServiceTrait,
    legacy: &dyn LegacyFavoritesRepositoryTrait,
) -> anyhow::Result<()> {
    if watchlists.is_migrated()? {
        return Ok(());
    }
    let favorites = legacy
        .load_legacy_favorites()?
        .map(|record| record.ordered())
        .unwrap_or_default();
    let appended = watchlists.migrate_from_favorites(&favorites)?;
    tracing::info!(
        "Legacy favorites migrated: {} of {} appended to the default watchlist",
        appended,
        favorites.len()
    );
    Ok(())
}
