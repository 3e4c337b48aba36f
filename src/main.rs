use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use unsplash_feed::application::{BrowsingSession, NotificationManager};
use unsplash_feed::domain::RequestStatus;
use unsplash_feed::domain::entities::ImageLoadedEvent;
use unsplash_feed::infrastructure::cache::MemoryCacheStore;
use unsplash_feed::infrastructure::{
    AppConfig, CliArgs, ReqwestTransport, StorageManager, TieredCacheStore, UnsplashClient,
};

const IMAGE_DRAIN_TIMEOUT: Duration = Duration::from_secs(15);

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let file_layer = match config.effective_log_path() {
        Some(log_path) => {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)?;
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    Ok(())
}

async fn open_cache(config: &AppConfig) -> Result<Arc<TieredCacheStore>> {
    let cache = if config.cache.disk_enabled {
        TieredCacheStore::open(
            config.cache.memory_capacity,
            config.cache.disk_capacity,
            config.cache.disk_dir.clone(),
        )
        .await?
    } else {
        info!("Disk cache disabled");
        TieredCacheStore::memory_only(Arc::new(MemoryCacheStore::new(
            config.cache.memory_capacity,
        )))
    };
    Ok(Arc::new(cache))
}

/// Scrolls through the feed the way a grid would: every newly loaded row is
/// shown, its image requested, and the next row reported as lookahead.
async fn scroll(
    session: &BrowsingSession,
    notifications: &mut NotificationManager,
    pages: u32,
) -> usize {
    let mut status = session.subscribe_status();
    let mut shown = 0usize;

    session.start();

    loop {
        let Some(current) = status.wait_for(RequestStatus::is_terminal).await else {
            break;
        };

        if notifications.observe_status(&current) {
            if let Some(alert) = notifications.current_notification() {
                error!(title = %alert.title, message = %alert.message, "Feed alert");
            }
            notifications.dismiss();
            break;
        }

        let feed = session.feed_snapshot();
        let last_page = session.controller().page_cursor() >= pages;
        let mut requested = None;
        for (row, record) in feed.iter().enumerate().skip(shown) {
            info!(
                row,
                author = record.author(),
                color = record.color(),
                display_height = record.display_height(400.0),
                "Row visible"
            );
            session.request_cell_image(row);
            if last_page {
                continue;
            }
            if let Some(page) = session.on_lookahead(&[row + 1]).requested_page {
                requested = Some(page);
            }
        }
        shown = feed.len();

        if matches!(current, RequestStatus::SucceededEmpty) {
            info!("Listing exhausted");
            break;
        }
        if last_page {
            break;
        }
        if requested.is_none() {
            warn!(rows = shown, "No further page requested");
            break;
        }
    }

    shown
}

async fn drain_images(mut events: mpsc::UnboundedReceiver<ImageLoadedEvent>, expected: usize) {
    let mut loaded = 0usize;
    let mut failed = 0usize;

    while loaded + failed < expected {
        match tokio::time::timeout(IMAGE_DRAIN_TIMEOUT, events.recv()).await {
            Ok(Some(event)) => match event.result {
                Ok(image) => {
                    loaded += 1;
                    info!(
                        photo = %event.photo_id,
                        author = %event.author,
                        source = %image.source,
                        width = image.image.width(),
                        height = image.image.height(),
                        "Image loaded"
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!(photo = %event.photo_id, error = %e, "Image failed");
                }
            },
            Ok(None) => break,
            Err(_) => {
                warn!(pending = expected - loaded - failed, "Timed out waiting for images");
                break;
            }
        }
    }

    info!(loaded, failed, "Image loading finished");
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let pages = args.pages.max(1);

    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);

    init_logging(&config)?;
    info!(version = unsplash_feed::VERSION, "Starting {}", unsplash_feed::NAME);

    let token = config
        .access_token()
        .ok_or_else(|| eyre!("no access key: set UNSPLASH_ACCESS_KEY or pass --access-key"))?;

    let cache = open_cache(&config).await?;
    let transport = Arc::new(ReqwestTransport::new()?);
    let client = Arc::new(UnsplashClient::new(
        transport,
        cache.clone(),
        token,
        config.fetch_client_config(),
    ));

    let (image_tx, image_rx) = mpsc::unbounded_channel();
    let session = BrowsingSession::new(client.clone(), client, image_tx);
    let mut notifications =
        NotificationManager::new(Duration::from_secs(config.notifications.duration_secs));

    let shown = scroll(&session, &mut notifications, pages).await;
    drop(session);
    drain_images(image_rx, shown).await;

    let stats = cache.memory_stats().await;
    info!(
        hits = stats.hits,
        misses = stats.misses,
        hit_rate = stats.hit_rate,
        entries = stats.entries,
        resident_bytes = stats.resident_bytes,
        disk_bytes = cache.disk_size(),
        "Cache statistics"
    );

    Ok(())
}
