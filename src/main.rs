use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studentdesk::api::router;
use studentdesk::config::AppConfig;
use studentdesk::db;
use studentdesk::state::AppState;
use studentdesk::storage::{DisabledObjectStore, HttpObjectStore, ObjectStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "studentdesk=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config.database_url).await?;
    db::migrate(&pool).await?;

    let catalog = config.load_catalog()?;
    info!("course catalog: {} courses", catalog.courses().len());

    let storage: Arc<dyn ObjectStore> = match config.storage.clone() {
        Some(storage) => Arc::new(HttpObjectStore::new(storage)?),
        None => {
            warn!("STORAGE_URL/STORAGE_KEY not set; photo uploads are disabled");
            Arc::new(DisabledObjectStore)
        }
    };

    let state = AppState {
        db: pool.clone(),
        storage,
        catalog: Arc::new(catalog),
        grid_window: config.grid_window,
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
