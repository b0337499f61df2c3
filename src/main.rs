use anyhow::Result;
use tracing::info;

use site_cms::{Config, ContentService, ContentStore, Locale, NewsletterService, ENTITIES};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_cms=info".parse()?),
        )
        .init();

    info!("Starting site-cms content backend");

    let config = Config::from_env()?;
    let store = ContentStore::open(&config.database_path)?;
    let locale = Locale::resolve(Some(&config.fallback_locale));

    // Smoke-read every entity so a broken store surfaces at startup
    for entity in ENTITIES {
        let service = ContentService::new(store.clone(), entity);
        if entity.is_singleton() {
            let present = service.get(locale).await?.is_some();
            info!(entity = entity.name, present, "singleton entity");
        } else {
            let count = service.get_all(locale).await?.len();
            info!(entity = entity.name, count, "list entity");
        }
    }

    let newsletter = NewsletterService::new(store);
    let subscribers = newsletter.list_active().await?.len();
    info!(subscribers, "active newsletter subscribers");

    info!("Content store ready at {}", config.database_path);
    Ok(())
}
