use std::sync::Arc;

use osb_core::config::Config;
use osb_store::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), osb_core::Error> {
    osb_core::logging::init("osb")?;

    let cfg = Arc::new(Config::load()?);

    let store = Arc::new(SqliteStore::open(&cfg.database_path)?);

    osb_telegram::router::run_polling(cfg, store.clone(), store)
        .await
        .map_err(|e| osb_core::Error::Delivery(format!("telegram bot failed: {e}")))?;

    Ok(())
}
