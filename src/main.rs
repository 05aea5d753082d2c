use anyhow::{Context, Result};
use tracing::info;

use wxcollector::{
    Collector, CollectorConfig, HttpSources, JsonFileStore, VERSION, logging, write_document,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = CollectorConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging);
    info!("wxcollector {} starting", VERSION);

    let store = JsonFileStore::open(&config.paths.state_dir).with_context(|| {
        format!(
            "Failed to open state directory {}",
            config.paths.state_dir.display()
        )
    })?;
    let sources = HttpSources::new(&config).context("Failed to build HTTP sources")?;

    let collector = Collector::new(sources, &store, &config)?;
    let document = collector.run().await;

    write_document(&document, &config.paths.output).with_context(|| {
        format!("Failed to write {}", config.paths.output.display())
    })?;

    let failed = document.sources.values().filter(|s| !s.is_ok()).count();
    info!(
        sources = document.sources.len(),
        failed,
        "Update complete"
    );
    Ok(())
}
