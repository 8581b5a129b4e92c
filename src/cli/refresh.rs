use super::ui;
use crate::core::AssetCatalogCache;
use anyhow::Result;

/// Fetches and stores the asset catalog, waiting for the result.
pub async fn run(cache: &AssetCatalogCache) -> Result<()> {
    let spinner = ui::new_spinner("Fetching asset catalog...");
    let refreshed = cache.refresh_now().await;
    spinner.finish_and_clear();

    let catalog = refreshed?;
    println!(
        "Asset catalog refreshed: {} cryptocurrencies, {} currencies",
        ui::style_text(&catalog.crypto_count().to_string(), ui::StyleType::Value),
        ui::style_text(&catalog.currency_count().to_string(), ui::StyleType::Value),
    );
    Ok(())
}
