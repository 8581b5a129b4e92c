use super::ui;
use crate::core::{AssetCatalog, AssetCatalogCache};
use anyhow::{Result, bail};
use comfy_table::Cell;
use std::sync::Arc;

/// Lists the supported cryptocurrencies and currencies.
pub async fn run(cache: &Arc<AssetCatalogCache>, filter: Option<&str>) -> Result<()> {
    let spinner = ui::new_spinner("Loading asset catalog...");
    let catalog = cache.load().await;
    spinner.finish_and_clear();

    let Some(catalog) = catalog else {
        bail!("No asset catalog available; check the network and run `coinconv refresh`");
    };

    let filter = filter.map(str::to_lowercase);
    let cryptos = matching_cryptos(&catalog, filter.as_deref());
    let currencies = matching_currencies(&catalog, filter.as_deref());

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Symbol"), ui::header_cell("Id")]);
    for (symbol, id) in &cryptos {
        table.add_row(vec![Cell::new(symbol.to_uppercase()), Cell::new(id)]);
    }

    println!(
        "{}\n",
        ui::style_text(
            &format!("Cryptocurrencies ({})", cryptos.len()),
            ui::StyleType::Title
        )
    );
    println!("{table}");
    println!(
        "\n{}\n",
        ui::style_text(
            &format!("Currencies ({})", currencies.len()),
            ui::StyleType::Title
        )
    );
    println!("{}", currencies.join(", "));

    if let Some(at) = cache.refresh_state().last_refreshed_at {
        println!(
            "\n{}",
            ui::style_text(
                &format!("Catalog refreshed at {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}

/// Crypto `(symbol, id)` pairs whose symbol or id contains `filter`, by symbol.
fn matching_cryptos<'a>(catalog: &'a AssetCatalog, filter: Option<&str>) -> Vec<(&'a str, &'a str)> {
    let mut cryptos: Vec<(&str, &str)> = catalog
        .crypto_ids()
        .iter()
        .map(|(symbol, id)| (symbol.as_str(), id.as_str()))
        .filter(|(symbol, id)| filter.is_none_or(|f| symbol.contains(f) || id.contains(f)))
        .collect();
    cryptos.sort_unstable();
    cryptos
}

fn matching_currencies(catalog: &AssetCatalog, filter: Option<&str>) -> Vec<String> {
    catalog
        .currencies()
        .filter(|unit| filter.is_none_or(|f| unit.contains(f)))
        .map(str::to_uppercase)
        .collect()
}
