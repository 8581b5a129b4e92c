pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::preferences::Preferences;
use crate::core::store::{AssetCatalogStore, DocumentStore};
use crate::core::{
    AssetCatalogCache, Conversion, ConversionMode, ConversionSession, QuotePair, RateResolver,
    RemoteQuoteClient,
};
use crate::providers::CoinGeckoClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Inputs shared by the `convert` and `watch` commands.
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub amount: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub rate: Option<String>,
    pub invert: bool,
}

pub enum AppCommand {
    Convert(ConvertArgs),
    Watch(ConvertArgs),
    Assets { filter: Option<String> },
    Refresh,
}

/// Everything a command needs, wired from one configuration.
struct App {
    config: AppConfig,
    store: Arc<dyn DocumentStore>,
    client: Arc<dyn RemoteQuoteClient>,
    cache: Arc<AssetCatalogCache>,
}

impl App {
    fn open(config_path: Option<&str>) -> Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::load_from_path(path)?,
            None => AppConfig::load()?,
        };
        debug!("Loaded config: {config:#?}");

        let store = store::open_store(&config);
        let coingecko = &config.providers.coingecko;
        let client: Arc<dyn RemoteQuoteClient> = Arc::new(CoinGeckoClient::new(
            &coingecko.base_url,
            coingecko.api_key.as_deref(),
            config.request_timeout(),
        )?);
        let cache = AssetCatalogCache::new(
            Arc::clone(&client),
            AssetCatalogStore::new(Arc::clone(&store)),
        );

        Ok(Self {
            config,
            store,
            client,
            cache,
        })
    }

    async fn start_session(&self, args: &ConvertArgs) -> ConversionSession {
        let saved = Preferences::load(self.store.as_ref()).pair();
        let pair = QuotePair::new(
            args.from.as_deref().unwrap_or(saved.source()),
            args.to.as_deref().unwrap_or(saved.target()),
        );

        let mode = if args.rate.is_some() {
            ConversionMode::Manual
        } else {
            ConversionMode::Live
        };
        // Manual rates never consult the catalog
        if mode == ConversionMode::Live {
            let spinner = cli::ui::new_spinner("Loading asset catalog...");
            self.cache.load().await;
            spinner.finish_and_clear();
        }

        let resolver = RateResolver::new(
            Arc::clone(&self.cache),
            Arc::clone(&self.client),
            self.config.request_timeout(),
        );
        let mut session = ConversionSession::new(resolver, pair);
        session.set_amount(args.amount.as_str());
        session.set_mode(mode);
        session.set_inverted(args.invert);
        if let Some(rate) = &args.rate {
            session.set_manual_rate(rate.as_str());
        }
        session
    }

    async fn convert_once(&self, args: &ConvertArgs) -> Conversion {
        let mut session = self.start_session(args).await;
        let conversion = session.convert().await;
        self.save_preferences(&session);
        conversion
    }

    fn save_preferences(&self, session: &ConversionSession) {
        if let Err(e) = session.preferences().save(self.store.as_ref()) {
            warn!("Preferences not saved: {:#}", e);
        }
    }

    /// Lets a background catalog refresh land so the next launch starts fresh.
    ///
    /// The wait covers a list fetch where every attempt runs into its timeout.
    async fn close(&self) {
        let deadline = CoinGeckoClient::asset_lists_deadline(self.config.request_timeout());
        self.cache.settle(deadline).await;
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("coinconv starting...");
    let app = App::open(config_path)?;

    let result = match command {
        AppCommand::Refresh => cli::refresh::run(&app.cache).await,
        AppCommand::Assets { filter } => cli::assets::run(&app.cache, filter.as_deref()).await,
        AppCommand::Convert(args) => cli::convert::run(&app.convert_once(&args).await),
        AppCommand::Watch(args) => {
            let mut session = app.start_session(&args).await;
            let result = cli::watch::run(&mut session, app.config.refresh_interval()).await;
            app.save_preferences(&session);
            result
        }
    };

    app.close().await;
    result
}

/// Converts once without printing and returns the conversion.
///
/// Same flow as the `convert` command, including the saved pair.
pub async fn convert(args: &ConvertArgs, config_path: Option<&str>) -> Result<Conversion> {
    let app = App::open(config_path)?;
    let conversion = app.convert_once(args).await;
    app.close().await;
    Ok(conversion)
}
