//! Core business logic abstractions

pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod log;
pub mod preferences;
pub mod quote;
pub mod rate;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod store;

// Re-export main types for cleaner imports
pub use catalog::{AssetCatalog, AssetCatalogCache};
pub use error::QuoteError;
pub use quote::{AssetLists, RemoteQuoteClient};
pub use rate::{ConversionMode, QuotePair, Rate};
pub use resolver::RateResolver;
pub use session::{Conversion, ConversionSession};
