pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{
    mysql::MySqlSource,
    page::{BrowserlessPageSource, HttpPageSource},
    storage::LocalStorage,
};
pub use core::{
    etl::EtlEngine, listing_pipeline::ListingPipeline, query_pipeline::QueryPipeline,
};
pub use utils::error::{EtlError, Result};
