pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::{DemoCatalog, MemoryNotifier, StorefrontClient, TracingNotifier};
pub use app::{recovery::DeliveryRecovery, storefront::Storefront};
pub use config::StorefrontConfig;
pub use core::{cart::Cart, catalog::Catalog, session::CartSession};
pub use utils::error::{Result, StoreError};
