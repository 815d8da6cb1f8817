// Adapters layer: concrete implementations of the domain ports (http, demo data, notifications).

pub mod demo;
pub mod http;
pub mod notify;

pub use demo::DemoCatalog;
pub use http::StorefrontClient;
pub use notify::{MemoryNotifier, TracingNotifier};
