pub mod cart;
pub mod catalog;
pub mod gate;
pub mod sequence;
pub mod session;

pub use crate::domain::model::{CartLine, CatalogItem, PrescriptionStatus};
pub use crate::domain::ports::{CatalogSource, Notice, NotificationSink};
pub use crate::utils::error::Result;
