pub mod recovery;
pub mod storefront;
