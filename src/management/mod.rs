mod auth;
mod catalog;

pub use auth::TokenManager;
pub use catalog::CatalogPipeline;
