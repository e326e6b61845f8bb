pub mod cache;
pub mod config;
pub mod models;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use cache::{
    address, encode, filtered_address_prefix, root_address, CacheAddress, CacheError,
    QueryCacheManager, QueryView,
};
pub use config::Config;
pub use models::{DateField, DateMode, FilterDescriptor, Scope};
pub use validation::{validate_filter, ValidationError};
