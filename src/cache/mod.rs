pub mod error;
pub mod keys;
pub mod store;
pub mod view;

pub use error::CacheError;
pub use keys::{address, encode, filtered_address_prefix, root_address, CacheAddress, KeyObject};
pub use store::QueryCacheManager;
pub use view::QueryView;

use crate::config::Config;

pub fn init_cache<V>(config: &Config) -> QueryCacheManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    QueryCacheManager::from_config(config)
}
