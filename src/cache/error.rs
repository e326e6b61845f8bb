use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Refusing to fetch for an empty cache address")]
    EmptyAddress,

    #[error("Fetch for {address} failed: {message}")]
    Fetch { address: String, message: String },

    #[error("Fetch for {0} was superseded by a newer filter")]
    Superseded(String),

    #[error("Invalidation rejected: {0}")]
    Invalidation(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] ValidationError),
}
