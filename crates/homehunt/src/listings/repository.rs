use async_trait::async_trait;

use super::domain::{InsertReceipt, Listing, NewListing};

/// Storage abstraction over the hosted listing table.
///
/// `fetch_all` returns every listing newest first; filtering never happens here.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Listing>, FetchError>;
    async fn insert(&self, record: NewListing) -> Result<InsertReceipt, PersistError>;
}

/// Dataset load failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("listing store unreachable: {0}")]
    Transport(String),
    #[error("listing store refused the request: {0}")]
    Unauthorized(String),
}

/// Write failure, including constraint violations raised by the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    #[error("listing rejected by store constraint: {0}")]
    Constraint(String),
    #[error("listing store unavailable: {0}")]
    Unavailable(String),
}
