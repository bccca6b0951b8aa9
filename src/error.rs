use thiserror::Error;

pub type Result<T> = std::result::Result<T, TokenError>;

/// Failures surfaced by the token engine.
///
/// Normal absence (no token on an order, an empty fallback chain, a
/// not-found store lookup) is modeled as `Ok(None)` by callers, never as a
/// variant here.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("remote lookup failed: {0}")]
    RemoteLookup(String),
    #[error("no card data for token: {0}")]
    CardNotFound(String),
    #[error("persistence failed: {0}")]
    Persistence(String),
    #[error("remote delete failed: {0}")]
    RemoteDelete(String),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for TokenError {
    fn from(e: rocksdb::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}
