use crate::domain::card_info::{CardInfo, InvoiceData};
use crate::domain::gateway::{GatewayDescriptor, GatewayId, GatewayKind};
use crate::domain::order::{Order, OrderId};
use crate::domain::token::{CustomerId, ExternalToken, Token, TokenId};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub type TokenRepositoryRef = Arc<dyn TokenRepository>;
pub type TokenCacheRef = Arc<dyn TokenCache>;
pub type OrderRepositoryRef = Arc<dyn OrderRepository>;
pub type ReepayApiRef = Arc<dyn ReepayApi>;
pub type GatewayCatalogRef = Arc<dyn GatewayCatalog>;

/// Authoritative store of token records.
///
/// Single source of truth; supports unique lookup by external token
/// string in addition to the primary id lookup.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persists `token`, assigning a local id.
    ///
    /// Inserting a token whose external string is already mapped returns
    /// the record already stored under that string; the mapping is never
    /// repointed.
    async fn insert(&self, token: Token) -> Result<Token>;
    async fn get(&self, id: TokenId) -> Result<Option<Token>>;
    async fn find_by_external(&self, external: &ExternalToken) -> Result<Option<Token>>;
    async fn remove(&self, id: TokenId) -> Result<()>;
}

/// Rebuildable index from external token string to local id.
///
/// Never the sole source of truth; writers treat `put` as best-effort.
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn get(&self, external: &ExternalToken) -> Result<Option<TokenId>>;
    async fn put(&self, external: &ExternalToken, id: TokenId) -> Result<()>;
    async fn remove(&self, external: &ExternalToken) -> Result<()>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;
    async fn save(&self, order: &Order) -> Result<()>;
}

/// A failed call against the remote processor. Callers map this into
/// `RemoteLookup` or `RemoteDelete` depending on the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError(pub String);

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for RemoteError {}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// The external payment processor. Implementations own transport,
/// authentication, timeouts, and retry policy; this engine treats each
/// call as a single synchronous attempt.
#[async_trait]
pub trait ReepayApi: Send + Sync {
    /// Resolves a local customer id to the processor's customer handle.
    async fn customer_handle(&self, customer: CustomerId) -> RemoteResult<String>;

    /// Fetches card/wallet metadata for a stored token. `Ok(None)` means
    /// the processor knows no such card.
    async fn card_info(
        &self,
        handle: &str,
        token: &ExternalToken,
    ) -> RemoteResult<Option<CardInfo>>;

    /// Fetches invoice/transaction history for an order.
    async fn invoice_data(&self, order: OrderId) -> RemoteResult<InvoiceData>;

    /// Deletes the stored payment method remotely.
    async fn delete_payment_method(&self, token: &ExternalToken) -> RemoteResult<()>;
}

/// Registry of payment-method integrations known to the platform.
pub trait GatewayCatalog: Send + Sync {
    fn get(&self, id: &GatewayId) -> Option<GatewayDescriptor>;
    fn by_kind(&self, kind: GatewayKind) -> Option<GatewayDescriptor>;
}
