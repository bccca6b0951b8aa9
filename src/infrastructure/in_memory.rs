use crate::domain::gateway::{GatewayDescriptor, GatewayId, GatewayKind};
use crate::domain::order::{Order, OrderId};
use crate::domain::ports::{GatewayCatalog, OrderRepository, TokenCache, TokenRepository};
use crate::domain::token::{ExternalToken, Token, TokenId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct TokenTable {
    tokens: HashMap<TokenId, Token>,
    by_external: HashMap<ExternalToken, TokenId>,
}

/// A thread-safe in-memory token repository.
///
/// Keeps a unique secondary index by external token string; inserting a
/// string that is already mapped returns the existing record instead of
/// repointing the mapping.
#[derive(Default, Clone)]
pub struct InMemoryTokenRepository {
    table: Arc<RwLock<TokenTable>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn insert(&self, mut token: Token) -> Result<Token> {
        let mut table = self.table.write().await;
        if let Some(id) = table.by_external.get(&token.external)
            && let Some(existing) = table.tokens.get(id)
        {
            return Ok(existing.clone());
        }

        let id = TokenId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        token.id = Some(id);
        table.by_external.insert(token.external.clone(), id);
        table.tokens.insert(id, token.clone());
        Ok(token)
    }

    async fn get(&self, id: TokenId) -> Result<Option<Token>> {
        let table = self.table.read().await;
        Ok(table.tokens.get(&id).cloned())
    }

    async fn find_by_external(&self, external: &ExternalToken) -> Result<Option<Token>> {
        let table = self.table.read().await;
        let Some(id) = table.by_external.get(external) else {
            return Ok(None);
        };
        Ok(table.tokens.get(id).cloned())
    }

    async fn remove(&self, id: TokenId) -> Result<()> {
        let mut table = self.table.write().await;
        if let Some(token) = table.tokens.remove(&id) {
            table.by_external.remove(&token.external);
        }
        Ok(())
    }
}

/// Default entry limit for the in-memory cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Bounded in-memory cache of external token strings to local ids.
///
/// The cache is a rebuildable projection, so eviction picks an arbitrary
/// entry: a dropped mapping costs one extra authoritative read.
#[derive(Clone)]
pub struct InMemoryTokenCache {
    entries: Arc<RwLock<HashMap<ExternalToken, TokenId>>>,
    max_entries: usize,
}

impl Default for InMemoryTokenCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries,
        }
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn get(&self, external: &ExternalToken) -> Result<Option<TokenId>> {
        let entries = self.entries.read().await;
        Ok(entries.get(external).copied())
    }

    async fn put(&self, external: &ExternalToken, id: TokenId) -> Result<()> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(external)
            && entries.len() >= self.max_entries
            && let Some(evicted) = entries.keys().next().cloned()
        {
            entries.remove(&evicted);
        }
        entries.insert(external.clone(), id);
        Ok(())
    }

    async fn remove(&self, external: &ExternalToken) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(external);
        Ok(())
    }
}

/// A thread-safe in-memory order repository.
#[derive(Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn save(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order.clone());
        Ok(())
    }
}

/// Gateway catalog seeded with the two Reepay integrations, plus any
/// extra descriptors handed to it.
#[derive(Default, Clone)]
pub struct StaticGatewayCatalog {
    gateways: HashMap<GatewayId, GatewayDescriptor>,
}

impl StaticGatewayCatalog {
    /// Catalog with the card-checkout and wallet-recurring integrations
    /// registered.
    pub fn reepay() -> Self {
        Self::default()
            .with(GatewayDescriptor::new(
                GatewayId::checkout(),
                GatewayKind::Checkout,
            ))
            .with(GatewayDescriptor::new(
                GatewayId::wallet_recurring(),
                GatewayKind::WalletRecurring,
            ))
    }

    pub fn with(mut self, descriptor: GatewayDescriptor) -> Self {
        self.gateways.insert(descriptor.id.clone(), descriptor);
        self
    }
}

impl GatewayCatalog for StaticGatewayCatalog {
    fn get(&self, id: &GatewayId) -> Option<GatewayDescriptor> {
        self.gateways.get(id).cloned()
    }

    fn by_kind(&self, kind: GatewayKind) -> Option<GatewayDescriptor> {
        self.gateways.values().find(|g| g.kind == kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{CustomerId, TokenKind};

    fn token(external: &str) -> Token {
        Token {
            id: None,
            gateway: GatewayId::wallet_recurring(),
            customer: CustomerId(1),
            external: ExternalToken::new(external),
            kind: TokenKind::WalletRecurring,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = InMemoryTokenRepository::new();
        let a = repo.insert(token("rp_a")).await.unwrap();
        let b = repo.insert(token("rp_b")).await.unwrap();
        assert_eq!(a.id, Some(TokenId(1)));
        assert_eq!(b.id, Some(TokenId(2)));
    }

    #[tokio::test]
    async fn test_insert_same_external_returns_existing() {
        let repo = InMemoryTokenRepository::new();
        let first = repo.insert(token("rp_a")).await.unwrap();
        let second = repo.insert(token("rp_a")).await.unwrap();
        assert_eq!(first.id, second.id);

        let found = repo
            .find_by_external(&ExternalToken::new("rp_a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn test_remove_drops_secondary_index() {
        let repo = InMemoryTokenRepository::new();
        let stored = repo.insert(token("rp_a")).await.unwrap();
        repo.remove(stored.id.unwrap()).await.unwrap();

        assert!(repo.get(stored.id.unwrap()).await.unwrap().is_none());
        assert!(
            repo.find_by_external(&ExternalToken::new("rp_a"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_cache_evicts_at_capacity() {
        let cache = InMemoryTokenCache::with_capacity(1);
        let a = ExternalToken::new("rp_a");
        let b = ExternalToken::new("rp_b");

        cache.put(&a, TokenId(1)).await.unwrap();
        cache.put(&b, TokenId(2)).await.unwrap();

        assert_eq!(cache.get(&a).await.unwrap(), None);
        assert_eq!(cache.get(&b).await.unwrap(), Some(TokenId(2)));
    }

    #[tokio::test]
    async fn test_cache_overwrite_does_not_evict() {
        let cache = InMemoryTokenCache::with_capacity(1);
        let a = ExternalToken::new("rp_a");

        cache.put(&a, TokenId(1)).await.unwrap();
        cache.put(&a, TokenId(2)).await.unwrap();

        assert_eq!(cache.get(&a).await.unwrap(), Some(TokenId(2)));
    }

    #[test]
    fn test_catalog_membership() {
        let catalog = StaticGatewayCatalog::reepay().with(GatewayDescriptor::new(
            GatewayId::new("stripe"),
            GatewayKind::ThirdParty,
        ));

        assert!(
            catalog
                .get(&GatewayId::checkout())
                .is_some_and(|g| g.kind.is_reepay())
        );
        assert!(
            catalog
                .get(&GatewayId::new("stripe"))
                .is_some_and(|g| !g.kind.is_reepay())
        );
        assert!(catalog.get(&GatewayId::new("unknown")).is_none());
        assert_eq!(
            catalog.by_kind(GatewayKind::WalletRecurring).map(|g| g.id),
            Some(GatewayId::wallet_recurring())
        );
    }
}
