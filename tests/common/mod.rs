#![allow(dead_code)]

use async_trait::async_trait;
use reepay_tokens::application::{
    TokenBinder, TokenFactory, TokenLifecycle, TokenResolver, TokenStore,
};
use reepay_tokens::domain::card_info::{CardInfo, InvoiceData};
use reepay_tokens::domain::order::{Order, OrderId};
use reepay_tokens::domain::ports::{
    ReepayApi, RemoteError, RemoteResult, TokenCacheRef, TokenRepositoryRef,
};
use reepay_tokens::domain::token::{CustomerId, ExternalToken};
use reepay_tokens::infrastructure::in_memory::{
    InMemoryOrderRepository, InMemoryTokenCache, InMemoryTokenRepository, StaticGatewayCatalog,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeState {
    cards: HashMap<String, CardInfo>,
    invoices: HashMap<u64, InvoiceData>,
    fail_card_info: bool,
    fail_invoice: bool,
    fail_delete: bool,
    deleted: Vec<String>,
}

/// Scriptable stand-in for the remote processor.
#[derive(Default)]
pub struct FakeReepayApi {
    state: Mutex<FakeState>,
}

impl FakeReepayApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_card(&self, token: &str, info: CardInfo) {
        self.state.lock().unwrap().cards.insert(token.to_string(), info);
    }

    pub fn set_invoice(&self, order: OrderId, data: InvoiceData) {
        self.state.lock().unwrap().invoices.insert(order.0, data);
    }

    pub fn fail_card_info(&self) {
        self.state.lock().unwrap().fail_card_info = true;
    }

    pub fn fail_invoice(&self) {
        self.state.lock().unwrap().fail_invoice = true;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }
}

#[async_trait]
impl ReepayApi for FakeReepayApi {
    async fn customer_handle(&self, customer: CustomerId) -> RemoteResult<String> {
        Ok(format!("customer-{}", customer.0))
    }

    async fn card_info(
        &self,
        _handle: &str,
        token: &ExternalToken,
    ) -> RemoteResult<Option<CardInfo>> {
        let state = self.state.lock().unwrap();
        if state.fail_card_info {
            return Err(RemoteError("card info endpoint unavailable".to_string()));
        }
        Ok(state.cards.get(token.as_str()).cloned())
    }

    async fn invoice_data(&self, order: OrderId) -> RemoteResult<InvoiceData> {
        let state = self.state.lock().unwrap();
        if state.fail_invoice {
            return Err(RemoteError("invoice endpoint unavailable".to_string()));
        }
        Ok(state.invoices.get(&order.0).cloned().unwrap_or_default())
    }

    async fn delete_payment_method(&self, token: &ExternalToken) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(RemoteError("delete endpoint unavailable".to_string()));
        }
        state.deleted.push(token.as_str().to_string());
        Ok(())
    }
}

/// Fully wired engine over in-memory adapters and the fake processor.
pub struct TestEngine {
    pub repo: TokenRepositoryRef,
    pub cache: TokenCacheRef,
    pub orders: Arc<InMemoryOrderRepository>,
    pub api: Arc<FakeReepayApi>,
    pub store: Arc<TokenStore>,
    pub factory: Arc<TokenFactory>,
    pub resolver: TokenResolver,
    pub binder: TokenBinder,
    pub lifecycle: TokenLifecycle,
}

impl TestEngine {
    pub fn new() -> Self {
        let repo: TokenRepositoryRef = Arc::new(InMemoryTokenRepository::new());
        let cache: TokenCacheRef = Arc::new(InMemoryTokenCache::new());
        let orders = Arc::new(InMemoryOrderRepository::new());
        let api = Arc::new(FakeReepayApi::new());
        let catalog = Arc::new(StaticGatewayCatalog::reepay());

        let store = Arc::new(TokenStore::new(repo.clone(), cache.clone()));
        let factory = Arc::new(TokenFactory::new(
            repo.clone(),
            api.clone(),
            catalog.clone(),
        ));
        let resolver = TokenResolver::new(store.clone(), orders.clone(), api.clone());
        let binder = TokenBinder::new(
            repo.clone(),
            orders.clone(),
            store.clone(),
            factory.clone(),
        );
        let lifecycle = TokenLifecycle::new(repo.clone(), store.clone(), api.clone(), catalog);

        Self {
            repo,
            cache,
            orders,
            api,
            store,
            factory,
            resolver,
            binder,
            lifecycle,
        }
    }

    pub async fn seed_order(&self, order: Order) {
        use reepay_tokens::domain::ports::OrderRepository;
        self.orders.save(&order).await.unwrap();
    }

    pub async fn order(&self, id: OrderId) -> Order {
        use reepay_tokens::domain::ports::OrderRepository;
        self.orders.get(id).await.unwrap().unwrap()
    }
}

pub fn visa_card_info(id: &str) -> CardInfo {
    CardInfo {
        id: id.to_string(),
        masked_card: Some("411111XXXXXX1111".to_string()),
        card_type: Some("visa".to_string()),
        exp_date: Some("07-25".to_string()),
    }
}

pub fn wallet_card_info(id: &str) -> CardInfo {
    CardInfo {
        id: id.to_string(),
        masked_card: None,
        card_type: None,
        exp_date: None,
    }
}
