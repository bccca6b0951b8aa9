use crate::application::store::TokenStore;
use crate::domain::order::{Order, Subscription};
use crate::domain::ports::{OrderRepositoryRef, ReepayApiRef};
use crate::domain::token::{ExternalToken, Token};
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Finds the applicable token for an order or a subscription.
///
/// Subscription resolution walks an ordered fallback chain and
/// short-circuits on the first step that yields a candidate string; the
/// remote invoice step fails soft so an outage degrades to "no token"
/// rather than a hard error.
pub struct TokenResolver {
    store: Arc<TokenStore>,
    orders: OrderRepositoryRef,
    api: ReepayApiRef,
}

impl TokenResolver {
    pub fn new(store: Arc<TokenStore>, orders: OrderRepositoryRef, api: ReepayApiRef) -> Self {
        Self { store, orders, api }
    }

    /// Resolves via the order's own token-string slot. `Ok(None)` is the
    /// normal "no token yet" outcome.
    pub async fn resolve_for_order(&self, order: &Order) -> Result<Option<Token>> {
        match order.token_string() {
            Some(external) => self.store.resolve(&external).await,
            None => Ok(None),
        }
    }

    /// Resolves via the fallback chain: the subscription's own slot, then
    /// the parent order's slot, then the parent order's remote invoice
    /// data.
    pub async fn resolve_for_subscription(&self, sub: &Subscription) -> Result<Option<Token>> {
        if let Some(external) = sub.token_string() {
            return self.store.resolve(&external).await;
        }

        let Some(parent_id) = sub.parent_order else {
            debug!(subscription = sub.id.0, "subscription has no parent order");
            return Ok(None);
        };

        if let Some(order) = self.orders.get(parent_id).await?
            && let Some(external) = order.token_string()
        {
            return self.store.resolve(&external).await;
        }

        match self.api.invoice_data(parent_id).await {
            Ok(data) => match data.payment_method() {
                Some(method) => self.store.resolve(&ExternalToken::new(method)).await,
                None => Ok(None),
            },
            Err(e) => {
                // Soft failure: a broken invoice lookup must not turn
                // token resolution into a hard error.
                warn!(order = %parent_id, error = %e, "invoice lookup failed during resolution");
                Ok(None)
            }
        }
    }
}
