use crate::application::factory::TokenFactory;
use crate::application::store::TokenStore;
use crate::domain::order::{Order, OrderId, meta};
use crate::domain::ports::{OrderRepositoryRef, TokenRepositoryRef};
use crate::domain::token::{ExternalToken, Token, TokenId};
use crate::error::{Result, TokenError};
use std::sync::Arc;
use tracing::debug;

/// Associates tokens with orders.
///
/// An order holds at most one active token association; binding always
/// replaces, never appends.
pub struct TokenBinder {
    repo: TokenRepositoryRef,
    orders: OrderRepositoryRef,
    store: Arc<TokenStore>,
    factory: Arc<TokenFactory>,
}

impl TokenBinder {
    pub fn new(
        repo: TokenRepositoryRef,
        orders: OrderRepositoryRef,
        store: Arc<TokenStore>,
        factory: Arc<TokenFactory>,
    ) -> Self {
        Self {
            repo,
            orders,
            store,
            factory,
        }
    }

    /// Makes `token` the order's single active payment token and mirrors
    /// its identifying fields into order metadata.
    ///
    /// A token without a local id is silently ignored: there is nothing
    /// to bind yet.
    pub async fn bind(&self, order_id: OrderId, token: &Token) -> Result<()> {
        let Some(token_id) = token.id else {
            debug!(order = %order_id, "skipping bind of unpersisted token");
            return Ok(());
        };

        let mut order = self.load(order_id).await?;
        order.clear_payment_tokens();
        self.orders.save(&order).await?;

        // Reload before mutating: the clear may have raced with other
        // writers of the same order.
        let mut order = self.load(order_id).await?;
        order.payment_tokens.push(token_id);
        order.set_token_meta(token_id, &token.external);
        self.orders.save(&order).await?;
        debug!(order = %order_id, token = %token.external, "bound token to order");
        Ok(())
    }

    /// Loads the token for `token_id` and binds it.
    pub async fn bind_by_id(&self, order_id: OrderId, token_id: TokenId) -> Result<()> {
        let token = self
            .repo
            .get(token_id)
            .await?
            .ok_or_else(|| TokenError::InvalidToken(format!("no token with id {token_id}")))?;
        self.bind(order_id, &token).await
    }

    /// Idempotent get-or-create entry point used by checkout and webhook
    /// callers: resolves `raw` to an existing record or creates one from
    /// remote card info, then binds it to the order.
    pub async fn save_token_for_order(
        &self,
        order_id: OrderId,
        raw: &ExternalToken,
    ) -> Result<Token> {
        if let Some(token) = self.store.resolve(raw).await? {
            self.bind(order_id, &token).await?;
            return Ok(token);
        }

        let order = self.load(order_id).await?;
        let (token, info) = self.factory.create_for_customer(order.customer, raw).await?;

        let mut order = self.load(order_id).await?;
        if let Some(masked) = &info.masked_card {
            order.set_meta(meta::MASKED_CARD, masked.as_str());
        }
        if let Some(card_type) = &info.card_type {
            order.set_meta(meta::CARD_TYPE, card_type.as_str());
        }
        let blob = serde_json::to_string(&info).map_err(|e| TokenError::Internal(Box::new(e)))?;
        order.set_meta(meta::SOURCE, blob);
        self.orders.save(&order).await?;

        self.bind(order_id, &token).await?;
        Ok(token)
    }

    async fn load(&self, order_id: OrderId) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| TokenError::InvalidToken(format!("no order with id {order_id}")))
    }
}
