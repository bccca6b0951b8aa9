use crate::domain::token::{CustomerId, ExternalToken, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Metadata slot names shared by orders and subscriptions.
pub mod meta {
    pub const TOKEN_ID: &str = "_reepay_token_id";
    pub const TOKEN: &str = "reepay_token";
    pub const TOKEN_LEGACY: &str = "_reepay_token";
    pub const MASKED_CARD: &str = "reepay_masked_card";
    pub const CARD_TYPE: &str = "reepay_card_type";
    pub const SOURCE: &str = "_reepay_source";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// A purchase order, as far as this engine is concerned: its customer,
/// its payment-token association list, and its metadata slots.
///
/// Persistence mechanics live behind `OrderRepository`; this is the
/// in-memory shape both in-memory and persistent adapters trade in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer: CustomerId,
    pub payment_tokens: Vec<TokenId>,
    meta: HashMap<String, String>,
}

impl Order {
    pub fn new(id: OrderId, customer: CustomerId) -> Self {
        Self {
            id,
            customer,
            payment_tokens: Vec::new(),
            meta: HashMap::new(),
        }
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn set_meta(&mut self, key: &str, value: impl Into<String>) {
        self.meta.insert(key.to_string(), value.into());
    }

    /// The order's token-string slot, preferring the visible key over the
    /// legacy underscore-prefixed one.
    pub fn token_string(&self) -> Option<ExternalToken> {
        self.meta(meta::TOKEN)
            .or_else(|| self.meta(meta::TOKEN_LEGACY))
            .map(ExternalToken::new)
    }

    /// Drops every token association and the identifying metadata slots.
    pub fn clear_payment_tokens(&mut self) {
        self.payment_tokens.clear();
        self.meta.remove(meta::TOKEN_ID);
        self.meta.remove(meta::TOKEN);
        self.meta.remove(meta::TOKEN_LEGACY);
    }

    /// Writes the three identifying slots for `token`. All three land
    /// together; the repository persists them in a single save.
    pub fn set_token_meta(&mut self, id: TokenId, external: &ExternalToken) {
        self.set_meta(meta::TOKEN_ID, id.to_string());
        self.set_meta(meta::TOKEN, external.as_str());
        self.set_meta(meta::TOKEN_LEGACY, external.as_str());
    }
}

/// A recurring-billing subscription. May inherit its token slot from the
/// parent order when its own slot is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub parent_order: Option<OrderId>,
    meta: HashMap<String, String>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, parent_order: Option<OrderId>) -> Self {
        Self {
            id,
            parent_order,
            meta: HashMap::new(),
        }
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn set_meta(&mut self, key: &str, value: impl Into<String>) {
        self.meta.insert(key.to_string(), value.into());
    }

    pub fn token_string(&self) -> Option<ExternalToken> {
        self.meta(meta::TOKEN)
            .or_else(|| self.meta(meta::TOKEN_LEGACY))
            .map(ExternalToken::new)
    }
}
