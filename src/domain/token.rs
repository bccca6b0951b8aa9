use crate::domain::gateway::GatewayId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card-info ids carrying this prefix denote a wallet-recurring agreement.
pub const WALLET_RECURRING_PREFIX: &str = "ms_";

/// Local identifier of a persisted token record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Local identifier of the customer owning a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub u64);

/// Opaque token string issued by the payment processor.
///
/// Globally unique and immutable once set on a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalToken(String);

impl ExternalToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The variant-specific half of a token record.
///
/// Card fields exist only on the card variant; a wallet-recurring
/// agreement never stores PAN or expiry data locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenKind {
    Card {
        last4: String,
        expiry_month: String,
        expiry_year: u16,
        card_type: String,
        masked_card: String,
    },
    WalletRecurring,
}

/// A locally persisted payment-method token.
///
/// `id` is `None` until the repository assigns one on insert; all other
/// fields are immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: Option<TokenId>,
    pub gateway: GatewayId,
    pub customer: CustomerId,
    pub external: ExternalToken,
    pub kind: TokenKind,
}

impl Token {
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn masked_card(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Card { masked_card, .. } => Some(masked_card),
            TokenKind::WalletRecurring => None,
        }
    }

    pub fn card_type(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Card { card_type, .. } => Some(card_type),
            TokenKind::WalletRecurring => None,
        }
    }
}
