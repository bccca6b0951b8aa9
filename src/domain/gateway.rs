use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway id of the Reepay card checkout integration.
pub const GATEWAY_CHECKOUT: &str = "reepay_checkout";
/// Gateway id of the Reepay wallet-recurring (MobilePay subscriptions) integration.
pub const GATEWAY_WALLET_RECURRING: &str = "reepay_mobilepay_subscriptions";

/// Identifies which payment-method integration a token belongs to.
///
/// Open-world: third-party gateway ids pass through untouched, they are
/// just never recognized as Reepay-owned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GatewayId(String);

impl GatewayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn checkout() -> Self {
        Self(GATEWAY_CHECKOUT.to_string())
    }

    pub fn wallet_recurring() -> Self {
        Self(GATEWAY_WALLET_RECURRING.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GatewayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    Checkout,
    WalletRecurring,
    ThirdParty,
}

impl GatewayKind {
    pub fn is_reepay(self) -> bool {
        matches!(self, Self::Checkout | Self::WalletRecurring)
    }
}

/// Catalog entry for a registered payment-method integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayDescriptor {
    pub id: GatewayId,
    pub kind: GatewayKind,
}

impl GatewayDescriptor {
    pub fn new(id: GatewayId, kind: GatewayKind) -> Self {
        Self { id, kind }
    }
}
