use serde::{Deserialize, Serialize};

/// Processor-returned metadata about a stored payment method.
///
/// Not persisted as an entity; the factory mines it for fields and the
/// binder mirrors the raw blob into order metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInfo {
    pub id: String,
    #[serde(default)]
    pub masked_card: Option<String>,
    #[serde(default)]
    pub card_type: Option<String>,
    /// Expiry as `"MM-YY"`.
    #[serde(default)]
    pub exp_date: Option<String>,
}

/// Invoice/transaction history used by the subscription fallback chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceData {
    #[serde(default)]
    pub recurring_payment_method: Option<String>,
    #[serde(default)]
    pub transactions: Vec<InvoiceTransaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTransaction {
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl InvoiceData {
    /// Picks the token string out of invoice data.
    ///
    /// Prefers the recurring payment method; otherwise the last non-empty
    /// transaction payment method wins, later transactions overriding
    /// earlier ones.
    pub fn payment_method(&self) -> Option<&str> {
        if let Some(method) = self.recurring_payment_method.as_deref()
            && !method.is_empty()
        {
            return Some(method);
        }
        self.transactions
            .iter()
            .rev()
            .find_map(|tx| tx.payment_method.as_deref().filter(|m| !m.is_empty()))
    }
}
