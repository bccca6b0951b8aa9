use crate::domain::card_info::CardInfo;
use crate::domain::gateway::{GatewayId, GatewayKind};
use crate::domain::ports::{GatewayCatalogRef, ReepayApiRef, TokenRepositoryRef};
use crate::domain::token::{CustomerId, ExternalToken, Token, TokenKind, WALLET_RECURRING_PREFIX};
use crate::error::{Result, TokenError};
use tracing::debug;

/// Classifies remote card-info payloads into token variants and persists
/// the resulting records.
pub struct TokenFactory {
    repo: TokenRepositoryRef,
    api: ReepayApiRef,
    catalog: GatewayCatalogRef,
}

impl TokenFactory {
    pub fn new(repo: TokenRepositoryRef, api: ReepayApiRef, catalog: GatewayCatalogRef) -> Self {
        Self { repo, api, catalog }
    }

    /// Fetches card info for `raw`, classifies it, and persists the record.
    ///
    /// Returns the persisted token together with the raw card info so the
    /// caller can mirror metadata onto the owning entity. A failed
    /// persist surfaces as `Persistence` and leaves no record behind.
    pub async fn create_for_customer(
        &self,
        customer: CustomerId,
        raw: &ExternalToken,
    ) -> Result<(Token, CardInfo)> {
        let handle = self
            .api
            .customer_handle(customer)
            .await
            .map_err(|e| TokenError::RemoteLookup(e.to_string()))?;

        let info = self
            .api
            .card_info(&handle, raw)
            .await
            .map_err(|e| TokenError::RemoteLookup(e.to_string()))?
            .ok_or_else(|| TokenError::CardNotFound(raw.to_string()))?;

        let token = self.classify(customer, raw, &info)?;
        let token = self.repo.insert(token).await?;
        debug!(token = %raw, id = ?token.id, "created local token record");
        Ok((token, info))
    }

    /// Builds an unpersisted record from a card-info payload. Payloads
    /// whose id carries the wallet-recurring prefix become wallet tokens;
    /// everything else is a card token.
    fn classify(
        &self,
        customer: CustomerId,
        raw: &ExternalToken,
        info: &CardInfo,
    ) -> Result<Token> {
        if info.id.starts_with(WALLET_RECURRING_PREFIX) {
            let gateway = self
                .catalog
                .by_kind(GatewayKind::WalletRecurring)
                .map(|g| g.id)
                .unwrap_or_else(GatewayId::wallet_recurring);
            return Ok(Token {
                id: None,
                gateway,
                customer,
                external: raw.clone(),
                kind: TokenKind::WalletRecurring,
            });
        }

        let masked_card = info.masked_card.as_deref().ok_or_else(|| {
            TokenError::InvalidToken(format!("card info for {raw} has no masked card"))
        })?;
        let last4 = masked_card
            .get(masked_card.len().saturating_sub(4)..)
            .filter(|l| l.len() == 4)
            .ok_or_else(|| {
                TokenError::InvalidToken(format!("unusable masked card: {masked_card}"))
            })?
            .to_string();

        let exp_date = info.exp_date.as_deref().ok_or_else(|| {
            TokenError::InvalidToken(format!("card info for {raw} has no expiry date"))
        })?;
        let (month, year) = exp_date.split_once('-').ok_or_else(|| {
            TokenError::InvalidToken(format!("malformed expiry date: {exp_date}"))
        })?;
        // Remote expiry years are two-digit.
        let year: u16 = year
            .trim()
            .parse()
            .ok()
            .filter(|y| *y < 100)
            .ok_or_else(|| {
                TokenError::InvalidToken(format!("malformed expiry date: {exp_date}"))
            })?;

        let gateway = self
            .catalog
            .by_kind(GatewayKind::Checkout)
            .map(|g| g.id)
            .unwrap_or_else(GatewayId::checkout);

        Ok(Token {
            id: None,
            gateway,
            customer,
            external: raw.clone(),
            kind: TokenKind::Card {
                last4,
                expiry_month: month.to_string(),
                expiry_year: 2000 + year,
                card_type: info.card_type.clone().unwrap_or_default(),
                masked_card: masked_card.to_string(),
            },
        })
    }
}
