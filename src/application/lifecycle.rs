use crate::application::store::TokenStore;
use crate::domain::ports::{GatewayCatalogRef, ReepayApiRef, TokenRepositoryRef};
use crate::domain::token::Token;
use crate::error::{Result, TokenError};
use std::sync::Arc;
use tracing::debug;

/// Destroys tokens and answers the Reepay-ownership membership test.
pub struct TokenLifecycle {
    repo: TokenRepositoryRef,
    store: Arc<TokenStore>,
    api: ReepayApiRef,
    catalog: GatewayCatalogRef,
}

impl TokenLifecycle {
    pub fn new(
        repo: TokenRepositoryRef,
        store: Arc<TokenStore>,
        api: ReepayApiRef,
        catalog: GatewayCatalogRef,
    ) -> Self {
        Self {
            repo,
            store,
            api,
            catalog,
        }
    }

    /// True iff the token belongs to one of the Reepay integrations
    /// (card checkout or wallet-recurring). A missing token is never a
    /// Reepay token.
    pub fn is_reepay_token(&self, token: Option<&Token>) -> bool {
        token.is_some_and(|t| {
            self.catalog
                .get(&t.gateway)
                .is_some_and(|g| g.kind.is_reepay())
        })
    }

    /// Two-phase delete: remote first, local second.
    ///
    /// A failed remote delete aborts with `RemoteDelete` and leaves the
    /// local record and its cache entry untouched, so a token the
    /// processor still honors keeps resolving locally. Only a confirmed
    /// remote delete is followed by the local removal and cache
    /// invalidation.
    pub async fn delete(&self, token: &Token) -> Result<()> {
        self.api
            .delete_payment_method(&token.external)
            .await
            .map_err(|e| TokenError::RemoteDelete(e.to_string()))?;

        if let Some(id) = token.id {
            self.repo.remove(id).await?;
        }
        self.store.invalidate(&token.external).await;
        debug!(token = %token.external, "deleted token remotely and locally");
        Ok(())
    }
}
