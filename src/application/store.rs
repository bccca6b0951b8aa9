use crate::domain::ports::{TokenCacheRef, TokenRepositoryRef};
use crate::domain::token::{ExternalToken, Token};
use crate::error::Result;
use tracing::{debug, warn};

/// Read-through lookup over the authoritative token repository.
///
/// The cache maps external token strings to local ids and is a derived,
/// rebuildable projection: every read falls back to the repository, and
/// cache failures never fail the surrounding lookup.
pub struct TokenStore {
    repo: TokenRepositoryRef,
    cache: TokenCacheRef,
}

impl TokenStore {
    pub fn new(repo: TokenRepositoryRef, cache: TokenCacheRef) -> Self {
        Self { repo, cache }
    }

    /// Looks up the local record for an external token string.
    ///
    /// `Ok(None)` is the normal "no token yet" outcome, not an error.
    pub async fn resolve(&self, external: &ExternalToken) -> Result<Option<Token>> {
        match self.cache.get(external).await {
            Ok(Some(id)) => {
                if let Some(token) = self.repo.get(id).await? {
                    debug!(token = %external, %id, "token cache hit");
                    return Ok(Some(token));
                }
                // Stale entry: the record is gone but the cache still
                // points at it. Drop the entry and fall through to the
                // authoritative lookup.
                self.invalidate(external).await;
            }
            Ok(None) => {}
            Err(e) => warn!(token = %external, error = %e, "token cache read failed"),
        }

        let Some(token) = self.repo.find_by_external(external).await? else {
            debug!(token = %external, "no local record for token");
            return Ok(None);
        };

        if let Some(id) = token.id
            && let Err(e) = self.cache.put(external, id).await
        {
            // Best-effort: the authoritative read above is already correct.
            warn!(token = %external, error = %e, "token cache write failed");
        }

        Ok(Some(token))
    }

    /// Removes the cache entry for `external`. Must be called whenever the
    /// underlying mapping for that string changes.
    pub async fn invalidate(&self, external: &ExternalToken) {
        if let Err(e) = self.cache.remove(external).await {
            warn!(token = %external, error = %e, "token cache invalidation failed");
        }
    }
}
