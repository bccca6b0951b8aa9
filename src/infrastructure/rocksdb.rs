use crate::domain::ports::TokenRepository;
use crate::domain::token::{ExternalToken, Token, TokenId};
use crate::error::{Result, TokenError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Column family for token records keyed by local id.
pub const CF_TOKENS: &str = "tokens";
/// Column family for the unique index from external string to local id.
pub const CF_TOKEN_INDEX: &str = "token_index";
/// Column family for repository bookkeeping (the id counter).
pub const CF_META: &str = "meta";

const NEXT_ID_KEY: &[u8] = b"next_token_id";

/// A persistent token repository backed by RocksDB.
///
/// Records and the unique secondary index live in separate column
/// families and are written in one batch, so the index can never point
/// at a record that was not stored.
pub struct RocksDbTokenRepository {
    db: Arc<DB>,
    next_id: AtomicU64,
    write_lock: Mutex<()>,
}

impl RocksDbTokenRepository {
    /// Opens or creates the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_TOKENS, Options::default()),
            ColumnFamilyDescriptor::new(CF_TOKEN_INDEX, Options::default()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
        ];
        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        let next_id = {
            let cf = db
                .cf_handle(CF_META)
                .ok_or_else(|| missing_cf(CF_META))?;
            match db.get_cf(&cf, NEXT_ID_KEY)? {
                Some(bytes) => {
                    let bytes: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                        TokenError::Internal(Box::new(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            "corrupt id counter",
                        )))
                    })?;
                    u64::from_be_bytes(bytes)
                }
                None => 0,
            }
        };

        Ok(Self {
            db: Arc::new(db),
            next_id: AtomicU64::new(next_id),
            write_lock: Mutex::new(()),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| missing_cf(name))
    }

    fn load(&self, bytes: &[u8]) -> Result<Token> {
        serde_json::from_slice(bytes).map_err(|e| TokenError::Internal(Box::new(e)))
    }

    fn get_by_id(&self, id: TokenId) -> Result<Option<Token>> {
        let cf = self.cf(CF_TOKENS)?;
        match self.db.get_cf(&cf, id.0.to_be_bytes())? {
            Some(bytes) => Ok(Some(self.load(&bytes)?)),
            None => Ok(None),
        }
    }

    fn index_lookup(&self, external: &ExternalToken) -> Result<Option<TokenId>> {
        let cf = self.cf(CF_TOKEN_INDEX)?;
        match self.db.get_cf(&cf, external.as_str().as_bytes())? {
            Some(bytes) => {
                let bytes: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    TokenError::Internal(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "corrupt token index entry",
                    )))
                })?;
                Ok(Some(TokenId(u64::from_be_bytes(bytes))))
            }
            None => Ok(None),
        }
    }
}

fn missing_cf(name: &str) -> TokenError {
    TokenError::Internal(Box::new(std::io::Error::other(format!(
        "column family {name} not found"
    ))))
}

#[async_trait]
impl TokenRepository for RocksDbTokenRepository {
    async fn insert(&self, mut token: Token) -> Result<Token> {
        let _guard = self.write_lock.lock().await;

        // Never repoint an existing mapping.
        if let Some(id) = self.index_lookup(&token.external)?
            && let Some(existing) = self.get_by_id(id)?
        {
            return Ok(existing);
        }

        let id = TokenId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        token.id = Some(id);
        let value = serde_json::to_vec(&token).map_err(|e| TokenError::Internal(Box::new(e)))?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&self.cf(CF_TOKENS)?, id.0.to_be_bytes(), value);
        batch.put_cf(
            &self.cf(CF_TOKEN_INDEX)?,
            token.external.as_str().as_bytes(),
            id.0.to_be_bytes(),
        );
        batch.put_cf(&self.cf(CF_META)?, NEXT_ID_KEY, id.0.to_be_bytes());
        self.db.write(batch)?;

        Ok(token)
    }

    async fn get(&self, id: TokenId) -> Result<Option<Token>> {
        self.get_by_id(id)
    }

    async fn find_by_external(&self, external: &ExternalToken) -> Result<Option<Token>> {
        match self.index_lookup(external)? {
            Some(id) => self.get_by_id(id),
            None => Ok(None),
        }
    }

    async fn remove(&self, id: TokenId) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let Some(token) = self.get_by_id(id)? else {
            return Ok(());
        };

        let mut batch = WriteBatch::default();
        batch.delete_cf(&self.cf(CF_TOKENS)?, id.0.to_be_bytes());
        batch.delete_cf(
            &self.cf(CF_TOKEN_INDEX)?,
            token.external.as_str().as_bytes(),
        );
        self.db.write(batch)?;
        Ok(())
    }
}
