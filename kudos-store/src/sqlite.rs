//! SQLite-backed token store.

use crate::error::{StoreError, StoreResult};
use crate::record::{ApplyOutcome, TokenRecord};
use crate::TokenStore;
use kudos_types::{TokenId, TokenState, TransferRef, TxHash};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS tokens (
        id INTEGER PRIMARY KEY,
        owner TEXT NOT NULL,
        token_uri TEXT NOT NULL,
        price_finney INTEGER NOT NULL,
        num_clones_allowed INTEGER NOT NULL,
        num_clones_in_wild INTEGER NOT NULL,
        cloned_from_id INTEGER NOT NULL,
        mint_block INTEGER,
        last_tx_hash TEXT,
        last_block INTEGER
    );

    CREATE TABLE IF NOT EXISTS sync_checkpoints (
        scope TEXT PRIMARY KEY,
        token_id INTEGER NOT NULL
    );
";

const SELECT_TOKEN: &str = "SELECT id, owner, token_uri, price_finney, num_clones_allowed, \
     num_clones_in_wild, cloned_from_id, mint_block, last_tx_hash, last_block \
     FROM tokens WHERE id = ?1";

/// Column values exactly as SQLite returns them.
struct RawTokenRow {
    id: i64,
    owner: String,
    token_uri: String,
    price_finney: i64,
    num_clones_allowed: i64,
    num_clones_in_wild: i64,
    cloned_from_id: i64,
    mint_block: Option<i64>,
    last_tx_hash: Option<String>,
    last_block: Option<i64>,
}

impl RawTokenRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            token_uri: row.get(2)?,
            price_finney: row.get(3)?,
            num_clones_allowed: row.get(4)?,
            num_clones_in_wild: row.get(5)?,
            cloned_from_id: row.get(6)?,
            mint_block: row.get(7)?,
            last_tx_hash: row.get(8)?,
            last_block: row.get(9)?,
        })
    }

    fn into_record(self) -> StoreResult<TokenRecord> {
        let last_tx_hash = self
            .last_tx_hash
            .map(|h| TxHash::parse(&h).map_err(|e| StoreError::InvalidData(e.to_string())))
            .transpose()?;
        Ok(TokenRecord {
            state: TokenState {
                id: TokenId::new(from_sql_int(self.id, "id")?),
                owner: self.owner,
                token_uri: self.token_uri,
                price_finney: from_sql_int(self.price_finney, "price_finney")?,
                num_clones_allowed: from_sql_int(self.num_clones_allowed, "num_clones_allowed")?,
                num_clones_in_wild: from_sql_int(self.num_clones_in_wild, "num_clones_in_wild")?,
                cloned_from_id: from_sql_int(self.cloned_from_id, "cloned_from_id")?,
            },
            mint_block: self.mint_block.map(|b| from_sql_int(b, "mint_block")).transpose()?,
            last_tx_hash,
            last_block: self.last_block.map(|b| from_sql_int(b, "last_block")).transpose()?,
        })
    }
}

fn to_sql_int(value: u64, column: &str) -> StoreResult<i64> {
    i64::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("{column} value {value} exceeds INTEGER range")))
}

fn from_sql_int(value: i64, column: &str) -> StoreResult<u64> {
    u64::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("negative {column} in store: {value}")))
}

fn opt_to_sql_int(value: Option<u64>, column: &str) -> StoreResult<Option<i64>> {
    value.map(|v| to_sql_int(v, column)).transpose()
}

/// Token store backed by a single SQLite file.
pub struct SqliteTokenStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTokenStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn load(conn: &Connection, id: TokenId) -> StoreResult<Option<TokenRecord>> {
        let raw = conn
            .query_row(SELECT_TOKEN, params![to_sql_int(id.get(), "id")?], RawTokenRow::from_row)
            .optional()?;
        raw.map(RawTokenRow::into_record).transpose()
    }
}

impl TokenStore for SqliteTokenStore {
    fn upsert(&self, state: &TokenState, transfer: Option<&TransferRef>) -> StoreResult<ApplyOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let existing = Self::load(&tx, state.id)?;
        let merged = TokenRecord::merge(existing.as_ref(), state, transfer);

        let outcome = match &existing {
            None => ApplyOutcome::Created,
            Some(current) if *current == merged => return Ok(ApplyOutcome::Unchanged),
            Some(_) => ApplyOutcome::Updated,
        };

        tx.execute(
            "INSERT INTO tokens (id, owner, token_uri, price_finney, num_clones_allowed, \
                 num_clones_in_wild, cloned_from_id, mint_block, last_tx_hash, last_block) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             ON CONFLICT(id) DO UPDATE SET \
                 owner = excluded.owner, \
                 token_uri = excluded.token_uri, \
                 price_finney = excluded.price_finney, \
                 num_clones_allowed = excluded.num_clones_allowed, \
                 num_clones_in_wild = excluded.num_clones_in_wild, \
                 cloned_from_id = excluded.cloned_from_id, \
                 mint_block = excluded.mint_block, \
                 last_tx_hash = excluded.last_tx_hash, \
                 last_block = excluded.last_block",
            params![
                to_sql_int(merged.state.id.get(), "id")?,
                merged.state.owner,
                merged.state.token_uri,
                to_sql_int(merged.state.price_finney, "price_finney")?,
                to_sql_int(merged.state.num_clones_allowed, "num_clones_allowed")?,
                to_sql_int(merged.state.num_clones_in_wild, "num_clones_in_wild")?,
                to_sql_int(merged.state.cloned_from_id, "cloned_from_id")?,
                opt_to_sql_int(merged.mint_block, "mint_block")?,
                merged.last_tx_hash.map(|h| h.to_string()),
                opt_to_sql_int(merged.last_block, "last_block")?,
            ],
        )?;
        tx.commit()?;

        debug!(token_id = %state.id, ?outcome, "token row written");
        Ok(outcome)
    }

    fn get(&self, id: TokenId) -> StoreResult<Option<TokenRecord>> {
        let conn = self.lock()?;
        Self::load(&conn, id)
    }

    fn max_known_id(&self) -> StoreResult<Option<TokenId>> {
        let conn = self.lock()?;
        let max: Option<i64> = conn.query_row("SELECT MAX(id) FROM tokens", [], |row| row.get(0))?;
        max.map(|v| from_sql_int(v, "id").map(TokenId::new)).transpose()
    }

    fn count(&self) -> StoreResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tokens", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn checkpoint(&self, scope: &str) -> StoreResult<Option<TokenId>> {
        let conn = self.lock()?;
        let value: Option<i64> = conn
            .query_row(
                "SELECT token_id FROM sync_checkpoints WHERE scope = ?1",
                params![scope],
                |row| row.get(0),
            )
            .optional()?;
        value.map(|v| from_sql_int(v, "token_id").map(TokenId::new)).transpose()
    }

    fn save_checkpoint(&self, scope: &str, id: TokenId) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO sync_checkpoints (scope, token_id) VALUES (?1, ?2)",
            params![scope, to_sql_int(id.get(), "token_id")?],
        )?;
        Ok(())
    }
}
