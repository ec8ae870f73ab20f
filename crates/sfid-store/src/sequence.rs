//! # Sequence Store
//!
//! Per-bucket allocation of raw sequence numbers. Each call hands out the
//! bucket's current counter and advances it by one, starting from 0 for an
//! unseen bucket. At [`SEQ_SPACE`] the bucket is exhausted: allocation
//! fails and the stored counter is left untouched.
//!
//! Two implementations:
//!
//! - [`SqliteSequenceStore`]: durable. A single
//!   `INSERT ... ON CONFLICT DO UPDATE ... RETURNING` inside a transaction,
//!   so the read-increment-write is atomic across threads and processes and
//!   survives restart once the call returns.
//! - [`MemorySequenceStore`]: in-process, mutex-guarded. For tests and
//!   callers that never persist codes.
//!
//! Table layout:
//!
//! ```sql
//! CREATE TABLE n9_sequence (bucket TEXT PRIMARY KEY, next_seq INTEGER NOT NULL)
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use sfid_core::SEQ_SPACE;

use crate::error::StoreError;

/// Default database file name.
pub const DEFAULT_DB_PATH: &str = ".identity_code_seq.db";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS n9_sequence (
    bucket   TEXT PRIMARY KEY,
    next_seq INTEGER NOT NULL
)";

// Insert-or-increment; the WHERE clause leaves an exhausted row alone and
// yields no row.
const ALLOCATE: &str = "INSERT INTO n9_sequence (bucket, next_seq) VALUES (?1, 1)
    ON CONFLICT(bucket) DO UPDATE SET next_seq = n9_sequence.next_seq + 1
    WHERE n9_sequence.next_seq < ?2
    RETURNING next_seq - 1";

const PEEK: &str = "SELECT next_seq FROM n9_sequence WHERE bucket = ?1";

/// Allocator of strictly increasing raw sequence numbers per bucket key.
pub trait SequenceStore: Send + Sync {
    /// Allocate the next raw sequence number for `bucket`.
    ///
    /// Returns [`StoreError::Exhausted`] once the bucket has handed out
    /// [`SEQ_SPACE`] values; the stored state is not modified in that case.
    fn next_seq(&self, bucket: &str) -> impl Future<Output = Result<u32, StoreError>> + Send;

    /// The value the next [`SequenceStore::next_seq`] call would return,
    /// without allocating it. `0` for an unseen bucket.
    fn peek(&self, bucket: &str) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// Durable sequence store backed by a SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteSequenceStore {
    pool: SqlitePool,
}

impl SqliteSequenceStore {
    /// Open (creating if missing) the sequence database at `path`.
    ///
    /// Parent directories are created. The database runs in WAL mode with
    /// `synchronous = FULL`, so a committed allocation survives a crash.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        tracing::info!(path = %path.display(), "opened sequence database");

        Ok(Self { pool })
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections, waiting for in-flight allocations to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl SequenceStore for SqliteSequenceStore {
    async fn next_seq(&self, bucket: &str) -> Result<u32, StoreError> {
        let mut tx = self.pool.begin().await?;

        let allocated: Option<i64> = sqlx::query_scalar(ALLOCATE)
            .bind(bucket)
            .bind(SEQ_SPACE as i64)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(value) = allocated else {
            tx.rollback().await?;
            tracing::warn!(bucket, "sequence bucket exhausted");
            return Err(StoreError::Exhausted {
                bucket: bucket.to_string(),
            });
        };

        let seq = u32::try_from(value).map_err(|_| StoreError::InvalidCounter {
            bucket: bucket.to_string(),
            value,
        })?;
        tx.commit().await?;

        tracing::debug!(bucket, seq, "allocated sequence");
        Ok(seq)
    }

    async fn peek(&self, bucket: &str) -> Result<u64, StoreError> {
        let stored: Option<i64> = sqlx::query_scalar(PEEK)
            .bind(bucket)
            .fetch_optional(&self.pool)
            .await?;
        match stored {
            None => Ok(0),
            Some(value) => u64::try_from(value).map_err(|_| StoreError::InvalidCounter {
                bucket: bucket.to_string(),
                value,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Non-durable sequence store.
#[derive(Debug, Default)]
pub struct MemorySequenceStore {
    counters: Mutex<HashMap<String, u64>>,
}

impl MemorySequenceStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a bucket's next value directly.
    pub fn set_next(&self, bucket: &str, next: u64) {
        self.counters.lock().insert(bucket.to_string(), next);
    }

    fn allocate(&self, bucket: &str) -> Result<u32, StoreError> {
        let mut counters = self.counters.lock();
        let current = counters.get(bucket).copied().unwrap_or(0);
        if current >= SEQ_SPACE {
            tracing::warn!(bucket, "sequence bucket exhausted");
            return Err(StoreError::Exhausted {
                bucket: bucket.to_string(),
            });
        }
        counters.insert(bucket.to_string(), current + 1);
        // current < SEQ_SPACE < u32::MAX
        Ok(current as u32)
    }
}

impl SequenceStore for MemorySequenceStore {
    async fn next_seq(&self, bucket: &str) -> Result<u32, StoreError> {
        let seq = self.allocate(bucket)?;
        tracing::debug!(bucket, seq, "allocated sequence");
        Ok(seq)
    }

    async fn peek(&self, bucket: &str) -> Result<u64, StoreError> {
        Ok(self.counters.lock().get(bucket).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_counts_from_zero_per_bucket() {
        let store = MemorySequenceStore::new();
        assert_eq!(store.allocate("A").unwrap(), 0);
        assert_eq!(store.allocate("A").unwrap(), 1);
        assert_eq!(store.allocate("B").unwrap(), 0);
        assert_eq!(store.allocate("A").unwrap(), 2);
    }

    #[test]
    fn memory_exhaustion_leaves_state() {
        let store = MemorySequenceStore::new();
        store.set_next("X", SEQ_SPACE - 1);
        assert_eq!(store.allocate("X").unwrap(), 999_999_999);
        assert!(store.allocate("X").unwrap_err().is_exhausted());
        assert!(store.allocate("X").unwrap_err().is_exhausted());
        assert_eq!(store.counters.lock().get("X").copied(), Some(SEQ_SPACE));
    }
}
