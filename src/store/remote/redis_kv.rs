//! Redis implementation of [`KvClient`].

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{KvClient, KvError, ScanPage};

/// Synchronous Redis client.
///
/// A single connection is shared behind a mutex and reopened on the next
/// call after the server drops it.
pub struct RedisKv {
    client: redis::Client,
    conn: Mutex<Option<redis::Connection>>,
}

impl std::fmt::Debug for RedisKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKv")
            .field("url", &self.client.get_connection_info().addr.to_string())
            .finish()
    }
}

impl RedisKv {
    /// Open a client for `url` and verify the server is reachable.
    pub fn connect(url: &str) -> Result<Self, KvError> {
        let client = redis::Client::open(url).map_err(to_kv_error)?;
        let conn = client.get_connection().map_err(to_kv_error)?;
        tracing::debug!("Connected to {}", client.get_connection_info().addr);
        Ok(Self {
            client,
            conn: Mutex::new(Some(conn)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<redis::Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `cmd` on the shared connection, reconnecting first if needed.
    fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T, KvError> {
        let mut guard = self.lock();
        if guard.is_none() {
            *guard = Some(self.client.get_connection().map_err(to_kv_error)?);
        }
        let Some(conn) = guard.as_mut() else {
            return Err(KvError("no connection".to_string()));
        };

        match cmd.query::<T>(conn) {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.is_connection_dropped() || e.is_io_error() {
                    tracing::debug!("Dropping Redis connection after error: {}", e);
                    *guard = None;
                }
                Err(to_kv_error(e))
            }
        }
    }
}

impl KvClient for RedisKv {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.query(redis::cmd("GET").arg(key))
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self.query(redis::cmd("SET").arg(key).arg(value).arg("PX").arg(millis))
    }

    fn delete(&self, key: &str) -> Result<bool, KvError> {
        let removed: i64 = self.query(redis::cmd("DEL").arg(key))?;
        Ok(removed > 0)
    }

    fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage, KvError> {
        let (cursor, keys): (u64, Vec<String>) = self.query(
            redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(count),
        )?;
        Ok(ScanPage { cursor, keys })
    }
}

fn to_kv_error(e: redis::RedisError) -> KvError {
    KvError(e.to_string())
}
