//! In-process key-value store for testing the remote backend.
//!
//! Behaves like the subset of Redis the backend relies on: values expire
//! after their TTL, `scan` pages through keys matching a glob pattern and
//! returns cursor `0` when done, and a key present for the whole scan is
//! returned at least once even if other keys are deleted mid-scan.
//!
//! Failures can be injected per operation to exercise partial-write and
//! best-effort cascade paths.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::{KvClient, KvError, ScanPage, SCAN_DONE};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Debug, Default)]
struct MockState {
    values: BTreeMap<String, StoredValue>,
    /// Open scan cursors → last key handed out.
    cursors: HashMap<u64, String>,
    next_cursor: u64,
    fail_sets: Vec<String>,
    fail_deletes: Vec<String>,
    fail_scans: bool,
    scan_calls: usize,
}

/// A thread-safe, in-memory [`KvClient`].
#[derive(Debug, Default)]
pub struct MockKv {
    state: Mutex<MockState>,
}

impl MockKv {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a live value directly.
    pub fn raw_get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.lock()
            .values
            .get(key)
            .filter(|v| v.is_live(now))
            .map(|v| v.value.clone())
    }

    /// Write a value directly, bypassing injected failures.
    pub fn raw_set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.lock().values.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    /// Remaining TTL of a live key; `None` if absent or persistent.
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.lock()
            .values
            .get(key)
            .filter(|v| v.is_live(now))
            .and_then(|v| v.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// All live keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.lock()
            .values
            .iter()
            .filter(|(_, v)| v.is_live(now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// True if no live keys remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of scan round-trips served so far.
    pub fn scan_calls(&self) -> usize {
        self.lock().scan_calls
    }

    /// Fail `set_with_ttl` for keys containing `needle`.
    pub fn fail_sets_matching(&self, needle: &str) {
        self.lock().fail_sets.push(needle.to_string());
    }

    /// Fail `delete` for keys containing `needle`.
    pub fn fail_deletes_matching(&self, needle: &str) {
        self.lock().fail_deletes.push(needle.to_string());
    }

    /// Fail every `scan` while set.
    pub fn fail_scans(&self, fail: bool) {
        self.lock().fail_scans = fail;
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.fail_sets.clear();
        state.fail_deletes.clear();
        state.fail_scans = false;
    }
}

impl KvClient for MockKv {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.raw_get(key))
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        if self.lock().fail_sets.iter().any(|n| key.contains(n.as_str())) {
            return Err(KvError(format!("injected set failure for {}", key)));
        }
        if ttl.is_zero() {
            return Err(KvError("invalid expire time in 'set' command".to_string()));
        }
        self.raw_set(key, value, Some(ttl));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, KvError> {
        let mut state = self.lock();
        if state.fail_deletes.iter().any(|n| key.contains(n.as_str())) {
            return Err(KvError(format!("injected delete failure for {}", key)));
        }
        let now = Instant::now();
        Ok(state
            .values
            .remove(key)
            .is_some_and(|v| v.is_live(now)))
    }

    fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage, KvError> {
        let mut state = self.lock();
        state.scan_calls += 1;
        if state.fail_scans {
            return Err(KvError("injected scan failure".to_string()));
        }

        let start = if cursor == SCAN_DONE {
            Bound::Unbounded
        } else {
            let last = state
                .cursors
                .remove(&cursor)
                .ok_or_else(|| KvError(format!("unknown cursor {}", cursor)))?;
            Bound::Excluded(last)
        };

        // Like SCAN, COUNT bounds the keys examined, not the keys returned.
        let now = Instant::now();
        let examined: Vec<(String, bool)> = state
            .values
            .range::<String, _>((start, Bound::Unbounded))
            .take(count.max(1))
            .map(|(k, v)| (k.clone(), v.is_live(now) && glob_match(pattern, k)))
            .collect();

        let exhausted = examined.len() < count.max(1)
            || examined.last().is_some_and(|(last, _)| {
                state
                    .values
                    .range::<String, _>((Bound::Excluded(last.clone()), Bound::Unbounded))
                    .next()
                    .is_none()
            });

        let next = if exhausted {
            SCAN_DONE
        } else {
            state.next_cursor += 1;
            let id = state.next_cursor;
            if let Some((last, _)) = examined.last() {
                state.cursors.insert(id, last.clone());
            }
            id
        };

        Ok(ScanPage {
            cursor: next,
            keys: examined
                .into_iter()
                .filter(|(_, matched)| *matched)
                .map(|(k, _)| k)
                .collect(),
        })
    }
}

/// Match `text` against a Redis-style glob supporting `*`, `?` and `\` escapes.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_from(&pattern, &text)
}

fn glob_match_from(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|skip| glob_match_from(rest, &text[skip..])),
        Some(('?', rest)) => !text.is_empty() && glob_match_from(rest, &text[1..]),
        Some(('\\', rest)) if !rest.is_empty() => {
            text.first() == Some(&rest[0]) && glob_match_from(&rest[1..], &text[1..])
        }
        Some((c, rest)) => text.first() == Some(c) && glob_match_from(rest, &text[1..]),
    }
}
