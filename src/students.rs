//! Student display-name resolution for audit logs.
//!
//! Audit payloads reference students by opaque id. [`StudentCache`] turns
//! those ids into `{username, name}` pairs, memoizing every answer (including
//! fallbacks for failed lookups) for the lifetime of its owner.
//!
//! Concurrent callers asking for the same uncached id share one in-flight
//! lookup. Cancelling the cache abandons outstanding lookups; their waiters
//! receive the fallback label and nothing is stored.

use crate::api::SchoolApiError;
use crate::api::models::StudentRecord;
use crate::audit::AuditLogEntry;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use ts_rs::TS;

const UNKNOWN_STUDENT: &str = "Unknown Student";

/// Display information for a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StudentInfo {
    pub username: String,
    pub name: String,
}

impl StudentInfo {
    /// Label used when a student cannot be looked up.
    pub fn fallback(id: &str) -> Self {
        let label = format!("Student {}", last_chars(id, 8));
        Self {
            username: label.clone(),
            name: label,
        }
    }

    /// Build display info from a directory record.
    pub fn from_record(id: &str, record: &StudentRecord) -> Self {
        let non_blank = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        let username = non_blank(&record.username).unwrap_or_else(|| Self::fallback(id).username);
        let name = match (non_blank(&record.name), non_blank(&record.surname)) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first,
            (None, Some(last)) => last,
            (None, None) => UNKNOWN_STUDENT.to_owned(),
        };

        Self { username, name }
    }
}

/// The trailing `n` characters of `s`, or all of `s` if it is shorter.
fn last_chars(s: &str, n: usize) -> &str {
    match s.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) if n > 0 => &s[idx..],
        _ if n == 0 => "",
        _ => s,
    }
}

/// Source of student records.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    async fn fetch_student(&self, id: &str) -> Result<StudentRecord, SchoolApiError>;
}

/// Synchronous read access to already-resolved students.
pub trait StudentLookup {
    fn get(&self, id: &str) -> Option<StudentInfo>;
}

/// A lookup that never knows anyone. Formatting falls back to raw ids.
pub struct NoStudents;

impl StudentLookup for NoStudents {
    fn get(&self, _id: &str) -> Option<StudentInfo> {
        None
    }
}

type PendingLookup = Shared<BoxFuture<'static, StudentInfo>>;

/// Memoizing, single-flight student resolver. Clone-cheap.
#[derive(Clone)]
pub struct StudentCache {
    directory: Arc<dyn StudentDirectory>,
    /// id → resolved info. Never evicted.
    entries: Arc<DashMap<String, StudentInfo>>,
    /// id → lookup currently in flight.
    inflight: Arc<DashMap<String, PendingLookup>>,
    cancel: CancellationToken,
}

impl StudentCache {
    pub fn new(directory: Arc<dyn StudentDirectory>) -> Self {
        Self::with_token(directory, CancellationToken::new())
    }

    /// Create a cache whose lifetime is bound to `cancel` (typically a child
    /// token of the owner's shutdown token).
    pub fn with_token(directory: Arc<dyn StudentDirectory>, cancel: CancellationToken) -> Self {
        Self {
            directory,
            entries: Arc::new(DashMap::new()),
            inflight: Arc::new(DashMap::new()),
            cancel,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Abandon all outstanding lookups. Already-cached entries stay readable.
    pub fn shutdown(&self) {
        if !self.cancel.is_cancelled() {
            debug!(
                cached = self.entries.len(),
                inflight = self.inflight.len(),
                "Student cache shutting down"
            );
        }
        self.cancel.cancel();
    }

    /// Resolve one student id. Never fails; failures become [`StudentInfo::fallback`].
    pub async fn resolve(&self, id: &str) -> StudentInfo {
        if let Some(hit) = self.entries.get(id) {
            trace!(student_id = id, "Student cache hit");
            return hit.value().clone();
        }
        if self.cancel.is_cancelled() {
            return StudentInfo::fallback(id);
        }

        let pending = match self.inflight.entry(id.to_owned()) {
            Entry::Occupied(existing) => {
                trace!(student_id = id, "Joining in-flight student lookup");
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                // A lookup may have finished between the first check and taking the slot.
                if let Some(hit) = self.entries.get(id) {
                    return hit.value().clone();
                }
                slot.insert(self.spawn_lookup(id.to_owned())).value().clone()
            }
        };

        pending.await
    }

    /// Run the lookup on its own task so it finishes and is stored even if
    /// every waiter goes away.
    fn spawn_lookup(&self, id: String) -> PendingLookup {
        let directory = self.directory.clone();
        let entries = self.entries.clone();
        let inflight = self.inflight.clone();
        let cancel = self.cancel.clone();
        let fallback = StudentInfo::fallback(&id);

        let task = tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => None,
                result = directory.fetch_student(&id) => Some(result),
            };

            let info = match outcome {
                None => {
                    debug!(student_id = %id, "Student lookup cancelled");
                    inflight.remove(&id);
                    return StudentInfo::fallback(&id);
                }
                Some(Ok(record)) => StudentInfo::from_record(&id, &record),
                Some(Err(e)) => {
                    warn!(student_id = %id, error = %e, "Student lookup failed, using fallback label");
                    StudentInfo::fallback(&id)
                }
            };

            // Store before releasing the in-flight slot so later callers see the entry.
            entries.insert(id.clone(), info.clone());
            inflight.remove(&id);
            info
        });

        async move {
            task.await.unwrap_or_else(|e| {
                warn!(error = %e, "Student lookup task failed");
                fallback
            })
        }
        .boxed()
        .shared()
    }

    /// Resolve every distinct student referenced by `logs`, concurrently.
    ///
    /// Returns the number of distinct ids. Individual failures never fail the
    /// batch; cancellation ends the wait early.
    pub async fn resolve_all(&self, logs: &[AuditLogEntry]) -> usize {
        let mut seen = HashSet::new();
        let ids: Vec<String> = logs
            .iter()
            .filter_map(AuditLogEntry::student_id)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        if ids.is_empty() {
            return 0;
        }

        let count = ids.len();
        debug!(students = count, logs = logs.len(), "Resolving students for audit logs");

        let batch = join_all(ids.iter().map(|id| self.resolve(id)));
        tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!(students = count, "Student resolution abandoned");
            }
            _ = batch => {}
        }
        count
    }
}

impl StudentLookup for StudentCache {
    fn get(&self, id: &str) -> Option<StudentInfo> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }
}
