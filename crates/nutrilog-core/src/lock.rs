// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-resource FIFO mutual exclusion for write-then-read-identity sequences.
//!
//! Each resource name (a table) maps lazily to a lock with at most one
//! holder and a queue of waiters granted strictly in arrival order. Release
//! hands ownership directly to the queue head, so the lock never passes
//! through an unlocked state while someone is waiting.
//!
//! The manager is a cheap cloneable handle; every clone shares the same
//! lock table.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

/// Default bound on how long an acquire waits.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Lock acquisition and release failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// The bounded wait expired before the lock was granted.
    #[error("timed out after {waited:?} waiting for resource `{resource}`")]
    Timeout { resource: String, waited: Duration },

    /// A release without a matching acquire.
    #[error("release of resource `{resource}` without a matching acquire")]
    NotHeld { resource: String },

    /// The lock table went away while a waiter was queued.
    #[error("lock for resource `{resource}` was dropped while waiting")]
    Closed { resource: String },
}

impl LockError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

struct Waiter {
    ticket: u64,
    grant: oneshot::Sender<()>,
}

#[derive(Default)]
struct ResourceLock {
    holder: Option<u64>,
    queue: VecDeque<Waiter>,
}

#[derive(Default)]
struct LockTable {
    next_ticket: u64,
    resources: HashMap<String, ResourceLock>,
}

enum Enqueued {
    Granted(u64),
    Waiting(u64, oneshot::Receiver<()>),
}

/// Shared handle to the per-resource lock table.
#[derive(Clone)]
pub struct ResourceMutexManager {
    table: Arc<Mutex<LockTable>>,
    default_timeout: Option<Duration>,
}

impl Default for ResourceMutexManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResourceMutexManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceMutexManager")
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl ResourceMutexManager {
    /// A manager whose `acquire` waits at most [`DEFAULT_ACQUIRE_TIMEOUT`].
    pub fn new() -> Self {
        Self::with_timeout(Some(DEFAULT_ACQUIRE_TIMEOUT))
    }

    /// A manager with a custom default bound; `None` waits indefinitely.
    pub fn with_timeout(default_timeout: Option<Duration>) -> Self {
        Self {
            table: Arc::new(Mutex::new(LockTable::default())),
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Acquire `resource` using the manager's default bound.
    pub async fn acquire(&self, resource: &str) -> Result<ResourceGuard, LockError> {
        self.acquire_timeout(resource, self.default_timeout).await
    }

    /// Acquire `resource`, waiting at most `timeout` (or forever if `None`).
    ///
    /// A timed-out waiter withdraws from the queue. If the grant arrives in
    /// the same instant the wait expires, the grant wins and the guard is
    /// returned.
    pub async fn acquire_timeout(
        &self,
        resource: &str,
        timeout: Option<Duration>,
    ) -> Result<ResourceGuard, LockError> {
        let (ticket, rx) = match self.enqueue(resource) {
            Enqueued::Granted(ticket) => {
                debug!(resource, ticket, "lock granted immediately");
                return Ok(self.guard(resource, ticket));
            }
            Enqueued::Waiting(ticket, rx) => (ticket, rx),
        };

        debug!(resource, ticket, "lock busy, queued");
        let started = Instant::now();
        let mut pending = PendingGrant {
            manager: self,
            resource,
            ticket,
            rx,
            settled: false,
        };
        let closed = || LockError::Closed {
            resource: resource.to_string(),
        };

        match timeout {
            None => (&mut pending.rx).await.map_err(|_| closed())?,
            Some(limit) => match tokio::time::timeout(limit, &mut pending.rx).await {
                Ok(granted) => granted.map_err(|_| closed())?,
                Err(_) => {
                    if !pending.withdraw() {
                        warn!(resource, ticket, waited = ?started.elapsed(), "lock wait timed out");
                        return Err(LockError::Timeout {
                            resource: resource.to_string(),
                            waited: started.elapsed(),
                        });
                    }
                    debug!(resource, ticket, "lock granted as the wait expired");
                }
            },
        }
        pending.settled = true;

        debug!(resource, ticket, waited = ?started.elapsed(), "lock handed over");
        Ok(self.guard(resource, ticket))
    }

    /// Release the current holder of `resource`.
    ///
    /// Prefer dropping or releasing the [`ResourceGuard`]; this entry point
    /// is for callers that pair acquire and release themselves. Releasing a
    /// resource nobody holds is a protocol violation and fails.
    pub fn release(&self, resource: &str) -> Result<(), LockError> {
        self.release_ticket(resource, None)
    }

    /// Whether `resource` currently has a holder.
    pub fn is_locked(&self, resource: &str) -> bool {
        self.table()
            .resources
            .get(resource)
            .is_some_and(|lock| lock.holder.is_some())
    }

    /// Number of waiters queued behind the holder of `resource`.
    pub fn queue_len(&self, resource: &str) -> usize {
        self.table()
            .resources
            .get(resource)
            .map_or(0, |lock| lock.queue.len())
    }

    fn table(&self) -> MutexGuard<'_, LockTable> {
        // The table is left consistent between statements, so a poisoned
        // lock is still safe to use.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, resource: &str) -> Enqueued {
        let mut table = self.table();
        table.next_ticket += 1;
        let ticket = table.next_ticket;
        let lock = table.resources.entry(resource.to_string()).or_default();

        if lock.holder.is_none() {
            lock.holder = Some(ticket);
            return Enqueued::Granted(ticket);
        }

        let (grant, rx) = oneshot::channel();
        lock.queue.push_back(Waiter { ticket, grant });
        Enqueued::Waiting(ticket, rx)
    }

    fn guard(&self, resource: &str, ticket: u64) -> ResourceGuard {
        ResourceGuard {
            manager: self.clone(),
            resource: resource.to_string(),
            ticket,
            released: false,
        }
    }

    fn release_ticket(&self, resource: &str, ticket: Option<u64>) -> Result<(), LockError> {
        let mut table = self.table();
        let lock = table.resources.get_mut(resource);

        let matched = match (&lock, ticket) {
            (Some(lock), Some(ticket)) => lock.holder == Some(ticket),
            (Some(lock), None) => lock.holder.is_some(),
            (None, _) => false,
        };
        let Some(lock) = lock.filter(|_| matched) else {
            error!(resource, ?ticket, "release without a matching acquire");
            return Err(LockError::NotHeld {
                resource: resource.to_string(),
            });
        };

        while let Some(waiter) = lock.queue.pop_front() {
            if waiter.grant.send(()).is_ok() {
                lock.holder = Some(waiter.ticket);
                debug!(resource, ticket = waiter.ticket, "lock passed to next waiter");
                return Ok(());
            }
            debug!(resource, ticket = waiter.ticket, "skipping abandoned waiter");
        }

        lock.holder = None;
        debug!(resource, "lock released");
        Ok(())
    }
}

/// A queued acquire. A waiter that stops waiting, by timing out or by its
/// future being dropped, leaves the queue here; a grant that already
/// reached it is passed on.
struct PendingGrant<'a> {
    manager: &'a ResourceMutexManager,
    resource: &'a str,
    ticket: u64,
    rx: oneshot::Receiver<()>,
    settled: bool,
}

impl PendingGrant<'_> {
    /// Stop waiting. Returns `true` if the grant had already been sent.
    ///
    /// Grants are only sent with the table locked, so checking and removing
    /// under the same lock cannot miss one.
    fn withdraw(&mut self) -> bool {
        self.settled = true;
        let manager = self.manager;
        let mut table = manager.table();
        self.rx.close();
        if self.rx.try_recv().is_ok() {
            return true;
        }
        if let Some(lock) = table.resources.get_mut(self.resource) {
            let ticket = self.ticket;
            lock.queue.retain(|w| w.ticket != ticket);
        }
        false
    }
}

impl Drop for PendingGrant<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if self.withdraw() {
            debug!(resource = self.resource, ticket = self.ticket, "abandoned grant passed on");
            let _ = self.manager.release_ticket(self.resource, Some(self.ticket));
        }
    }
}

/// Proof of holding a resource lock. Dropping it releases the lock.
#[must_use = "dropping the guard releases the lock immediately"]
pub struct ResourceGuard {
    manager: ResourceMutexManager,
    resource: String,
    ticket: u64,
    released: bool,
}

impl ResourceGuard {
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Release explicitly and surface a protocol violation, if any.
    pub fn release(mut self) -> Result<(), LockError> {
        self.released = true;
        self.manager.release_ticket(&self.resource, Some(self.ticket))
    }
}

impl std::fmt::Debug for ResourceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGuard")
            .field("resource", &self.resource)
            .field("ticket", &self.ticket)
            .finish()
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        if !self.released {
            // Failure is already logged at error level by the manager.
            let _ = self.manager.release_ticket(&self.resource, Some(self.ticket));
        }
    }
}
