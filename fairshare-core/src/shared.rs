use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::clock::{Clock, MonotonicClock};
use crate::owner::{Owner, OwnerName};
use crate::scheduler::{OwnerUsage, Scheduler};

/// Cloneable handle that serializes every call onto one [`Scheduler`].
///
/// Each method holds the lock for exactly one scheduler operation, so the
/// selection timeline stays linear no matter how many tasks share the handle.
pub struct SharedScheduler<T, C = MonotonicClock> {
    inner: Arc<Mutex<Scheduler<T, C>>>,
}

impl<T, C> Clone for SharedScheduler<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, C: Clock> SharedScheduler<T, C> {
    pub fn new(scheduler: Scheduler<T, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
        }
    }

    pub async fn add<I>(&self, owner: impl Into<OwnerName>, items: I) -> usize
    where
        T: PartialEq,
        I: IntoIterator<Item = T>,
    {
        self.inner.lock().await.add(owner, items)
    }

    pub async fn next(&self, destroy: bool) -> Option<T>
    where
        T: Clone,
    {
        self.inner.lock().await.next(destroy)
    }

    pub async fn pop_next(&self) -> Option<T> {
        self.inner.lock().await.pop_next()
    }

    pub async fn stop(&self) {
        self.inner.lock().await.stop();
    }

    pub async fn queue_len(&self, name: impl Into<OwnerName>) -> usize {
        self.inner.lock().await.queue_len(name)
    }

    pub async fn pending(&self) -> usize {
        self.inner.lock().await.pending()
    }

    pub async fn snapshot(&self) -> Vec<OwnerUsage> {
        self.inner.lock().await.snapshot()
    }

    pub async fn remove_owner(&self, name: impl Into<OwnerName>) -> Option<Owner<T>> {
        self.inner.lock().await.remove_owner(name)
    }

    pub async fn rename_owner(
        &self,
        from: impl Into<OwnerName>,
        to: impl Into<OwnerName>,
    ) -> Option<Owner<T>> {
        self.inner.lock().await.rename_owner(from, to)
    }

    /// Run `f` against the scheduler while holding the lock.
    pub async fn with<R>(&self, f: impl FnOnce(&mut Scheduler<T, C>) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}

impl<T, C> fmt::Debug for SharedScheduler<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("SharedScheduler");
        match self.inner.try_lock() {
            Ok(scheduler) => {
                debug.field("scheduler", &*scheduler);
            }
            Err(_) => {
                debug.field("scheduler", &"<locked>");
            }
        }
        debug.finish()
    }
}
