//! Async host for a cart: shared access plus a task that fires removal timers
//! on wall-clock time.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, Notify};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::manager::CartManager;
use crate::store::KeyValueStore;
use crate::timer::Clock;

/// Cheaply cloneable handle to a cart shared between tasks.
///
/// Mutations go through [`CartHandle::update`], which wakes the timer task so
/// a newly requested removal is picked up without polling.
pub struct CartHandle<S, C> {
    inner: Arc<Mutex<CartManager<S, C>>>,
    wake: Arc<Notify>,
}

impl<S, C> Clone for CartHandle<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            wake: Arc::clone(&self.wake),
        }
    }
}

impl<S, C> CartHandle<S, C>
where
    S: KeyValueStore + Send + 'static,
    C: Clock + Send + 'static,
{
    #[must_use]
    pub fn new(manager: CartManager<S, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Run `f` against the cart, then wake the timer task.
    pub async fn update<R>(&self, f: impl FnOnce(&mut CartManager<S, C>) -> R) -> R {
        let result = {
            let mut cart = self.inner.lock().await;
            f(&mut cart)
        };
        self.wake.notify_one();
        result
    }

    /// Read-only access. Mutating through the guard does not wake the timer
    /// task; use [`Self::update`] for that.
    pub async fn lock(&self) -> MutexGuard<'_, CartManager<S, C>> {
        self.inner.lock().await
    }

    /// Spawn the timer task. It runs until aborted.
    #[must_use]
    pub fn spawn_timers(&self) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move { handle.run_timers().await })
    }

    /// Fire due timers, then sleep until the next deadline or until woken by
    /// [`Self::update`]. Never returns.
    pub async fn run_timers(&self) {
        loop {
            let wait = {
                let mut cart = self.inner.lock().await;
                let removed = cart.fire_due_timers();
                if !removed.is_empty() {
                    debug!(count = removed.len(), "Expired removals applied");
                }
                cart.time_until_next_timer()
            };

            match wait {
                Some(delay) => {
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = self.wake.notified() => {}
                    }
                }
                None => self.wake.notified().await,
            }
        }
    }
}
