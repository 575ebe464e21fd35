use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{runtime::Handle, task::JoinHandle, time::Instant};
use tracing::debug;

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(3);
/// Longer lifetimes are clamped so the deadline stays representable.
const MAX_NOTIFICATION_TTL: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Default)]
struct Slot {
    current: Option<Notification>,
    generation: u64,
}

/// Holds at most one transient message.
///
/// Each `notify` cancels the clear task scheduled by the previous one, and a
/// clear task only empties the slot if no newer message replaced its own.
pub struct NotificationCenter {
    slot: Arc<Mutex<Slot>>,
    timer: Option<JoinHandle<()>>,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            timer: None,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        lock_slot(&self.slot)
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        let expires_at = Instant::now() + self.ttl.min(MAX_NOTIFICATION_TTL);
        debug!(%message, "notification raised");

        let generation = {
            let mut slot = self.slot();
            slot.generation += 1;
            slot.current = Some(Notification {
                message,
                expires_at,
            });
            slot.generation
        };

        self.cancel_timer();
        // Outside a runtime nothing is scheduled; `current` still honors the
        // expiry on read.
        if let Ok(handle) = Handle::try_current() {
            let slot = Arc::clone(&self.slot);
            self.timer = Some(handle.spawn(async move {
                tokio::time::sleep_until(expires_at).await;
                let mut guard = lock_slot(&slot);
                if guard.generation == generation {
                    guard.current = None;
                }
            }));
        }
    }

    /// The live message, if any.
    pub fn current(&self) -> Option<String> {
        self.notification().map(|notification| notification.message)
    }

    pub fn notification(&self) -> Option<Notification> {
        let slot = self.slot();
        slot.current
            .as_ref()
            .filter(|notification| notification.expires_at > Instant::now())
            .cloned()
    }

    pub fn dismiss(&mut self) {
        self.cancel_timer();
        let mut slot = self.slot();
        slot.generation += 1;
        slot.current = None;
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn lock_slot(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/notification_tests.rs"]
mod tests;
