use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

/// Single-slot mailbox: every `set` overwrites the previous value, and
/// receivers only ever observe the newest one.
pub struct Latest1Queue<T> {
    slot: Mutex<Slot<T>>,
    notify_any: Notify,
}

struct Slot<T> {
    value: Option<T>,
    version: u64,
    closed: bool,
}

impl<T: Clone> Latest1Queue<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(Slot {
                value: None,
                version: 0,
                closed: false,
            }),
            notify_any: Notify::new(),
        })
    }

    pub fn set(&self, value: T) {
        let mut slot = self.slot.lock().expect("Latest1Queue poisoned");
        slot.value = Some(value);
        slot.version += 1;
        drop(slot);
        self.notify_any.notify_waiters();
    }

    /// Wake all receivers; they drain the last value and then see `None`.
    pub fn close(&self) {
        self.slot.lock().expect("Latest1Queue poisoned").closed = true;
        self.notify_any.notify_waiters();
    }

    pub fn subscribe(self: &Arc<Self>) -> Latest1Receiver<T> {
        Latest1Receiver {
            queue: Arc::clone(self),
            seen: 0,
        }
    }

    fn newer_than(&self, seen: u64) -> Poll<T> {
        let slot = self.slot.lock().expect("Latest1Queue poisoned");
        match &slot.value {
            Some(value) if slot.version > seen => Poll::Ready(slot.version, value.clone()),
            _ if slot.closed => Poll::Closed,
            _ => Poll::Pending,
        }
    }
}

enum Poll<T> {
    Ready(u64, T),
    Pending,
    Closed,
}

pub struct Latest1Receiver<T> {
    queue: Arc<Latest1Queue<T>>,
    seen: u64,
}

impl<T: Clone> Latest1Receiver<T> {
    pub fn try_recv(&mut self) -> Option<T> {
        match self.queue.newer_than(self.seen) {
            Poll::Ready(version, value) => {
                self.seen = version;
                Some(value)
            }
            Poll::Pending | Poll::Closed => None,
        }
    }

    /// Wait for a value newer than the last one seen. `None` once closed.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            let notified = self.queue.notify_any.notified();
            match self.queue.newer_than(self.seen) {
                Poll::Ready(version, value) => {
                    self.seen = version;
                    return Some(value);
                }
                Poll::Closed => return None,
                Poll::Pending => notified.await,
            }
        }
    }
}
