//! Contact-inquiry notifications.
//!
//! One event is published per inserted inquiry and fanned out over a tokio
//! broadcast channel. Delivery is best-effort: a subscriber that lags or
//! connects late does not get a replay. Dropping the receiver (or the SSE
//! response it feeds) cancels the subscription.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Pushed to admin subscribers whenever a contact inquiry is inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryEvent {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Fan-out point for inquiry events plus the unread counter.
pub struct NotificationHub {
    sender: broadcast::Sender<InquiryEvent>,
    unread: AtomicU64,
    seeded: AtomicBool,
}

const CHANNEL_CAPACITY: usize = 64;

impl NotificationHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            unread: AtomicU64::new(0),
            seeded: AtomicBool::new(false),
        }
    }

    /// Process-wide hub shared by the contact handler and the admin stream
    pub fn global() -> &'static NotificationHub {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<NotificationHub> = OnceLock::new();
        INSTANCE.get_or_init(NotificationHub::new)
    }

    /// Publish an event and bump the unread counter. Fire-and-forget: a send
    /// with no live subscribers is not an error.
    pub fn publish(&self, event: InquiryEvent) {
        self.unread.fetch_add(1, Ordering::Relaxed);
        let receivers = self.sender.receiver_count();
        if self.sender.send(event).is_err() {
            tracing::debug!("inquiry event dropped: no subscribers");
        } else {
            tracing::debug!("inquiry event delivered to {} subscriber(s)", receivers);
        }
    }

    /// New subscription handle. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<InquiryEvent> {
        self.sender.subscribe()
    }

    /// Seed the unread counter once from a stored row count. Later calls are
    /// no-ops so live increments are not clobbered.
    pub fn seed_unread(&self, count: u64) {
        if self
            .seeded
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.unread.store(count, Ordering::Relaxed);
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded.load(Ordering::SeqCst)
    }

    pub fn unread(&self) -> u64 {
        self.unread.load(Ordering::Relaxed)
    }

    /// Idempotent mark-seen: zero the counter no matter how many times it
    /// is called.
    pub fn mark_seen(&self) {
        self.unread.store(0, Ordering::Relaxed);
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
