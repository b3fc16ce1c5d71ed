//! Single-slot notification signal
//!
//! Reports operation outcomes to the presentation layer. The slot holds at
//! most one message: a new one replaces an unacknowledged one (last write
//! wins, no queue). Subscribers see every change of the slot through a
//! `tokio::sync::watch` receiver.

use crate::types::Notice;
use tokio::sync::watch;

/// Latest-message channel
#[derive(Debug)]
pub struct NotificationSignal {
    slot: watch::Sender<Option<Notice>>,
}

impl NotificationSignal {
    /// Create empty signal
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot }
    }

    /// Store a message, replacing any pending one
    pub fn set(&self, title: impl Into<String>, body: impl Into<String>) {
        self.emit(Notice::new(title, body));
    }

    /// Store a prepared notice, replacing any pending one
    pub fn emit(&self, notice: Notice) {
        tracing::debug!(title = %notice.title, "notification");
        if let Some(dropped) = self.slot.send_replace(Some(notice)) {
            tracing::trace!(title = %dropped.title, "overwrote unacknowledged notification");
        }
    }

    /// Clear the slot, returning what was pending
    pub fn acknowledge(&self) -> Option<Notice> {
        self.slot.send_replace(None)
    }

    /// Pending message, if any
    #[must_use]
    pub fn pending(&self) -> Option<Notice> {
        self.slot.borrow().clone()
    }

    /// Observe changes of the slot
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.slot.subscribe()
    }
}

impl Default for NotificationSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_acknowledge() {
        let signal = NotificationSignal::new();
        assert!(signal.pending().is_none());

        signal.set("Cita solicitada", "ok");
        assert_eq!(signal.pending(), Some(Notice::new("Cita solicitada", "ok")));

        let acked = signal.acknowledge();
        assert_eq!(acked, Some(Notice::new("Cita solicitada", "ok")));
        assert!(signal.pending().is_none());

        // Nothing pending any more
        assert!(signal.acknowledge().is_none());
    }

    #[test]
    fn last_write_wins() {
        let signal = NotificationSignal::new();
        signal.set("first", "");
        signal.set("second", "");

        assert_eq!(signal.pending().unwrap().title, "second");
        signal.acknowledge();
        assert!(signal.pending().is_none());
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let signal = NotificationSignal::new();
        let mut rx = signal.subscribe();

        signal.set("Cita cancelada", "La cita ha sido marcada como cancelada.");
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|n| n.title.as_str()),
            Some("Cita cancelada")
        );

        signal.acknowledge();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }
}
