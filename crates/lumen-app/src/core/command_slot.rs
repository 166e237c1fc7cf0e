//! # Command Slot
//!
//! Single-slot registry for actions invoked from outside the composer, such
//! as a header "generate" button. The composer registers when it opens and
//! the registration is dropped when it closes. Commands are delivered over a
//! channel rather than by calling into the composer directly.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

/// Command deliverable to the open composer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComposerCommand {
    /// Run a submission attempt
    Generate,
}

#[derive(Debug)]
struct Registered {
    id: u64,
    tx: mpsc::UnboundedSender<ComposerCommand>,
}

#[derive(Debug, Default)]
struct SlotInner {
    next_id: AtomicU64,
    current: Mutex<Option<Registered>>,
}

impl SlotInner {
    fn clear_if(&self, id: u64) -> bool {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|r| r.id == id) {
            *current = None;
            true
        } else {
            false
        }
    }
}

/// Shared handle to the slot. Clones refer to the same slot.
#[derive(Clone, Debug, Default)]
pub struct CommandSlot {
    inner: Arc<SlotInner>,
}

/// Proof of registration. Dropping it unregisters, unless a newer
/// registration has replaced it.
#[derive(Debug)]
pub struct SlotRegistration {
    id: u64,
    slot: Weak<SlotInner>,
}

impl Drop for SlotRegistration {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.upgrade() {
            if slot.clear_if(self.id) {
                tracing::debug!(id = self.id, "command slot unregistered");
            }
        }
    }
}

impl CommandSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot, replacing any previous registration.
    pub fn register(&self) -> (SlotRegistration, mpsc::UnboundedReceiver<ComposerCommand>) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.current.lock() = Some(Registered { id, tx });
        tracing::debug!(id, "command slot registered");
        (
            SlotRegistration {
                id,
                slot: Arc::downgrade(&self.inner),
            },
            rx,
        )
    }

    /// Release a registration. Same as dropping it.
    pub fn unregister(&self, registration: SlotRegistration) {
        drop(registration);
    }

    /// Whether anything is registered.
    pub fn is_registered(&self) -> bool {
        self.inner.current.lock().is_some()
    }

    /// Deliver a command. Returns `false` when nothing is listening.
    pub fn invoke(&self, command: ComposerCommand) -> bool {
        let mut current = self.inner.current.lock();
        let Some(registered) = current.as_ref() else {
            return false;
        };
        if registered.tx.send(command).is_ok() {
            return true;
        }
        // Receiver is gone; free the slot
        *current = None;
        false
    }
}
