//! Change notification capability.
//!
//! # Responsibility
//! - Define the sink the provider calls after a state-changing write.
//! - Provide an in-process broadcaster that scopes delivery by address.
//!
//! # Invariants
//! - Notifications carry only the changed address, never record data.
//! - Delivery is fire-and-forget: a gone watcher never fails the writer.

use crate::router::ContentAddress;
use log::debug;
use parking_lot::Mutex;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;

/// Sink for "something changed at this address" signals.
pub trait ChangeNotifier {
    /// Broadcasts a change scoped to `address`.
    fn notify_change(&self, address: &ContentAddress);

    /// Registers interest in `address`.
    ///
    /// Returns `None` when the notifier does not support watches.
    fn watch(&self, address: &ContentAddress) -> Option<ChangeWatch> {
        let _ = address;
        None
    }
}

impl<T: ChangeNotifier + ?Sized> ChangeNotifier for &T {
    fn notify_change(&self, address: &ContentAddress) {
        (**self).notify_change(address);
    }

    fn watch(&self, address: &ContentAddress) -> Option<ChangeWatch> {
        (**self).watch(address)
    }
}

impl<T: ChangeNotifier + ?Sized> ChangeNotifier for Arc<T> {
    fn notify_change(&self, address: &ContentAddress) {
        (**self).notify_change(address);
    }

    fn watch(&self, address: &ContentAddress) -> Option<ChangeWatch> {
        (**self).watch(address)
    }
}

/// Notifier that drops every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify_change(&self, _address: &ContentAddress) {}
}

/// Receiving end of one registered watch.
#[derive(Debug)]
pub struct ChangeWatch {
    address: ContentAddress,
    receiver: Receiver<ContentAddress>,
}

impl ChangeWatch {
    /// Address this watch was registered on.
    pub fn address(&self) -> &ContentAddress {
        &self.address
    }

    /// Returns the next pending change without blocking.
    pub fn try_next(&self) -> Option<ContentAddress> {
        match self.receiver.try_recv() {
            Ok(address) => Some(address),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains pending changes and reports whether there were any.
    pub fn take_pending(&self) -> bool {
        let mut changed = false;
        while self.try_next().is_some() {
            changed = true;
        }
        changed
    }
}

#[derive(Debug)]
struct Observer {
    address: ContentAddress,
    sender: Sender<ContentAddress>,
}

/// In-process broadcaster.
///
/// A change on `A` reaches watches registered on `A`, on an ancestor of `A`
/// and on a descendant of `A`.
#[derive(Debug, Default)]
pub struct ChangeHub {
    observers: Mutex<Vec<Observer>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a watch on `address`.
    pub fn subscribe(&self, address: &ContentAddress) -> ChangeWatch {
        let (sender, receiver) = channel();
        self.observers.lock().push(Observer {
            address: address.clone(),
            sender,
        });
        ChangeWatch {
            address: address.clone(),
            receiver,
        }
    }

    /// Number of live registrations, including ones not yet pruned.
    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }
}

impl ChangeNotifier for ChangeHub {
    fn notify_change(&self, address: &ContentAddress) {
        let mut observers = self.observers.lock();
        let before = observers.len();
        let mut delivered = 0_usize;
        observers.retain(|observer| {
            if !observer.address.is_related_to(address) {
                return true;
            }
            let alive = observer.sender.send(address.clone()).is_ok();
            if alive {
                delivered += 1;
            }
            alive
        });
        debug!(
            "event=change_notify module=notify status=ok address={} delivered={} pruned={}",
            address,
            delivered,
            before - observers.len()
        );
    }

    fn watch(&self, address: &ContentAddress) -> Option<ChangeWatch> {
        Some(self.subscribe(address))
    }
}
