use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A persisted collection whose contents can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Inventory,
    Parties,
    Transactions,
    Invoices,
    Quotations,
    Company,
}

impl Collection {
    /// Name of the webview event carrying this notification.
    pub fn event_name(&self) -> &'static str {
        match self {
            Collection::Inventory => "inventory-changed",
            Collection::Parties => "parties-changed",
            Collection::Transactions => "transactions-changed",
            Collection::Invoices => "invoices-changed",
            Collection::Quotations => "quotations-changed",
            Collection::Company => "company-changed",
        }
    }
}

type Listener = Arc<dyn Fn(Collection) + Send + Sync>;

/// "Go re-read the store" signals. Carries no payload.
#[derive(Default)]
pub struct ChangeBus {
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> u64
    where
        F: Fn(Collection) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        id
    }

    pub fn unsubscribe(&self, id: u64) -> bool {
        match self.listeners.lock() {
            Ok(mut listeners) => {
                let before = listeners.len();
                listeners.retain(|(existing, _)| *existing != id);
                listeners.len() != before
            }
            Err(_) => false,
        }
    }

    pub fn notify(&self, collection: Collection) {
        // Snapshot so a listener may subscribe or unsubscribe while being called
        let snapshot: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        tracing::debug!("{} -> {} listener(s)", collection.event_name(), snapshot.len());
        for listener in snapshot {
            listener(collection);
        }
    }
}
