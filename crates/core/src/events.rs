use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::manager::SnippetManager;

/// Kind of change a [`SnippetManager`] reports to its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Delete,
    Update,
    Save,
    Load,
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Receives change notifications from a [`SnippetManager`].
pub trait SnippetSetListener {
    fn snippets_changed(&self, manager: &SnippetManager, kind: ChangeKind);
}

impl<F> SnippetSetListener for F
where
    F: Fn(&SnippetManager, ChangeKind),
{
    fn snippets_changed(&self, manager: &SnippetManager, kind: ChangeKind) {
        self(manager, kind)
    }
}

/// Ordered listener registry with snapshot dispatch.
///
/// Dispatch walks a copy of the list taken when `notify` starts, so a listener
/// may subscribe or unsubscribe (itself or others) while being notified. Such
/// changes apply from the next dispatch on.
pub struct Observers<L: ?Sized> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, Rc<L>)>>,
}

impl<L: ?Sized> Observers<L> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, listener: Rc<L>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn notify(&self, mut deliver: impl FnMut(&L)) {
        let snapshot: Vec<Rc<L>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            deliver(&*listener);
        }
    }
}

impl<L: ?Sized> Default for Observers<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for Observers<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_subscription_order() {
        let observers: Observers<dyn Fn(&mut Vec<u8>)> = Observers::new();
        observers.subscribe(Rc::new(|log: &mut Vec<u8>| log.push(1)));
        observers.subscribe(Rc::new(|log: &mut Vec<u8>| log.push(2)));
        let mut log = Vec::new();
        observers.notify(|listener| listener(&mut log));
        assert_eq!(log, vec![1, 2]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let hits = Rc::new(Cell::new(0));
        let observers: Observers<dyn Fn()> = Observers::new();
        let counter = Rc::clone(&hits);
        let id = observers.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
        observers.notify(|listener| listener());
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.notify(|listener| listener());
        assert_eq!(hits.get(), 1);
        assert!(observers.is_empty());
    }

    #[test]
    fn subscribing_during_dispatch_applies_next_time() {
        let observers: Rc<Observers<dyn Fn()>> = Rc::new(Observers::new());
        let hits = Rc::new(Cell::new(0));
        let registry = Rc::clone(&observers);
        let counter = Rc::clone(&hits);
        observers.subscribe(Rc::new(move || {
            let counter = Rc::clone(&counter);
            registry.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
        }));

        observers.notify(|listener| listener());
        assert_eq!(hits.get(), 0);
        assert_eq!(observers.len(), 2);

        observers.notify(|listener| listener());
        assert_eq!(hits.get(), 1);
    }
}
