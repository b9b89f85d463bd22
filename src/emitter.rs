//! Synchronous, single-threaded event emitter.
//!
//! Listeners are keyed by event name and run in registration order. The
//! listener list is snapshotted before dispatch, so a listener may register,
//! remove listeners or trigger further emissions without invalidating the
//! dispatch in progress.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<A> = Rc<dyn Fn(&A)>;

struct Entry<A> {
    id: ListenerId,
    once: bool,
    callback: Callback<A>,
}

pub struct EventEmitter<K, A> {
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<K, Vec<Entry<A>>>>,
}

impl<K, A> Default for EventEmitter<K, A> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(1),
            listeners: RefCell::new(HashMap::new()),
        }
    }
}

impl<K, A> fmt::Debug for EventEmitter<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.listeners.borrow().values().map(Vec::len).sum();
        f.debug_struct("EventEmitter")
            .field("listeners", &total)
            .finish()
    }
}

impl<K: Eq + Hash, A> EventEmitter<K, A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, key: K, callback: impl Fn(&A) + 'static) -> ListenerId {
        self.insert(key, Rc::new(callback), false)
    }

    /// Registers a listener that is removed right before its first invocation.
    pub fn once(&self, key: K, callback: impl Fn(&A) + 'static) -> ListenerId {
        self.insert(key, Rc::new(callback), true)
    }

    fn insert(&self, key: K, callback: Callback<A>, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .entry(key)
            .or_default()
            .push(Entry { id, once, callback });
        id
    }

    /// Removes a listener. Returns false when it was not registered under `key`.
    pub fn off(&self, key: &K, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let Some(bucket) = listeners.get_mut(key) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|entry| entry.id != id);
        let removed = bucket.len() != before;
        if bucket.is_empty() {
            listeners.remove(key);
        }
        removed
    }

    /// Removes every listener for `key`, or every listener at all.
    pub fn remove_all(&self, key: Option<&K>) {
        let mut listeners = self.listeners.borrow_mut();
        match key {
            Some(key) => {
                listeners.remove(key);
            }
            None => listeners.clear(),
        }
    }

    pub fn listener_count(&self, key: &K) -> usize {
        self.listeners.borrow().get(key).map_or(0, Vec::len)
    }

    /// Invokes the listeners for `key`. Returns whether any listener ran.
    pub fn emit(&self, key: &K, args: &A) -> bool {
        let callbacks: Vec<Callback<A>> = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(bucket) = listeners.get_mut(key) else {
                return false;
            };
            let callbacks = bucket.iter().map(|entry| Rc::clone(&entry.callback)).collect();
            bucket.retain(|entry| !entry.once);
            if bucket.is_empty() {
                listeners.remove(key);
            }
            callbacks
        };

        for callback in &callbacks {
            callback(args);
        }
        !callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn Fn(&u32)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &'static str| -> Box<dyn Fn(&u32)> {
            let sink = Rc::clone(&sink);
            Box::new(move |value: &u32| sink.borrow_mut().push(format!("{name}:{value}")))
        };
        (log, make)
    }

    #[test]
    fn runs_in_registration_order() {
        let emitter = EventEmitter::<&str, u32>::new();
        let (log, make) = recorder();
        let first = make("first");
        let second = make("second");
        emitter.on("tick", move |v| first(v));
        emitter.on("tick", move |v| second(v));
        emitter.on("other", |_| panic!("wrong key"));

        assert!(emitter.emit(&"tick", &7));
        assert_eq!(*log.borrow(), vec!["first:7", "second:7"]);
    }

    #[test]
    fn once_fires_a_single_time() {
        let emitter = EventEmitter::<&str, u32>::new();
        let (log, make) = recorder();
        let cb = make("once");
        emitter.once("tick", move |v| cb(v));

        assert!(emitter.emit(&"tick", &1));
        assert!(!emitter.emit(&"tick", &2));
        assert_eq!(*log.borrow(), vec!["once:1"]);
        assert_eq!(emitter.listener_count(&"tick"), 0);
    }

    #[test]
    fn off_removes_only_the_given_listener() {
        let emitter = EventEmitter::<&str, u32>::new();
        let (log, make) = recorder();
        let a = make("a");
        let b = make("b");
        let id = emitter.on("tick", move |v| a(v));
        emitter.on("tick", move |v| b(v));

        assert!(emitter.off(&"tick", id));
        assert!(!emitter.off(&"tick", id));
        assert!(!emitter.off(&"missing", id));
        emitter.emit(&"tick", &3);
        assert_eq!(*log.borrow(), vec!["b:3"]);
    }

    #[test]
    fn listener_may_unregister_during_dispatch() {
        let emitter = Rc::new(EventEmitter::<&str, u32>::new());
        let hits = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let inner = Rc::clone(&emitter);
        let counter = Rc::clone(&hits);
        let own_id = Rc::clone(&slot);
        let id = emitter.on("tick", move |_| {
            counter.set(counter.get() + 1);
            if let Some(id) = own_id.get() {
                inner.off(&"tick", id);
            }
        });
        slot.set(Some(id));

        emitter.emit(&"tick", &0);
        emitter.emit(&"tick", &0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn remove_all() {
        let emitter = EventEmitter::<&str, u32>::new();
        emitter.on("a", |_| {});
        emitter.on("a", |_| {});
        emitter.on("b", |_| {});
        assert_eq!(emitter.listener_count(&"a"), 2);

        emitter.remove_all(Some(&"a"));
        assert_eq!(emitter.listener_count(&"a"), 0);
        assert_eq!(emitter.listener_count(&"b"), 1);

        emitter.remove_all(None);
        assert_eq!(emitter.listener_count(&"b"), 0);
    }
}
