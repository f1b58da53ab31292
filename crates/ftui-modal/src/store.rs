#![forbid(unsafe_code)]

//! Observable, ordered registry of open modals.
//!
//! The `ModalStore` owns every open [`ModalEntry`]. Insertion order is
//! stacking order: the last entry renders on top. Listeners receive the full
//! ordered snapshot after each mutation.
//!
//! # Invariants
//!
//! - Keys are unique within a store at all times.
//! - Every inserted entry gets a fresh serial. Close handles are bound to
//!   that serial, so a handle for a removed entry never closes a later entry
//!   that happens to reuse its key.
//! - An entry is present from `open` until the dismissal that removes it;
//!   nothing reorders entries.
//! - Entries leave only through [`ModalStore::dismiss`] or
//!   [`ModalStore::close_all`]. Both settle a prompt entry's [`Resolver`]
//!   through the same helper, after listeners have seen the entry
//!   disappear.
//! - Notifications are synchronous, in subscription order, with no store
//!   borrow held.
//!
//! # Re-entrancy
//!
//! A listener may open or close modals on the store that is notifying it.
//! That is allowed, but it starts a nested notification cycle before the
//! outer one finishes, so later listeners in the outer cycle may observe a
//! snapshot that is already stale.
//!
//! # Failure Modes
//!
//! - `close()` / `dismiss()` on an absent key removes nothing and returns
//!   `false`.
//! - `update()` on an absent key returns `false` without notifying.

use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::handle::{CloseHandle, Closer, DismissFn};
use crate::key::{ModalKey, generate_key};
use crate::mapping::Mapping;
use crate::prompt::{PromptResult, Resolver};
use crate::subscription::{Listeners, Subscription};

/// One tracked modal instance.
#[derive(Debug, Clone)]
pub struct ModalEntry<V, C> {
    key: ModalKey,
    serial: u64,
    variant: V,
    content: C,
    settings: Mapping,
    props: Mapping,
    resolver: Option<Resolver>,
}

impl<V, C> ModalEntry<V, C> {
    #[must_use]
    pub fn key(&self) -> &ModalKey {
        &self.key
    }

    /// Insertion identity; survives `update`.
    pub(crate) fn serial(&self) -> u64 {
        self.serial
    }

    /// Presentation wrapper chosen for this entry.
    #[must_use]
    pub fn variant(&self) -> &V {
        &self.variant
    }

    /// Caller-supplied content renderer.
    #[must_use]
    pub fn content(&self) -> &C {
        &self.content
    }

    #[must_use]
    pub fn settings(&self) -> &Mapping {
        &self.settings
    }

    #[must_use]
    pub fn props(&self) -> &Mapping {
        &self.props
    }

    /// Whether this entry was created by a prompt.
    ///
    /// Stays `true` on snapshots taken after the prompt has settled.
    #[must_use]
    pub fn is_prompt(&self) -> bool {
        self.resolver.is_some()
    }
}

/// Options for [`ModalStore::open`].
#[derive(Debug)]
pub struct OpenOptions<V> {
    variant: V,
    settings: Mapping,
    props: Mapping,
    resolver: Option<Resolver>,
}

impl<V> OpenOptions<V> {
    /// Options for the given variant, with empty settings and props.
    pub fn new(variant: V) -> Self {
        Self {
            variant,
            settings: Mapping::new(),
            props: Mapping::new(),
            resolver: None,
        }
    }

    #[must_use]
    pub fn settings(mut self, settings: Mapping) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn props(mut self, props: Mapping) -> Self {
        self.props = props;
        self
    }

    /// Attach a one-shot resolver, turning the entry into a prompt.
    #[must_use]
    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

/// Partial update applied by [`ModalStore::update`].
///
/// Both mappings are shallow-merged into the live entry.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub settings: Mapping,
    pub props: Mapping,
}

impl EntryPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn settings(mut self, settings: Mapping) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn props(mut self, props: Mapping) -> Self {
        self.props = props;
        self
    }
}

type Entry<V, C> = Rc<ModalEntry<V, C>>;

struct StoreInner<V, C> {
    registry: RefCell<IndexMap<ModalKey, Entry<V, C>>>,
    listeners: Listeners<Entry<V, C>>,
    next_serial: Cell<u64>,
}

/// Shared handle to a modal registry.
///
/// Cloning is cheap and yields a handle to the same registry.
pub struct ModalStore<V, C> {
    inner: Rc<StoreInner<V, C>>,
}

impl<V, C> Clone for ModalStore<V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V: 'static, C: 'static> Default for ModalStore<V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: 'static, C: 'static> ModalStore<V, C> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StoreInner {
                registry: RefCell::new(IndexMap::new()),
                listeners: Listeners::new(),
                next_serial: Cell::new(0),
            }),
        }
    }

    // --- Mutations ---

    /// Add a modal on top of the registry and return its fresh key.
    pub fn open(&self, content: C, options: OpenOptions<V>) -> ModalKey {
        let key = {
            let registry = self.inner.registry.borrow();
            generate_key(|k| registry.contains_key(k))
        };
        self.insert_entry(key, content, options)
    }

    /// Insert under a key known to be absent.
    fn insert_entry(&self, key: ModalKey, content: C, options: OpenOptions<V>) -> ModalKey {
        let serial = self.inner.next_serial.get();
        self.inner.next_serial.set(serial + 1);
        let depth = {
            let mut registry = self.inner.registry.borrow_mut();
            let entry = ModalEntry {
                key: key.clone(),
                serial,
                variant: options.variant,
                content,
                settings: options.settings,
                props: options.props,
                resolver: options.resolver,
            };
            registry.insert(key.clone(), Rc::new(entry));
            registry.len()
        };
        tracing::trace!(key = %key, serial, depth, "modal opened");

        self.notify();
        key
    }

    /// Close without confirmation.
    ///
    /// Prompt entries settle as `{is_confirm: false, data: null}`.
    /// Returns whether an entry was removed.
    pub fn close(&self, key: &ModalKey) -> bool {
        self.dismiss(key, PromptResult::cancelled())
    }

    /// Remove an entry and settle its resolver (if any) with `result`.
    ///
    /// Listeners are notified even when the key was absent.
    pub fn dismiss(&self, key: &ModalKey, result: PromptResult) -> bool {
        self.dismiss_where(key, None, result)
    }

    /// Like [`dismiss`](Self::dismiss), but when `serial` is set only the
    /// entry inserted with that serial is removed.
    fn dismiss_where(&self, key: &ModalKey, serial: Option<u64>, result: PromptResult) -> bool {
        let removed = {
            let mut registry = self.inner.registry.borrow_mut();
            let matches = registry
                .get(key)
                .is_some_and(|e| serial.is_none_or(|s| e.serial == s));
            if matches {
                registry.shift_remove(key)
            } else {
                None
            }
        };
        match &removed {
            Some(_) => tracing::trace!(key = %key, depth = self.len(), "modal closed"),
            None => tracing::debug!(key = %key, "close on absent or replaced modal ignored"),
        }

        self.notify();

        let Some(entry) = removed else {
            return false;
        };
        settle(&entry, result);
        true
    }

    /// Shallow-merge new settings and props into a live entry.
    ///
    /// The entry keeps its key, position and resolver.
    pub fn update(&self, key: &ModalKey, patch: EntryPatch) -> bool
    where
        V: Clone,
        C: Clone,
    {
        {
            let mut registry = self.inner.registry.borrow_mut();
            let Some(slot) = registry.get_mut(key) else {
                return false;
            };
            let entry = Rc::make_mut(slot);
            entry.settings.extend_from(&patch.settings);
            entry.props.extend_from(&patch.props);
        }
        tracing::trace!(key = %key, "modal updated");

        self.notify();
        true
    }

    /// Dismiss every entry, top first, cancelling pending prompts.
    ///
    /// Notifies once. Returns the number of entries removed.
    pub fn close_all(&self) -> usize {
        let drained: Vec<Entry<V, C>> = {
            let mut registry = self.inner.registry.borrow_mut();
            registry.drain(..).map(|(_, e)| e).rev().collect()
        };
        if drained.is_empty() {
            return 0;
        }
        tracing::trace!(count = drained.len(), "closing all modals");

        self.notify();

        for entry in &drained {
            settle(entry, PromptResult::cancelled());
        }
        drained.len()
    }

    // --- Subscriptions ---

    /// Register a listener called with the full ordered snapshot after
    /// every mutation.
    ///
    /// No initial replay is sent; read [`registry`](Self::registry) for the
    /// current state.
    pub fn subscribe(&self, listener: impl Fn(&[Entry<V, C>]) + 'static) -> Subscription {
        let id = self.inner.listeners.add(Rc::new(listener));
        let weak: Weak<StoreInner<V, C>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.remove(id);
            }
        })
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn notify(&self) {
        let snapshot = self.registry();
        let listeners = self.inner.listeners.snapshot();
        tracing::trace!(
            depth = snapshot.len(),
            listeners = listeners.len(),
            "notifying modal listeners"
        );
        for (id, listener) in listeners {
            // Skip listeners removed earlier in this cycle.
            if self.inner.listeners.contains(id) {
                listener(snapshot.as_slice());
            }
        }
    }

    // --- Queries ---

    /// Ordered snapshot of the open entries, bottom to top.
    #[must_use]
    pub fn registry(&self) -> Vec<Entry<V, C>> {
        self.inner.registry.borrow().values().cloned().collect()
    }

    #[must_use]
    pub fn get(&self, key: &ModalKey) -> Option<Entry<V, C>> {
        self.inner.registry.borrow().get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &ModalKey) -> bool {
        self.inner.registry.borrow().contains_key(key)
    }

    /// Topmost entry, if any.
    #[must_use]
    pub fn top(&self) -> Option<Entry<V, C>> {
        self.inner.registry.borrow().last().map(|(_, e)| Rc::clone(e))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.registry.borrow().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.registry.borrow().is_empty()
    }

    // --- Bound capabilities ---

    /// The `close(is_confirm?, data?)` capability for the entry currently
    /// stored under `key`.
    ///
    /// The handle is bound to that entry, not to the key: once the entry is
    /// gone it stays inert, even if a new entry reuses the key. A handle
    /// taken for an absent key is inert from the start.
    #[must_use]
    pub fn close_handle(&self, key: &ModalKey) -> CloseHandle {
        let serial = self.inner.registry.borrow().get(key).map(|e| e.serial);
        self.handle_for(key, serial)
    }

    pub(crate) fn handle_for(&self, key: &ModalKey, serial: Option<u64>) -> CloseHandle {
        let dismiss: DismissFn = match serial {
            Some(serial) => {
                let weak: Weak<StoreInner<V, C>> = Rc::downgrade(&self.inner);
                Rc::new(move |key: &ModalKey, result: PromptResult| match weak.upgrade() {
                    Some(inner) => ModalStore { inner }.dismiss_where(key, Some(serial), result),
                    None => false,
                })
            }
            None => Rc::new(|_: &ModalKey, _: PromptResult| false),
        };
        CloseHandle::new(key.clone(), dismiss)
    }

    /// Zero-argument, idempotent closer for one entry.
    #[must_use]
    pub fn closer(&self, key: &ModalKey) -> Closer {
        Closer::new(self.close_handle(key))
    }
}

/// Fire a removed entry's resolver. The only settlement site.
fn settle<V, C>(entry: &ModalEntry<V, C>, result: PromptResult) {
    let Some(resolver) = &entry.resolver else {
        return;
    };
    let is_confirm = result.is_confirm;
    if resolver.resolve(result) {
        tracing::debug!(key = %entry.key, is_confirm, "prompt settled");
    }
}

impl<V, C> fmt::Debug for ModalStore<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalStore")
            .field("depth", &self.inner.registry.borrow().len())
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Variant {
        Default,
    }

    type Store = ModalStore<Variant, &'static str>;
    type Seen = Rc<RefCell<Vec<Vec<ModalKey>>>>;

    fn record(store: &Store) -> (Seen, Subscription) {
        let seen: Seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let sub = store.subscribe(move |entries| {
            s.borrow_mut()
                .push(entries.iter().map(|e| e.key().clone()).collect());
        });
        (seen, sub)
    }

    #[test]
    fn empty_store() {
        let store = Store::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.top().is_none());
        assert!(store.registry().is_empty());
    }

    #[test]
    fn open_defaults_to_empty_mappings() {
        let store = Store::new();
        let key = store.open("content", OpenOptions::new(Variant::Default));

        let entry = store.get(&key).unwrap();
        assert_eq!(entry.key(), &key);
        assert_eq!(*entry.variant(), Variant::Default);
        assert_eq!(*entry.content(), "content");
        assert!(entry.settings().is_empty());
        assert!(entry.props().is_empty());
        assert!(!entry.is_prompt());
    }

    #[test]
    fn open_preserves_order() {
        let store = Store::new();
        let keys: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|c| store.open(c, OpenOptions::new(Variant::Default)))
            .collect();

        let contents: Vec<_> = store.registry().iter().map(|e| *e.content()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
        assert_eq!(store.top().unwrap().key(), &keys[2]);
    }

    #[test]
    fn close_removes_exactly_one_and_keeps_order() {
        let store = Store::new();
        let a = store.open("a", OpenOptions::new(Variant::Default));
        let b = store.open("b", OpenOptions::new(Variant::Default));
        let c = store.open("c", OpenOptions::new(Variant::Default));

        assert!(store.close(&b));
        let keys: Vec<_> = store.registry().iter().map(|e| e.key().clone()).collect();
        assert_eq!(keys, vec![a, c]);

        assert!(!store.close(&b));
        assert!(!store.close(&ModalKey::from_raw("never")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn subscriber_sees_open_then_close() {
        let store = Store::new();
        let (seen, _sub) = record(&store);

        let key = store.open("content", OpenOptions::new(Variant::Default));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0], vec![key.clone()]);

        store.close(&key);
        assert_eq!(seen.borrow().len(), 2);
        assert!(seen.borrow()[1].is_empty());
    }

    #[test]
    fn subscribe_does_not_replay() {
        let store = Store::new();
        store.open("content", OpenOptions::new(Variant::Default));
        let (seen, _sub) = record(&store);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = Store::new();
        let (seen, sub) = record(&store);
        store.open("a", OpenOptions::new(Variant::Default));
        sub.unsubscribe();
        store.open("b", OpenOptions::new(Variant::Default));

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let store = Store::new();
        let (first, sub1) = record(&store);
        let (second, _sub2) = record(&store);

        drop(sub1);
        store.open("a", OpenOptions::new(Variant::Default));

        assert!(first.borrow().is_empty());
        assert_eq!(second.borrow().len(), 1);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let store = Store::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        let _s1 = store.subscribe(move |_| o1.borrow_mut().push(1));
        let _s2 = store.subscribe(move |_| o2.borrow_mut().push(2));

        store.open("a", OpenOptions::new(Variant::Default));
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn listener_may_mutate_store() {
        let store = Store::new();
        let inner = store.clone();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let _sub = store.subscribe(move |entries| {
            c.set(c.get() + 1);
            // Auto-dismiss anything that is opened.
            if let Some(entry) = entries.last() {
                inner.close(entry.key());
            }
        });

        store.open("a", OpenOptions::new(Variant::Default));
        assert!(store.is_empty());
        // Outer open cycle plus the nested close cycle.
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn close_settles_prompt_as_cancelled() {
        let store = Store::new();
        let got = Rc::new(RefCell::new(None));
        let g = Rc::clone(&got);
        let key = store.open(
            "content",
            OpenOptions::new(Variant::Default)
                .resolver(Resolver::new(move |r| *g.borrow_mut() = Some(r))),
        );
        let snapshot = store.get(&key).unwrap();
        assert!(snapshot.is_prompt());

        store.close(&key);
        assert_eq!(*got.borrow(), Some(PromptResult::cancelled()));
        // Provenance, not pending state.
        assert!(snapshot.is_prompt());
    }

    #[test]
    fn resolver_fires_after_listeners_see_removal() {
        let store = Store::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = Rc::clone(&log);
        let l2 = Rc::clone(&log);
        let _sub = store.subscribe(move |entries| {
            l1.borrow_mut().push(format!("notify {}", entries.len()));
        });
        let key = store.open(
            "content",
            OpenOptions::new(Variant::Default)
                .resolver(Resolver::new(move |_| l2.borrow_mut().push("resolve".into()))),
        );

        store.dismiss(&key, PromptResult::confirmed(1));
        assert_eq!(*log.borrow(), vec!["notify 1", "notify 0", "resolve"]);
    }

    #[test]
    fn double_dismiss_resolves_once() {
        let store = Store::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let key = store.open(
            "content",
            OpenOptions::new(Variant::Default)
                .resolver(Resolver::new(move |_| c.set(c.get() + 1))),
        );

        assert!(store.dismiss(&key, PromptResult::confirmed(1)));
        assert!(!store.dismiss(&key, PromptResult::confirmed(2)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn update_merges_and_keeps_position() {
        let store = Store::new();
        let a = store.open(
            "a",
            OpenOptions::new(Variant::Default)
                .settings(Mapping::new().with("placement", "bottom").with("size", 2)),
        );
        let _b = store.open("b", OpenOptions::new(Variant::Default));
        let (seen, _sub) = record(&store);

        assert!(store.update(
            &a,
            EntryPatch::new()
                .settings(Mapping::new().with("placement", "top"))
                .props(Mapping::new().with("name", "x")),
        ));

        let first = &store.registry()[0];
        assert_eq!(first.key(), &a);
        assert_eq!(first.settings().get_str("placement"), Some("top"));
        assert_eq!(first.settings().get("size"), Some(&serde_json::json!(2)));
        assert_eq!(first.props().get_str("name"), Some("x"));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn update_absent_key_is_silent() {
        let store = Store::new();
        let (seen, _sub) = record(&store);
        assert!(!store.update(&ModalKey::from_raw("nope"), EntryPatch::new()));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn close_all_cancels_prompts_and_notifies_once() {
        let store = Store::new();
        let cancelled = Rc::new(Cell::new(0));
        for content in ["a", "b"] {
            let c = Rc::clone(&cancelled);
            store.open(
                content,
                OpenOptions::new(Variant::Default).resolver(Resolver::new(move |r| {
                    assert!(!r.is_confirm);
                    c.set(c.get() + 1);
                })),
            );
        }
        store.open("plain", OpenOptions::new(Variant::Default));
        let (seen, _sub) = record(&store);

        assert_eq!(store.close_all(), 3);
        assert!(store.is_empty());
        assert_eq!(cancelled.get(), 2);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(store.close_all(), 0);
    }

    #[test]
    fn handles_are_idempotent_and_weak() {
        let store = Store::new();
        let key = store.open("a", OpenOptions::new(Variant::Default));
        let closer = store.closer(&key);

        assert!(closer.close());
        assert!(!closer.close());

        let key = store.open("b", OpenOptions::new(Variant::Default));
        let handle = store.close_handle(&key);
        drop(store);
        assert!(!handle.close());
    }

    #[test]
    fn stale_handle_ignores_reused_key() {
        let store = Store::new();
        let key = ModalKey::from_raw("dup");
        store.insert_entry(key.clone(), "old", OpenOptions::new(Variant::Default));
        let stale = store.closer(&key);
        assert!(stale.close());

        let got = Rc::new(RefCell::new(None));
        let g = Rc::clone(&got);
        store.insert_entry(
            key.clone(),
            "new",
            OpenOptions::new(Variant::Default)
                .resolver(Resolver::new(move |r| *g.borrow_mut() = Some(r))),
        );

        assert!(!stale.close());
        assert_eq!(*store.get(&key).unwrap().content(), "new");
        assert!(got.borrow().is_none());

        // A handle for the live entry still works.
        assert!(store.close_handle(&key).confirm(5));
        assert_eq!(*got.borrow(), Some(PromptResult::confirmed(5)));
    }

    #[test]
    fn handle_survives_update() {
        let store = Store::new();
        let key = store.open("a", OpenOptions::new(Variant::Default));
        let closer = store.closer(&key);
        assert!(store.update(&key, EntryPatch::new().props(Mapping::new().with("n", 1))));
        assert!(closer.close());
        assert!(store.is_empty());
    }

    #[test]
    fn handle_for_absent_key_is_inert() {
        let store = Store::new();
        let (seen, _sub) = record(&store);
        assert!(!store.close_handle(&ModalKey::from_raw("none")).close());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn unsubscribe_during_notify_skips_later_listener() {
        let store = Store::new();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let v = Rc::clone(&victim);
        let _first = store.subscribe(move |_| {
            drop(v.borrow_mut().take());
        });
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        *victim.borrow_mut() = Some(store.subscribe(move |_| h.set(h.get() + 1)));

        store.open("a", OpenOptions::new(Variant::Default));
        assert_eq!(hits.get(), 0);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn subscribe_during_notify_starts_next_cycle() {
        let store = Store::new();
        let late: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(Cell::new(0));
        let (l, h, inner) = (Rc::clone(&late), Rc::clone(&hits), store.clone());
        let _first = store.subscribe(move |_| {
            if l.borrow().is_none() {
                let h = Rc::clone(&h);
                *l.borrow_mut() = Some(inner.subscribe(move |_| h.set(h.get() + 1)));
            }
        });

        store.open("a", OpenOptions::new(Variant::Default));
        assert_eq!(hits.get(), 0);
        store.open("b", OpenOptions::new(Variant::Default));
        assert_eq!(hits.get(), 1);
    }

    proptest! {
        #[test]
        fn open_count_matches_registry(n in 0usize..40) {
            let store = Store::new();
            let keys: Vec<_> = (0..n)
                .map(|_| store.open("c", OpenOptions::new(Variant::Default)))
                .collect();
            let registry: Vec<_> = store.registry().iter().map(|e| e.key().clone()).collect();
            prop_assert_eq!(registry, keys);
        }

        #[test]
        fn close_removes_exactly_one(n in 1usize..30, pick in any::<prop::sample::Index>()) {
            let store = Store::new();
            let keys: Vec<_> = (0..n)
                .map(|_| store.open("c", OpenOptions::new(Variant::Default)))
                .collect();
            let target = &keys[pick.index(n)];

            prop_assert!(store.close(target));
            prop_assert_eq!(store.len(), n - 1);
            prop_assert!(!store.contains(target));

            let expected: Vec<_> = keys.iter().filter(|k| *k != target).cloned().collect();
            let actual: Vec<_> = store.registry().iter().map(|e| e.key().clone()).collect();
            prop_assert_eq!(actual, expected);

            prop_assert!(!store.close(target));
            prop_assert_eq!(store.len(), n - 1);
        }
    }
}
