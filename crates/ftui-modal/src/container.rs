#![forbid(unsafe_code)]

//! Container-facing contract: the read side a renderer binds to.
//!
//! A [`ModalContainer`] subscribes to a store on mount, keeps the latest
//! ordered snapshot, and hands out one [`ModalView`] per open entry. Each
//! view carries a [`CloseHandle`] that closes the entry and, for prompts,
//! settles the pending future.
//!
//! Drawing is left to the host: implement [`RenderVariant`] and
//! [`RenderContent`] for the component handle types and call
//! [`ModalContainer::render`], or walk [`ModalContainer::views`] directly.
//!
//! # Invariants
//!
//! 1. After `mount()`, the visible list equals the store registry, including
//!    entries opened before mounting.
//! 2. `version()` increases by one per notification received while mounted.
//! 3. After `unmount()` no further notifications reach the container.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::handle::CloseHandle;
use crate::key::ModalKey;
use crate::mapping::Mapping;
use crate::store::{ModalEntry, ModalStore};
use crate::subscription::Subscription;

/// Presentation wrapper drawn around a modal's content.
pub trait RenderVariant<Out> {
    /// Wrap `children` (the rendered content) for display.
    fn render_variant(&self, close: &CloseHandle, settings: &Mapping, children: Out) -> Out;
}

/// Modal body supplied by the caller.
pub trait RenderContent<Out> {
    fn render_content(&self, close: &CloseHandle, props: &Mapping) -> Out;
}

/// Everything a renderer needs for one open entry.
pub struct ModalView<V, C> {
    entry: Rc<ModalEntry<V, C>>,
    close: CloseHandle,
}

impl<V, C> ModalView<V, C> {
    /// Stable render identity.
    #[must_use]
    pub fn key(&self) -> &ModalKey {
        self.entry.key()
    }

    #[must_use]
    pub fn variant(&self) -> &V {
        self.entry.variant()
    }

    #[must_use]
    pub fn content(&self) -> &C {
        self.entry.content()
    }

    #[must_use]
    pub fn settings(&self) -> &Mapping {
        self.entry.settings()
    }

    #[must_use]
    pub fn props(&self) -> &Mapping {
        self.entry.props()
    }

    /// Close capability for the variant and content layers.
    #[must_use]
    pub fn close(&self) -> &CloseHandle {
        &self.close
    }

    #[must_use]
    pub fn is_prompt(&self) -> bool {
        self.entry.is_prompt()
    }
}

impl<V: fmt::Debug, C: fmt::Debug> fmt::Debug for ModalView<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalView")
            .field("entry", &self.entry)
            .finish()
    }
}

type Visible<V, C> = Rc<RefCell<Vec<Rc<ModalEntry<V, C>>>>>;

/// Subscribed, render-ready view of a store.
pub struct ModalContainer<V, C> {
    store: ModalStore<V, C>,
    visible: Visible<V, C>,
    version: Rc<Cell<u64>>,
    redraw: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
    subscription: Option<Subscription>,
}

impl<V: 'static, C: 'static> ModalContainer<V, C> {
    /// Create an unmounted container for `store`.
    #[must_use]
    pub fn new(store: ModalStore<V, C>) -> Self {
        Self {
            store,
            visible: Rc::new(RefCell::new(Vec::new())),
            version: Rc::new(Cell::new(0)),
            redraw: Rc::new(RefCell::new(None)),
            subscription: None,
        }
    }

    /// Register the host's re-render hook, called after each change.
    pub fn on_change(&mut self, redraw: impl Fn() + 'static) {
        *self.redraw.borrow_mut() = Some(Rc::new(redraw));
    }

    /// Subscribe to the store and load its current contents.
    ///
    /// Mounting twice is a no-op.
    pub fn mount(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let visible = Rc::clone(&self.visible);
        let version = Rc::clone(&self.version);
        let redraw = Rc::clone(&self.redraw);
        self.subscription = Some(self.store.subscribe(move |entries| {
            *visible.borrow_mut() = entries.to_vec();
            version.set(version.get() + 1);
            let hook = redraw.borrow().clone();
            if let Some(hook) = hook {
                hook();
            }
        }));
        *self.visible.borrow_mut() = self.store.registry();
        tracing::trace!(depth = self.visible.borrow().len(), "modal container mounted");
    }

    /// Drop the store subscription. The last snapshot is cleared.
    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            self.visible.borrow_mut().clear();
            tracing::trace!("modal container unmounted");
        }
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of notifications received while mounted.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible.borrow().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visible.borrow().len()
    }

    /// Current entries in render order, each with its bound close handle.
    #[must_use]
    pub fn views(&self) -> Vec<ModalView<V, C>> {
        self.visible
            .borrow()
            .iter()
            .map(|entry| ModalView {
                close: self.store.handle_for(entry.key(), Some(entry.serial())),
                entry: Rc::clone(entry),
            })
            .collect()
    }

    /// Render every entry as `variant(content)`, bottom to top.
    pub fn render<Out>(&self) -> Vec<Out>
    where
        V: RenderVariant<Out>,
        C: RenderContent<Out>,
    {
        self.views()
            .iter()
            .map(|view| {
                let body = view.content().render_content(view.close(), view.props());
                view.variant()
                    .render_variant(view.close(), view.settings(), body)
            })
            .collect()
    }
}

impl<V, C> fmt::Debug for ModalContainer<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalContainer")
            .field("mounted", &self.subscription.is_some())
            .field("visible", &self.visible.borrow().len())
            .field("version", &self.version.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{PromptResult, Resolver};
    use crate::store::OpenOptions;

    type Store = ModalStore<&'static str, &'static str>;

    #[test]
    fn unmounted_container_sees_nothing() {
        let store = Store::new();
        let container = ModalContainer::new(store.clone());
        store.open("a", OpenOptions::new("default"));

        assert!(!container.is_mounted());
        assert!(container.is_empty());
        assert_eq!(container.version(), 0);
    }

    #[test]
    fn mount_loads_existing_entries() {
        let store = Store::new();
        store.open("a", OpenOptions::new("default"));
        let mut container = ModalContainer::new(store.clone());
        container.mount();

        assert_eq!(container.len(), 1);
        assert_eq!(*container.views()[0].content(), "a");
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn tracks_changes_and_counts_versions() {
        let store = Store::new();
        let mut container = ModalContainer::new(store.clone());
        container.mount();
        container.mount();
        assert_eq!(store.listener_count(), 1);

        let key = store.open("a", OpenOptions::new("default"));
        assert_eq!(container.len(), 1);
        store.close(&key);
        assert!(container.is_empty());
        assert_eq!(container.version(), 2);
    }

    #[test]
    fn unmount_stops_tracking() {
        let store = Store::new();
        let mut container = ModalContainer::new(store.clone());
        container.mount();
        container.unmount();

        store.open("a", OpenOptions::new("default"));
        assert!(container.is_empty());
        assert_eq!(container.version(), 0);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn redraw_hook_fires_per_change() {
        let store = Store::new();
        let mut container = ModalContainer::new(store.clone());
        let redraws = Rc::new(Cell::new(0));
        let r = Rc::clone(&redraws);
        container.on_change(move || r.set(r.get() + 1));
        container.mount();

        let key = store.open("a", OpenOptions::new("default"));
        store.close(&key);
        assert_eq!(redraws.get(), 2);
    }

    #[test]
    fn view_close_settles_prompt() {
        let store = Store::new();
        let got = Rc::new(RefCell::new(None));
        let g = Rc::clone(&got);
        store.open(
            "payment",
            OpenOptions::new("default").resolver(Resolver::new(move |r| *g.borrow_mut() = Some(r))),
        );
        let mut container = ModalContainer::new(store.clone());
        container.mount();

        let views = container.views();
        assert!(views[0].is_prompt());
        assert!(views[0].close().confirm(4000));

        assert!(container.is_empty());
        assert_eq!(*got.borrow(), Some(PromptResult::confirmed(4000)));
    }

    #[test]
    fn unmount_from_earlier_listener_takes_effect_immediately() {
        let store = Store::new();
        let container = Rc::new(RefCell::new(ModalContainer::new(store.clone())));
        let host = Rc::clone(&container);
        let _host_sub = store.subscribe(move |_| host.borrow_mut().unmount());
        container.borrow_mut().mount();

        store.open("a", OpenOptions::new("default"));

        let container = container.borrow();
        assert!(!container.is_mounted());
        assert_eq!(container.len(), 0);
        assert_eq!(container.version(), 0);
        assert_eq!(store.listener_count(), 1);
    }
}
