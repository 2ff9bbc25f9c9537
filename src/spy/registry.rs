//! The scroll spy registry
//!
//! One [`ScrollSpy`] is shared (by cloning) between every component that
//! wants scroll positions. It owns:
//!
//! - the registrations created by `mount`, each with its attached listener
//!   and optional throttle
//! - one entry per mounted container holding its ordered position
//!   callbacks, shared by every registration of that container
//! - an index from position callback to the entries holding it, so
//!   `unmount` does not need the owning container
//! - the global ordered list of state callbacks
//!
//! A container mounted more than once is dispatched by the listener of its
//! earliest live registration only. Its callbacks survive until the last
//! registration of the container is disposed.
//!
//! No `RefCell` borrow is held while a callback or host capability runs, so
//! callbacks may freely re-enter the registry. Dispatch walks a snapshot of
//! the subscription list and skips any subscription removed before its turn.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, trace};

use super::callbacks::{CallbackKey, SpyCallback, StateCallback};
use super::disposer::Disposer;
use crate::error::ScrollSpyError;
use crate::host::{Container, SCROLL_EVENT, ScrollHandler, ScrollHost, ScrollPosition};
use crate::position::{self, DocumentOffset};
use crate::throttle::ThrottledHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct MountId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct EntryId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubscriptionId(u64);

struct Subscription<C> {
    id: SubscriptionId,
    callback: C,
}

struct Registration<H: ScrollHost> {
    id: MountId,
    container: Container<H::Element>,
    listener: Option<H::Listener>,
    throttle: Option<ThrottledHandler>,
}

/// Position callbacks of one mounted container
struct ContainerEntry<H: ScrollHost> {
    id: EntryId,
    container: Container<H::Element>,
    spy_handlers: Vec<Subscription<SpyCallback>>,
}

struct RegistryState<H: ScrollHost> {
    next_id: u64,
    /// In mount order; the same container may appear more than once
    registrations: Vec<Registration<H>>,
    /// At most one per container, in first-mount order
    entries: Vec<ContainerEntry<H>>,
    /// One entry per subscription, so duplicates are counted
    spy_index: HashMap<CallbackKey, Vec<EntryId>>,
    state_handlers: Vec<Subscription<StateCallback>>,
}

impl<H: ScrollHost> RegistryState<H> {
    fn new() -> Self {
        Self {
            next_id: 0,
            registrations: Vec::new(),
            entries: Vec::new(),
            spy_index: HashMap::new(),
            state_handlers: Vec::new(),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn registration(&self, id: MountId) -> Option<&Registration<H>> {
        self.registrations.iter().find(|r| r.id == id)
    }

    fn registration_mut(&mut self, id: MountId) -> Option<&mut Registration<H>> {
        self.registrations.iter_mut().find(|r| r.id == id)
    }

    /// Earliest live registration for `container`; the one that dispatches
    fn first_for(&self, container: &Container<H::Element>) -> Option<&Registration<H>> {
        self.registrations.iter().find(|r| r.container == *container)
    }

    fn is_primary(&self, mount: MountId, container: &Container<H::Element>) -> bool {
        self.first_for(container).is_some_and(|r| r.id == mount)
    }

    fn entry(&self, container: &Container<H::Element>) -> Option<&ContainerEntry<H>> {
        self.entries.iter().find(|e| e.container == *container)
    }

    fn entry_mut_by_id(&mut self, id: EntryId) -> Option<&mut ContainerEntry<H>> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    fn ensure_entry(&mut self, container: &Container<H::Element>) {
        if self.entry(container).is_none() {
            let id = EntryId(self.next_id());
            self.entries.push(ContainerEntry {
                id,
                container: container.clone(),
                spy_handlers: Vec::new(),
            });
        }
    }

    fn spy_active(&self, entry: EntryId, sub: SubscriptionId) -> bool {
        self.entries
            .iter()
            .find(|e| e.id == entry)
            .is_some_and(|e| e.spy_handlers.iter().any(|s| s.id == sub))
    }

    fn state_active(&self, sub: SubscriptionId) -> bool {
        self.state_handlers.iter().any(|s| s.id == sub)
    }

    fn unindex(&mut self, key: CallbackKey, entry: EntryId) {
        if let Some(entries) = self.spy_index.get_mut(&key) {
            if let Some(pos) = entries.iter().position(|e| *e == entry) {
                entries.remove(pos);
            }
            if entries.is_empty() {
                self.spy_index.remove(&key);
            }
        }
    }

    fn remove_registration(&mut self, id: MountId) -> Option<Registration<H>> {
        let pos = self.registrations.iter().position(|r| r.id == id)?;
        Some(self.registrations.remove(pos))
    }

    /// Drops the container's entry once no registration refers to it
    fn release_entry(&mut self, container: &Container<H::Element>) -> Option<ContainerEntry<H>> {
        if self.first_for(container).is_some() {
            return None;
        }
        let pos = self.entries.iter().position(|e| e.container == *container)?;
        let entry = self.entries.remove(pos);
        for sub in &entry.spy_handlers {
            self.unindex(sub.callback.key(), entry.id);
        }
        Some(entry)
    }
}

struct Shared<H: ScrollHost> {
    host: H,
    document_offset: Cell<DocumentOffset>,
    state: RefCell<RegistryState<H>>,
}

impl<H: ScrollHost> Shared<H> {
    fn current_offset(&self, container: &Container<H::Element>) -> ScrollPosition {
        position::current_offset(&self.host, self.document_offset.get(), container)
    }

    /// Listener body of one registration
    fn dispatch_mount(&self, mount: MountId) {
        let container = {
            let state = self.state.borrow();
            let Some(registration) = state.registration(mount) else {
                trace!("dispatch for disposed mount {:?} ignored", mount);
                return;
            };
            if !state.is_primary(mount, &registration.container) {
                trace!("{:?} shadowed by an earlier mount", mount);
                return;
            }
            registration.container.clone()
        };
        self.dispatch_container(&container);
    }

    fn dispatch_container(&self, container: &Container<H::Element>) {
        let (entry, snapshot) = {
            let state = self.state.borrow();
            let Some(entry) = state.entry(container) else {
                return;
            };
            let snapshot: Vec<(SubscriptionId, SpyCallback)> = entry
                .spy_handlers
                .iter()
                .map(|s| (s.id, s.callback.clone()))
                .collect();
            (entry.id, snapshot)
        };

        trace!(
            "dispatching scroll on {:?} to {} callback(s)",
            container,
            snapshot.len()
        );

        for (sub, callback) in snapshot {
            let active = self.state.borrow().spy_active(entry, sub);
            if !active {
                continue;
            }
            let position = self.current_offset(container);
            callback.call(position.x, position.y);
        }
    }

    fn dispose(&self, mount: MountId) {
        let (mut registration, released) = {
            let mut state = self.state.borrow_mut();
            let Some(registration) = state.remove_registration(mount) else {
                trace!("mount {:?} already disposed", mount);
                return;
            };
            let released = state.release_entry(&registration.container);
            (registration, released)
        };

        if let Some(throttle) = &registration.throttle {
            throttle.cancel();
        }
        if let Some(listener) = registration.listener.take() {
            self.host
                .remove_passive_listener(&registration.container, SCROLL_EVENT, listener);
        }
        match released {
            Some(entry) => debug!(
                "unmounted {:?} ({} spy handler(s) dropped)",
                registration.container,
                entry.spy_handlers.len()
            ),
            None => debug!(
                "disposed {:?}, {:?} still mounted",
                mount, registration.container
            ),
        }
    }
}

impl<H: ScrollHost> Drop for Shared<H> {
    fn drop(&mut self) {
        let registrations = std::mem::take(&mut self.state.get_mut().registrations);
        for mut registration in registrations {
            if let Some(listener) = registration.listener.take() {
                self.host
                    .remove_passive_listener(&registration.container, SCROLL_EVENT, listener);
            }
        }
    }
}

/// Shared scroll observation registry
///
/// Cloning yields another handle to the same registry. The last handle to
/// go away detaches every listener still attached.
pub struct ScrollSpy<H: ScrollHost> {
    shared: Rc<Shared<H>>,
}

impl<H: ScrollHost> Clone for ScrollSpy<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<H: ScrollHost> fmt::Debug for ScrollSpy<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("ScrollSpy")
            .field("registrations", &state.registrations.len())
            .field("containers", &state.entries.len())
            .field("state_handlers", &state.state_handlers.len())
            .field("document_offset", &self.shared.document_offset.get())
            .finish()
    }
}

impl<H: ScrollHost + 'static> ScrollSpy<H> {
    /// Empty registry over `host`. The document offset strategy is detected here.
    pub fn new(host: H) -> Self {
        let document_offset = DocumentOffset::detect(&host);
        debug!("scroll spy created, document offset via {:?}", document_offset);
        Self {
            shared: Rc::new(Shared {
                host,
                document_offset: Cell::new(document_offset),
                state: RefCell::new(RegistryState::new()),
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.shared.host
    }

    /// Re-detects the document offset strategy (after the host changed mode)
    pub fn refresh_document_offset(&self) {
        let detected = DocumentOffset::detect(&self.shared.host);
        self.shared.document_offset.set(detected);
    }

    pub fn document_offset(&self) -> DocumentOffset {
        self.shared.document_offset.get()
    }

    /// Starts observing `container`
    ///
    /// With `throttle`, dispatch is rate limited to once per interval and
    /// swallowed events collapse into a trailing dispatch run by
    /// [`tick`](Self::tick). A `None` container registers nothing and yields
    /// a no-op disposer. Mounting a container twice creates two independent
    /// registrations over one shared callback list; only the earliest live
    /// one dispatches.
    pub fn mount(
        &self,
        container: Option<Container<H::Element>>,
        throttle: Option<Duration>,
    ) -> Disposer {
        let Some(container) = container else {
            debug!("mount without a container, nothing registered");
            return Disposer::noop();
        };

        let mount = MountId(self.shared.state.borrow_mut().next_id());
        let weak = Rc::downgrade(&self.shared);

        let dispatch: ScrollHandler = {
            let weak = weak.clone();
            Rc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.dispatch_mount(mount);
                }
            })
        };

        let throttled = throttle.map(|interval| {
            let weak = weak.clone();
            crate::throttle::throttle(dispatch.clone(), interval, move || {
                weak.upgrade()
                    .map(|shared| shared.host.now())
                    .unwrap_or_default()
            })
        });
        let handler = match &throttled {
            Some(throttled) => throttled.handler(),
            None => dispatch,
        };

        {
            let mut state = self.shared.state.borrow_mut();
            state.ensure_entry(&container);
            state.registrations.push(Registration {
                id: mount,
                container: container.clone(),
                listener: None,
                throttle: throttled,
            });
        }

        let listener = self
            .shared
            .host
            .add_passive_listener(&container, SCROLL_EVENT, handler);

        let stored = {
            let mut state = self.shared.state.borrow_mut();
            match state.registration_mut(mount) {
                Some(registration) => {
                    registration.listener = Some(listener);
                    None
                }
                None => Some(listener),
            }
        };
        if let Some(orphan) = stored {
            self.shared
                .host
                .remove_passive_listener(&container, SCROLL_EVENT, orphan);
        }

        debug!(
            "mounted {:?} as {:?} (throttle: {:?})",
            container, mount, throttle
        );

        Disposer::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.dispose(mount);
            }
        })
    }

    pub fn is_mounted(&self, container: &Container<H::Element>) -> bool {
        self.shared.state.borrow().first_for(container).is_some()
    }

    /// Subscribes `callback` to scroll positions of a mounted `container`
    ///
    /// The same callback may be added more than once and then fires once per
    /// subscription.
    pub fn add_spy_handler(
        &self,
        callback: &SpyCallback,
        container: &Container<H::Element>,
    ) -> Result<(), ScrollSpyError> {
        let mut guard = self.shared.state.borrow_mut();
        let state = &mut *guard;
        let sub = SubscriptionId(state.next_id());

        let Some(entry) = state
            .entries
            .iter_mut()
            .find(|e| e.container == *container)
        else {
            return Err(ScrollSpyError::NotMounted(container.to_string()));
        };

        entry.spy_handlers.push(Subscription {
            id: sub,
            callback: callback.clone(),
        });
        let entry = entry.id;
        state
            .spy_index
            .entry(callback.key())
            .or_default()
            .push(entry);

        trace!("spy handler {:?} added to {:?}", callback, container);
        Ok(())
    }

    pub fn add_state_handler(&self, callback: &StateCallback) {
        let mut state = self.shared.state.borrow_mut();
        let sub = SubscriptionId(state.next_id());
        state.state_handlers.push(Subscription {
            id: sub,
            callback: callback.clone(),
        });
    }

    /// Removes subscriptions by identity
    ///
    /// `spy` loses one subscription in every container holding it, and
    /// `state` loses one subscription from the global list. Callbacks that
    /// are not subscribed are ignored. Listeners stay attached; they belong
    /// to the mount's [`Disposer`].
    pub fn unmount(&self, state: Option<&StateCallback>, spy: Option<&SpyCallback>) {
        // Held until the borrow is released so user closures drop outside it.
        let mut removed_spies: Vec<Subscription<SpyCallback>> = Vec::new();
        let mut removed_state: Option<Subscription<StateCallback>> = None;

        {
            let mut guard = self.shared.state.borrow_mut();
            let registry = &mut *guard;

            if let Some(spy) = spy {
                let key = spy.key();
                if let Some(mut entries) = registry.spy_index.remove(&key) {
                    let mut targets = entries.clone();
                    targets.sort_unstable();
                    targets.dedup();

                    for target in targets {
                        if let Some(pos) = entries.iter().position(|e| *e == target) {
                            entries.remove(pos);
                        }
                        if let Some(entry) = registry.entry_mut_by_id(target) {
                            if let Some(pos) = entry
                                .spy_handlers
                                .iter()
                                .position(|s| s.callback == *spy)
                            {
                                removed_spies.push(entry.spy_handlers.remove(pos));
                            }
                        }
                    }

                    if !entries.is_empty() {
                        registry.spy_index.insert(key, entries);
                    }
                }
            }

            if let Some(state_cb) = state {
                if let Some(pos) = registry
                    .state_handlers
                    .iter()
                    .position(|s| s.callback == *state_cb)
                {
                    removed_state = Some(registry.state_handlers.remove(pos));
                }
            }
        }

        trace!(
            "unmount removed {} spy subscription(s), state removed: {}",
            removed_spies.len(),
            removed_state.is_some()
        );
    }

    /// Dispatches the current offset of `container` to its callbacks
    ///
    /// An unmounted container or an empty callback list is a no-op.
    pub fn dispatch_scroll(&self, container: &Container<H::Element>) {
        self.shared.dispatch_container(container);
    }

    /// Invokes every state callback once, in subscription order
    pub fn update_states(&self) {
        let snapshot: Vec<(SubscriptionId, StateCallback)> = self
            .shared
            .state
            .borrow()
            .state_handlers
            .iter()
            .map(|s| (s.id, s.callback.clone()))
            .collect();

        for (sub, callback) in snapshot {
            let active = self.shared.state.borrow().state_active(sub);
            if active {
                callback.call();
            }
        }
    }

    /// Synchronously dispatches every mounted container once
    pub fn update(&self) {
        let containers: Vec<Container<H::Element>> = self
            .shared
            .state
            .borrow()
            .entries
            .iter()
            .map(|e| e.container.clone())
            .collect();
        for container in containers {
            self.shared.dispatch_container(&container);
        }
    }

    /// Runs trailing dispatches of throttled containers that are due
    ///
    /// Hosts call this from their frame or event loop. Returns the number of
    /// dispatches run.
    pub fn tick(&self) -> usize {
        let throttled: Vec<ThrottledHandler> = {
            let state = self.shared.state.borrow();
            state
                .registrations
                .iter()
                .filter(|r| state.is_primary(r.id, &r.container))
                .filter_map(|r| r.throttle.clone())
                .collect()
        };
        throttled.iter().filter(|t| t.flush()).count()
    }

    pub fn current_offset(&self, container: &Container<H::Element>) -> ScrollPosition {
        self.shared.current_offset(container)
    }

    pub fn current_offset_x(&self, container: &Container<H::Element>) -> f64 {
        self.current_offset(container).x
    }

    pub fn current_offset_y(&self, container: &Container<H::Element>) -> f64 {
        self.current_offset(container).y
    }

    /// Detaches every listener and forgets all registrations and callbacks
    pub fn teardown(&self) {
        let (registrations, entries, state_handlers) = {
            let mut state = self.shared.state.borrow_mut();
            state.spy_index.clear();
            (
                std::mem::take(&mut state.registrations),
                std::mem::take(&mut state.entries),
                std::mem::take(&mut state.state_handlers),
            )
        };

        for mut registration in registrations {
            if let Some(throttle) = &registration.throttle {
                throttle.cancel();
            }
            if let Some(listener) = registration.listener.take() {
                self.shared.host.remove_passive_listener(
                    &registration.container,
                    SCROLL_EVENT,
                    listener,
                );
            }
        }
        debug!(
            "scroll spy torn down ({} container(s), {} state handler(s) dropped)",
            entries.len(),
            state_handlers.len()
        );
    }

    pub fn registration_count(&self) -> usize {
        self.shared.state.borrow().registrations.len()
    }

    /// Spy subscriptions on `container`, shared by all of its registrations
    pub fn spy_handler_count(&self, container: &Container<H::Element>) -> usize {
        self.shared
            .state
            .borrow()
            .entry(container)
            .map_or(0, |e| e.spy_handlers.len())
    }

    pub fn state_handler_count(&self) -> usize {
        self.shared.state.borrow().state_handlers.len()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
