//! The scheme resolution engine.
//!
//! [`SchemeEngine`] owns the combined `(ambient, user)` state and exposes it
//! as three streams:
//!
//! - ambient: the host's light/dark signal, deduplicated;
//! - user: the explicit choice including [`Scheme::System`], deduplicated;
//! - resolved: the visible scheme, emitted only on transitions the UI should
//!   render.
//!
//! All processing happens on the calling thread. A mutation issued from a
//! subscriber callback is queued and handled once the current event has been
//! delivered, so events are always reconciled in arrival order.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::ambient::{query_appearance, AmbientObserver, AmbientSource};
use crate::broadcast::{Broadcast, Subscription};
use crate::config::SchemeConfig;
use crate::error::SchemeResult;
use crate::scheme::{Appearance, Scheme};
use crate::state::SchemeStateMachine;
use crate::storage::{KeyValueStore, PreferenceStore};
use crate::ui::ClassList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemeEvent {
    Ambient(Appearance),
    User(Scheme),
}

struct EngineInner {
    config: SchemeConfig,
    source: Rc<dyn AmbientSource>,
    store: PreferenceStore,
    class_list: Box<dyn ClassList>,
    machine: RefCell<SchemeStateMachine>,
    /// Latest user scheme handed to `set_user_scheme`, ahead of any queued
    /// reconciliation.
    requested: Cell<Scheme>,
    ambient: Broadcast<Appearance>,
    user: Broadcast<Scheme>,
    resolved: Broadcast<Appearance>,
    pending: RefCell<VecDeque<SchemeEvent>>,
    dispatching: Cell<bool>,
}

struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl EngineInner {
    fn dispatch(&self, event: SchemeEvent) {
        self.pending.borrow_mut().push_back(event);
        if self.dispatching.replace(true) {
            return;
        }
        let _guard = DispatchGuard(&self.dispatching);

        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.process(event);
        }
    }

    fn process(&self, event: SchemeEvent) {
        let resolved = match event {
            SchemeEvent::Ambient(appearance) => {
                let resolved = self.machine.borrow_mut().set_ambient(appearance);
                self.ambient.publish(appearance);
                resolved
            }
            SchemeEvent::User(scheme) => {
                let resolved = self.machine.borrow_mut().set_user(scheme);
                self.user.publish(scheme);
                resolved
            }
        };

        if let Some(scheme) = resolved {
            tracing::info!(%scheme, ?event, "resolved color scheme changed");
            self.resolved.publish(scheme);
        }
    }
}

pub struct SchemeEngine {
    inner: Rc<EngineInner>,
    observer: RefCell<Option<AmbientObserver>>,
}

impl SchemeEngine {
    /// Queries the ambient source, loads the stored preference and starts
    /// observing ambient changes.
    ///
    /// Fails with `PlatformUnsupported` when the ambient source cannot be
    /// queried.
    pub fn new(
        config: SchemeConfig,
        source: Rc<dyn AmbientSource>,
        medium: Box<dyn KeyValueStore>,
        class_list: Box<dyn ClassList>,
    ) -> SchemeResult<Self> {
        let ambient = query_appearance(source.as_ref())?;
        let store = PreferenceStore::new(medium, &config);
        let user = store.load();

        let inner = Rc::new(EngineInner {
            config,
            source: Rc::clone(&source),
            store,
            class_list,
            machine: RefCell::new(SchemeStateMachine::new(ambient, user)),
            requested: Cell::new(user),
            ambient: Broadcast::stateful(ambient),
            user: Broadcast::stateful(user),
            resolved: Broadcast::plain(),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        });

        let observer = {
            let inner = Rc::downgrade(&inner);
            AmbientObserver::activate(source, move |appearance| {
                if let Some(inner) = inner.upgrade() {
                    inner.dispatch(SchemeEvent::Ambient(appearance));
                }
            })?
        };

        tracing::info!(%ambient, %user, "scheme engine started");
        Ok(Self {
            inner,
            observer: RefCell::new(Some(observer)),
        })
    }

    pub fn config(&self) -> &SchemeConfig {
        &self.inner.config
    }

    pub fn on_ambient_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Appearance) + 'static,
    {
        self.inner.ambient.subscribe(callback)
    }

    pub fn on_user_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Scheme) + 'static,
    {
        self.inner.user.subscribe(callback)
    }

    /// Only transitions are delivered; use [`SchemeEngine::resolved`] for the
    /// value in effect when subscribing.
    pub fn on_resolved_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Appearance) + 'static,
    {
        self.inner.resolved.subscribe(callback)
    }

    /// The stored override if any, otherwise the live ambient value.
    pub fn current(&self) -> Appearance {
        self.inner
            .store
            .load()
            .appearance()
            .unwrap_or_else(|| self.ambient_preference())
    }

    /// Live host value, or the last observed one if the host query fails.
    pub fn ambient_preference(&self) -> Appearance {
        query_appearance(self.inner.source.as_ref()).unwrap_or_else(|err| {
            let last = self.inner.machine.borrow().pair().ambient;
            tracing::warn!(?err, %last, "ambient query failed; using last observed value");
            last
        })
    }

    /// The most recently requested user scheme, including one still queued
    /// behind the event being delivered.
    pub fn user_scheme(&self) -> Scheme {
        self.inner.requested.get()
    }

    pub fn resolved(&self) -> Appearance {
        self.inner.machine.borrow().resolved()
    }

    /// Swaps the scheme class on the class list, persists the choice and
    /// notifies subscribers.
    pub fn set_user_scheme(&self, scheme: Scheme) {
        let classes = self.inner.config.classes();
        let target = classes.class_for(scheme);

        self.inner.class_list.remove(&classes.classes());
        if let Some(class) = target {
            self.inner.class_list.add(class);
        }
        self.inner.store.store_identifier(target);
        self.inner.requested.set(scheme);

        tracing::debug!(%scheme, class = ?target, "user scheme set");
        self.inner.dispatch(SchemeEvent::User(scheme));
    }

    pub fn set_light_scheme(&self) {
        self.set_user_scheme(Scheme::Light);
    }

    pub fn set_dark_scheme(&self) {
        self.set_user_scheme(Scheme::Dark);
    }

    pub fn set_system_scheme(&self) {
        self.set_user_scheme(Scheme::System);
    }

    /// Advances the user scheme along `Light -> Dark -> System`.
    pub fn set_next_scheme(&self) -> Scheme {
        let next = self.user_scheme().next();
        self.set_user_scheme(next);
        next
    }

    /// Applies the stored class at startup without persisting or notifying.
    /// Does nothing if no valid class is stored or it is already applied.
    pub fn apply_stored_scheme_on_init(&self) {
        let Some(class) = self.inner.store.stored_identifier() else {
            return;
        };
        if self.inner.class_list.contains(&class) {
            return;
        }

        let stale: Vec<&str> = self
            .inner
            .config
            .classes()
            .classes()
            .into_iter()
            .filter(|candidate| *candidate != class)
            .collect();
        self.inner.class_list.remove(&stale);
        self.inner.class_list.add(&class);
        tracing::debug!(%class, "applied stored scheme class");
    }

    pub fn is_active(&self) -> bool {
        self.observer
            .borrow()
            .as_ref()
            .is_some_and(AmbientObserver::is_active)
    }

    /// Detaches the ambient observer and releases every subscriber.
    pub fn shutdown(&self) {
        let observer = self.observer.borrow_mut().take();
        let Some(observer) = observer else {
            return;
        };
        observer.deactivate();
        self.inner.ambient.clear();
        self.inner.user.clear();
        self.inner.resolved.clear();
        tracing::info!("scheme engine shut down");
    }
}

impl Drop for SchemeEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SchemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeEngine")
            .field("config", &self.inner.config)
            .field("state", &self.inner.machine.borrow().to_string())
            .field("active", &self.is_active())
            .finish()
    }
}
