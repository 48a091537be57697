//! Controller lifecycle guards: single-instance enforcement and the
//! event-binding set.
//!
//! Two invariants live here. First, at most one live controller exists per
//! process, enforced by [`InstanceGuard`] rather than an implicit shared
//! global: `app::run` acquires the guard at startup and the controller
//! cannot be built without it, so two independent pollers can never coexist.
//! Second, every event subscription the controller holds (the five control
//! keys, the two network-presence signals) is tracked in a [`BindingSet`]
//! keyed by [`BindingKey`], with at most one revocable [`Subscription`] per
//! key at any time. Binding is guarded by a flag so a repeated bind warns
//! and attaches nothing; unbinding revokes every handle and is idempotent.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::event::KeyCode;
use tokio::task::JoinHandle;

use crate::state::ControlMsg;

static CONTROLLER_LIVE: AtomicBool = AtomicBool::new(false);

/// Process-wide gate proving no other controller instance is live.
///
/// Released on drop so a full teardown (or a test) can re-acquire.
#[derive(Debug)]
pub struct InstanceGuard {
    _priv: (),
}

impl InstanceGuard {
    /// Acquire the gate. Returns `None` while another guard is live.
    pub fn acquire() -> Option<Self> {
        CONTROLLER_LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self { _priv: () })
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        CONTROLLER_LIVE.store(false, Ordering::Release);
    }
}

/// Identity of one event subscription: five controls, two network signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingKey {
    /// Install control key.
    Install,
    /// Update control key.
    Update,
    /// Uninstall control key.
    Uninstall,
    /// Manual refresh control key.
    Refresh,
    /// Auto-refresh toggle key.
    AutoRefresh,
    /// Host "network present" signal listener.
    NetOnline,
    /// Host "network absent" signal listener.
    NetOffline,
}

/// A revocable subscription handle.
#[derive(Debug)]
pub enum Subscription {
    /// A keyboard route: pressing `code` emits `msg`. Revocation removes
    /// the route, after which the key press is ignored.
    Key {
        /// Key that triggers the route.
        code: KeyCode,
        /// Message emitted when the key is pressed.
        msg: ControlMsg,
    },
    /// A background listener task; revocation aborts it.
    Task(JoinHandle<()>),
}

impl Subscription {
    fn revoke(self) {
        if let Self::Task(handle) = self {
            handle.abort();
        }
    }
}

/// The set of currently-attached subscriptions.
#[derive(Debug, Default)]
pub struct BindingSet {
    map: HashMap<BindingKey, Subscription>,
    bound: bool,
}

impl BindingSet {
    /// Attach `subs`, one per key, exactly once.
    ///
    /// When bindings already exist this logs a warning, revokes the incoming
    /// handles so no listener task leaks, and attaches nothing. Otherwise it
    /// unbinds first (idempotent safety net) and then attaches.
    pub fn bind(&mut self, subs: Vec<(BindingKey, Subscription)>) -> bool {
        if self.bound {
            tracing::warn!("events already bound; ignoring rebind");
            for (_, sub) in subs {
                sub.revoke();
            }
            return false;
        }
        self.unbind();
        for (key, sub) in subs {
            if let Some(previous) = self.map.insert(key, sub) {
                previous.revoke();
            }
        }
        self.bound = true;
        true
    }

    /// Revoke every tracked subscription and clear the set. Safe to call
    /// when nothing is bound.
    pub fn unbind(&mut self) {
        for (_, sub) in self.map.drain() {
            sub.revoke();
        }
        self.bound = false;
    }

    /// Whether `bind` has attached the current set.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no subscription is attached.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Resolve a pressed key to its bound control message, if any.
    pub fn route(&self, code: KeyCode) -> Option<ControlMsg> {
        self.map.values().find_map(|sub| match sub {
            Subscription::Key { code: c, msg } if *c == code => Some(*msg),
            _ => None,
        })
    }
}

impl Drop for BindingSet {
    fn drop(&mut self) {
        // No handler may outlive the owning controller.
        self.unbind();
    }
}
