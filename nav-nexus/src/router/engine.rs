//! The route reconciliation engine.
//!
//! A [`Router`] matches a requested route against a fresh path snapshot and
//! keeps whatever is left in a pending queue. The queue is driven one
//! destination at a time by steps posted to the scheduler, so screens created
//! by one step get a chance to appear before the next one is attempted.
//!
//! ## States
//! - Idle: nothing pending, no expiry timer.
//! - Active: destinations pending and an expiry timer armed. Every (re)start
//!   of the drive cycle re-arms the timer; when it fires the route is dropped.

use super::matching::divergence;
use super::traits::{Navigation, NavigationRouter};
use crate::config::{ConflictPolicy, RouterConfig};
use crate::destination::{Destination, DestinationRef};
use crate::error::{Error, Result, RouteInProgressSnafu};
use crate::path::PathProvider;
use crate::queue::PendingQueue;
use crate::scheduler::Scheduler;
use crate::task::TaskHandle;
use log::{debug, info, trace, warn};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

#[derive(Default)]
struct RouterState {
    pending: PendingQueue<DestinationRef>,
    animated: bool,
    expiry: Option<TaskHandle>,
    /// Bumped on every arm so a superseded timer cannot clear the queue.
    generation: u64,
    step_posted: bool,
}

struct Inner {
    paths: Arc<dyn PathProvider>,
    scheduler: Arc<dyn Scheduler>,
    config: RouterConfig,
    state: Mutex<RouterState>,
}

/// Cheaply cloneable handle to a navigation router.
///
/// Drive steps and expiry run on the router's [`Scheduler`]. Call
/// `navigate`, `navigate_to` and `check_active_navigation` from that same
/// context too (e.g. via [`Scheduler::post`]) so controllers only ever
/// see one thread.
///
/// # Example
/// ```ignore
/// let router = Router::new(paths, scheduler);
/// router.navigate(&route![Place::Main, Place::Library, Place::Album(3)], true)?;
///
/// // In a screen's lifecycle, once it is visible:
/// router.check_active_navigation();
/// ```
#[derive(Clone)]
pub struct Router {
    inner: Arc<Inner>,
}

impl Router {
    pub fn new(paths: Arc<dyn PathProvider>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_config(paths, scheduler, RouterConfig::default())
    }

    pub fn with_config(
        paths: Arc<dyn PathProvider>,
        scheduler: Arc<dyn Scheduler>,
        config: RouterConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                paths,
                scheduler,
                config,
                state: Mutex::new(RouterState::default()),
            }),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    /// Whether a route is being driven.
    pub fn is_active(&self) -> bool {
        self.pending_len() > 0
    }

    pub fn pending_len(&self) -> usize {
        self.inner
            .read_state(|state| state.pending.len())
            .unwrap_or(0)
    }

    /// Destinations of the active route not reached yet, next first.
    pub fn pending(&self) -> Vec<DestinationRef> {
        self.inner
            .read_state(|state| state.pending.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether the active route animates its transitions.
    pub fn is_animated(&self) -> bool {
        self.inner
            .read_state(|state| state.animated)
            .unwrap_or(false)
    }
}

impl Navigation for Router {
    fn navigate_to(&self, destination: &dyn Destination, animated: bool) -> bool {
        self.inner.navigate_to(destination, animated)
    }

    fn navigate(&self, route: &[DestinationRef], animated: bool) -> Result<()> {
        self.inner.navigate(route, animated)
    }
}

impl NavigationRouter for Router {
    fn check_active_navigation(&self) {
        let Ok(mut state) = self.inner.lock_state() else {
            warn!("Router state poisoned, ignoring resume");
            return;
        };
        if !state.pending.is_empty() {
            trace!("Resuming route, {} destinations pending", state.pending.len());
            self.inner.drive(&mut state);
        }
    }
}

impl Inner {
    fn lock_state(&self) -> Result<MutexGuard<'_, RouterState>> {
        self.state.lock().map_err(|_| Error::LockPoisoned)
    }

    fn navigate_to(&self, destination: &dyn Destination, animated: bool) -> bool {
        let path = self.paths.current_path();
        for node in path.iter().rev().flatten() {
            if let Some(controller) = node.as_controller() {
                if controller.navigate(destination, animated) {
                    trace!("{:?} accepted by {:?}", destination, node.origin());
                    return true;
                }
            }
        }
        trace!("No screen accepted {:?}", destination);
        false
    }

    /// Snapshot read for introspection; a poisoned state reads as `None`.
    fn read_state<R>(&self, f: impl FnOnce(&RouterState) -> R) -> Option<R> {
        match self.lock_state() {
            Ok(state) => Some(f(&state)),
            Err(e) => {
                warn!("Router state unavailable: {}", e);
                None
            }
        }
    }

    fn navigate(self: &Arc<Self>, route: &[DestinationRef], animated: bool) -> Result<()> {
        let pending = self.lock_state()?.pending.len();
        if pending > 0 {
            return self.conflict(route.len(), pending);
        }

        let matched = divergence(&self.paths.current_path(), route);
        let remaining = &route[matched..];

        let mut state = self.lock_state()?;
        // The provider ran unlocked; a screen may have started a route meanwhile.
        if !state.pending.is_empty() {
            let pending = state.pending.len();
            drop(state);
            return self.conflict(route.len(), pending);
        }

        debug!(
            "Route of {} destinations matches live path up to {}",
            route.len(),
            matched
        );
        match remaining {
            [] => Ok(()),
            [last] => {
                drop(state);
                self.navigate_to(last.as_ref(), animated);
                Ok(())
            }
            _ => {
                state.pending.append_all(remaining.iter().cloned());
                state.animated = animated;
                self.drive(&mut state);
                Ok(())
            }
        }
    }

    /// Called with the state lock released so a panic cannot poison it.
    fn conflict(&self, requested: usize, pending: usize) -> Result<()> {
        match self.config.on_conflict {
            ConflictPolicy::Abort => panic!(
                "Navigate to new route is not allowed during active navigation phase \
                 ({pending} destinations pending)"
            ),
            ConflictPolicy::Reject => {
                warn!("Rejecting route of {} destinations, {} still pending", requested, pending);
                RouteInProgressSnafu { pending }.fail()
            }
        }
    }

    /// (Re)start the drive cycle: make sure a step is posted and re-arm expiry.
    fn drive(self: &Arc<Self>, state: &mut RouterState) {
        if !state.step_posted {
            state.step_posted = true;
            let weak = Arc::downgrade(self);
            self.scheduler.post(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.step();
                }
            }));
        }
        self.arm_expiry(state);
    }

    fn arm_expiry(self: &Arc<Self>, state: &mut RouterState) {
        if let Some(previous) = state.expiry.take() {
            previous.abort();
        }
        state.generation += 1;
        let generation = state.generation;
        let weak: Weak<Self> = Arc::downgrade(self);
        let handle = self.scheduler.post_after(
            self.config.expiry,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.expire(generation);
                }
            }),
        );
        state.expiry = Some(handle);
    }

    fn step(self: &Arc<Self>) {
        let (front, animated) = {
            let Ok(mut state) = self.lock_state() else {
                return;
            };
            state.step_posted = false;
            match state.pending.front() {
                Some(front) => (Arc::clone(front), state.animated),
                None => return,
            }
        };

        // Screens are called without the lock so they may call back in.
        if !self.navigate_to(front.as_ref(), animated) {
            return;
        }

        let Ok(mut state) = self.lock_state() else {
            return;
        };
        let unchanged = state
            .pending
            .front()
            .is_some_and(|current| Arc::ptr_eq(current, &front));
        if !unchanged {
            return;
        }
        state.pending.pop_front();
        if state.pending.is_empty() {
            debug!("Route complete");
            state.animated = false;
            if let Some(expiry) = state.expiry.take() {
                expiry.abort();
            }
        } else {
            self.drive(&mut state);
        }
    }

    fn expire(&self, generation: u64) {
        let Ok(mut state) = self.lock_state() else {
            return;
        };
        if state.generation != generation || state.pending.is_empty() {
            return;
        }
        info!(
            "Abandoning route after {:?} without progress, {} destinations pending (next: {:?})",
            self.config.expiry,
            state.pending.len(),
            state.pending.front()
        );
        state.pending.clear();
        state.animated = false;
        state.expiry = None;
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Ok(state) = self.state.get_mut() {
            if let Some(expiry) = state.expiry.take() {
                expiry.abort();
            }
        }
    }
}
