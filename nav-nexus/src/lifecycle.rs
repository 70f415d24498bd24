//! Screen lifecycle hooks.
//!
//! A screen owns a [`ScreenLifecycle`] and forwards its appearance events to
//! it. The lifecycle is handed the router explicitly when the screen is built.

use crate::destination::{Destination, DestinationRef};
use crate::router::{Navigation, NavigationRouter};

/// Observer of a screen's visibility, e.g. a view model that pauses work
/// while its screen is hidden.
pub trait LifecycleMonitor: Send + Sync {
    fn will_appear(&self) {}

    fn did_disappear(&self) {}
}

/// Lifecycle plumbing shared by every screen.
pub struct ScreenLifecycle<R: NavigationRouter> {
    router: R,
    monitors: Vec<Box<dyn LifecycleMonitor>>,
}

impl<R: NavigationRouter> ScreenLifecycle<R> {
    pub fn new(router: R) -> Self {
        Self {
            router,
            monitors: Vec::new(),
        }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn add_monitor(&mut self, monitor: Box<dyn LifecycleMonitor>) {
        self.monitors.push(monitor);
    }

    pub fn will_appear(&self) {
        for monitor in &self.monitors {
            monitor.will_appear();
        }
    }

    /// The screen is on screen and can host navigation: resume any route
    /// that was waiting for it.
    pub fn did_appear(&self) {
        self.router.check_active_navigation();
    }

    pub fn did_disappear(&self) {
        for monitor in &self.monitors {
            monitor.did_disappear();
        }
    }

    /// Fire-and-forget single destination navigation.
    pub fn navigate_to(&self, destination: &dyn Destination, animated: bool) {
        let _ = self.router.navigate_to(destination, animated);
    }

    pub fn navigate(&self, route: &[DestinationRef], animated: bool) -> crate::Result<()> {
        self.router.navigate(route, animated)
    }
}
