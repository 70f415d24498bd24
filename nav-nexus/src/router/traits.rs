//! Navigation traits exposed to screens and other callers.

use crate::destination::{Destination, DestinationRef};

/// Requesting navigation.
pub trait Navigation {
    /// Offer `destination` to the live screens, frontmost first, and report
    /// whether one of them accepted it. Never retries.
    fn navigate_to(&self, destination: &dyn Destination, animated: bool) -> bool;

    /// Bring the hierarchy in line with `route`, a root-first sequence of
    /// destinations. Steps that cannot be taken right away are retried
    /// asynchronously until they succeed or the route expires.
    fn navigate(&self, route: &[DestinationRef], animated: bool) -> crate::Result<()>;
}

/// The router side of navigation, driven by screen lifecycle events.
pub trait NavigationRouter: Navigation {
    /// Resume a stalled route, typically once a screen has finished appearing.
    /// Does nothing when no route is active.
    fn check_active_navigation(&self);
}
