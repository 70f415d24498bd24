//! Live screens as seen by the router.

use crate::destination::{Destination, DestinationRef};
use std::sync::Arc;

/// A live screen that takes part in route matching.
pub trait Navigatable: Send + Sync {
    /// The destination this screen currently represents.
    fn origin(&self) -> DestinationRef;

    /// Returns the navigation capability of this screen, if it has one.
    ///
    /// Controllers override this to return `Some(self)`.
    fn as_controller(&self) -> Option<&dyn NavigationController> {
        None
    }
}

/// A screen that can attempt to move the hierarchy to a destination.
///
/// Stacks, tab bars, split views, modal presenters and plain nested screens
/// all look the same to the router through this trait.
pub trait NavigationController: Navigatable {
    /// Try to show `to`, returning whether this screen accepted it.
    fn navigate(&self, to: &dyn Destination, animated: bool) -> bool;
}

/// One entry of a path snapshot. `None` marks a screen that does not take
/// part in matching; it still occupies its depth in the hierarchy.
pub type PathSlot = Option<Arc<dyn Navigatable>>;

/// An ordered snapshot of the live hierarchy, root first.
pub type NavigationPath = Vec<PathSlot>;
