//! Navigation destinations.
//!
//! A destination is an opaque token describing "where to go". The engine never
//! inspects one; it only compares two of them through [`Destination::is_equal_to`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An opaque, comparable navigation target.
///
/// Usually implemented with the `#[destination]` attribute, which compares by
/// concrete type and `PartialEq`.
pub trait Destination: Any + fmt::Debug + Send + Sync {
    /// Whether `other` denotes the same place as `self`.
    fn is_equal_to(&self, other: &dyn Destination) -> bool;

    /// Upcast used for type-aware comparisons.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a destination.
pub type DestinationRef = Arc<dyn Destination>;

/// An ordered, root-first sequence of destinations.
pub type Route = Vec<DestinationRef>;

/// Build a [`Route`] from plain destination values.
///
/// # Example
/// ```ignore
/// use nav_nexus::route;
///
/// let deep_link = route![Place::Main, Place::Library, Place::Album(3)];
/// router.navigate(&deep_link, true)?;
/// ```
#[macro_export]
macro_rules! route {
    () => {
        $crate::Route::new()
    };
    ($($dest:expr),+ $(,)?) => {
        vec![$(::std::sync::Arc::new($dest) as $crate::DestinationRef),+]
    };
}
