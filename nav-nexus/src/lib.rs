//! Declarative navigation over a live, changing screen hierarchy.
//!
//! Callers ask a [`Router`] for a destination or a whole route; the router
//! compares the route with the screens currently presented and drives the
//! remaining steps one by one as screens finish appearing.

extern crate self as nav_nexus;

pub mod config;
pub mod destination;
pub mod error;
pub mod lifecycle;
pub mod node;
pub mod path;
pub mod queue;
pub mod router;
pub mod scheduler;
pub mod task;

pub use error::{Error, Result};
pub use nav_setup::destination;

// Re-export common types for convenience
pub use config::{ConflictPolicy, RouterConfig};
pub use destination::{Destination, DestinationRef, Route};
pub use lifecycle::{LifecycleMonitor, ScreenLifecycle};
pub use node::{NavigationController, NavigationPath, Navigatable, PathSlot};
pub use path::{HierarchyPathProvider, PathProvider, Screen, StaticPathProvider};
pub use queue::PendingQueue;
pub use router::{divergence, Navigation, NavigationRouter, Router};
pub use scheduler::{Job, LoopScheduler, Scheduler, TokioScheduler};
pub use task::{TaskHandle, TaskTracker};
