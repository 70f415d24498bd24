//! Router module.
//!
//! Reconciles requested routes with the live screen hierarchy.

pub mod engine;
pub mod matching;
pub mod traits;

pub use engine::Router;
pub use matching::divergence;
pub use traits::{Navigation, NavigationRouter};
