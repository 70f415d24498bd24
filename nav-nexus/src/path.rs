//! Path snapshots of the live screen hierarchy.
//!
//! The router never keeps a snapshot around: it asks its [`PathProvider`] for a
//! fresh one before every match and every attempt.

use crate::node::{NavigationPath, Navigatable};
use log::warn;
use std::sync::{Arc, RwLock};

/// Default depth at which [`HierarchyPathProvider`] stops walking.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Produces the current root-to-frontmost chain of screens.
pub trait PathProvider: Send + Sync {
    fn current_path(&self) -> NavigationPath;
}

impl<F> PathProvider for F
where
    F: Fn() -> NavigationPath + Send + Sync,
{
    fn current_path(&self) -> NavigationPath {
        self()
    }
}

/// A node of the live screen tree.
///
/// Containers decide which child is frontmost: a stack returns its top screen,
/// a tab bar its selected tab, a split view its last column, and a screen
/// with a modal returns the presented screen.
pub trait Screen: Send + Sync {
    /// The matching view of this screen, or `None` for pass-through containers.
    fn navigatable(&self) -> Option<Arc<dyn Navigatable>>;

    /// The child currently in front, if any.
    fn frontmost_child(&self) -> Option<Arc<dyn Screen>>;
}

/// Walks a [`Screen`] tree from its root along the frontmost children.
pub struct HierarchyPathProvider {
    root: RwLock<Option<Arc<dyn Screen>>>,
    max_depth: usize,
}

impl HierarchyPathProvider {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(None),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_root(root: Arc<dyn Screen>) -> Self {
        let provider = Self::new();
        provider.set_root(root);
        provider
    }

    /// Limit how deep a walk may go before it is cut short.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replace the root screen.
    pub fn set_root(&self, root: Arc<dyn Screen>) {
        match self.root.write() {
            Ok(mut guard) => *guard = Some(root),
            Err(poisoned) => *poisoned.into_inner() = Some(root),
        }
    }

    fn root(&self) -> Option<Arc<dyn Screen>> {
        match self.root.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for HierarchyPathProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PathProvider for HierarchyPathProvider {
    fn current_path(&self) -> NavigationPath {
        let mut path = NavigationPath::new();
        let mut screen = self.root();
        while let Some(current) = screen {
            if path.len() == self.max_depth {
                warn!(
                    "Screen hierarchy deeper than {} levels, truncating path",
                    self.max_depth
                );
                break;
            }
            path.push(current.navigatable());
            screen = current.frontmost_child();
        }
        path
    }
}

/// A path the host keeps up to date by hand.
#[derive(Default)]
pub struct StaticPathProvider {
    path: RwLock<NavigationPath>,
}

impl StaticPathProvider {
    pub fn new(path: NavigationPath) -> Self {
        Self {
            path: RwLock::new(path),
        }
    }

    pub fn set(&self, path: NavigationPath) {
        match self.path.write() {
            Ok(mut guard) => *guard = path,
            Err(poisoned) => *poisoned.into_inner() = path,
        }
    }

    /// Append one slot to the frontmost end.
    pub fn push(&self, slot: Option<Arc<dyn Navigatable>>) {
        match self.path.write() {
            Ok(mut guard) => guard.push(slot),
            Err(poisoned) => poisoned.into_inner().push(slot),
        }
    }
}

impl PathProvider for StaticPathProvider {
    fn current_path(&self) -> NavigationPath {
        match self.path.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::DestinationRef;
    use crate::destination;
    use std::sync::Mutex;

    #[destination]
    #[derive(Debug, PartialEq)]
    struct Named(&'static str);

    struct Leaf(&'static str);

    impl Navigatable for Leaf {
        fn origin(&self) -> DestinationRef {
            Arc::new(Named(self.0))
        }
    }

    /// A screen with an optional origin and a settable front child.
    struct TestScreen {
        name: Option<&'static str>,
        front: Mutex<Option<Arc<dyn Screen>>>,
    }

    impl TestScreen {
        fn new(name: Option<&'static str>, front: Option<Arc<dyn Screen>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                front: Mutex::new(front),
            })
        }
    }

    impl Screen for TestScreen {
        fn navigatable(&self) -> Option<Arc<dyn Navigatable>> {
            self.name.map(|name| Arc::new(Leaf(name)) as Arc<dyn Navigatable>)
        }

        fn frontmost_child(&self) -> Option<Arc<dyn Screen>> {
            self.front.lock().unwrap().clone()
        }
    }

    fn names(path: &NavigationPath) -> Vec<Option<String>> {
        path.iter()
            .map(|slot| slot.as_ref().map(|node| format!("{:?}", node.origin())))
            .collect()
    }

    #[test]
    fn test_walk_keeps_pass_through_slots() {
        let leaf = TestScreen::new(Some("detail"), None);
        let tabs = TestScreen::new(None, Some(leaf));
        let root = TestScreen::new(Some("main"), Some(tabs));

        let provider = HierarchyPathProvider::with_root(root);
        let path = provider.current_path();

        assert_eq!(
            names(&path),
            vec![
                Some("Named(\"main\")".to_string()),
                None,
                Some("Named(\"detail\")".to_string()),
            ]
        );
    }

    #[test]
    fn test_walk_without_root_is_empty() {
        let provider = HierarchyPathProvider::new();
        assert!(provider.current_path().is_empty());
    }

    #[test]
    fn test_walk_reflects_changes_between_snapshots() {
        let root = TestScreen::new(Some("main"), None);
        let provider = HierarchyPathProvider::with_root(root.clone());
        assert_eq!(provider.current_path().len(), 1);

        *root.front.lock().unwrap() = Some(TestScreen::new(Some("pushed"), None));
        assert_eq!(provider.current_path().len(), 2);
    }

    #[test]
    fn test_walk_stops_at_max_depth_on_cycle() {
        let root = TestScreen::new(None, None);
        *root.front.lock().unwrap() = Some(root.clone());

        let provider = HierarchyPathProvider::with_root(root.clone()).max_depth(5);
        assert_eq!(provider.current_path().len(), 5);

        // Break the cycle so the test does not leak.
        *root.front.lock().unwrap() = None;
    }

    #[test]
    fn test_static_provider_and_closure_provider() {
        let provider = StaticPathProvider::new(vec![None]);
        provider.push(Some(Arc::new(Leaf("a"))));
        assert_eq!(provider.current_path().len(), 2);

        provider.set(Vec::new());
        assert!(provider.current_path().is_empty());

        let closure = || -> NavigationPath { vec![None, None] };
        assert_eq!(closure.current_path().len(), 2);
    }
}
