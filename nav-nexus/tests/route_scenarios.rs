use nav_nexus::{
    destination, route, ConflictPolicy, Destination, DestinationRef, Error, HierarchyPathProvider,
    LoopScheduler, Navigatable, Navigation, NavigationController, NavigationRouter, Router,
    RouterConfig, Screen, ScreenLifecycle,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

// ============================================================================
// Test hierarchy: a navigation stack rooted at `Main` with plain pages on top
// ============================================================================

#[destination]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Place {
    Main,
    Inbox,
    Thread(u32),
    Message(u32),
}

struct Page(Place);

impl Navigatable for Page {
    fn origin(&self) -> DestinationRef {
        Arc::new(self.0)
    }
}

impl Screen for Page {
    fn navigatable(&self) -> Option<Arc<dyn Navigatable>> {
        Some(Arc::new(Page(self.0)))
    }

    fn frontmost_child(&self) -> Option<Arc<dyn Screen>> {
        None
    }
}

/// A stack controller. While a push transition runs it refuses new pushes.
struct Stack {
    me: Weak<Stack>,
    pages: Mutex<Vec<Arc<Page>>>,
    blocked: Mutex<HashSet<Place>>,
    in_transition: Mutex<bool>,
    simulate_transitions: bool,
    attempts: Mutex<Vec<Place>>,
}

impl Stack {
    fn new(simulate_transitions: bool) -> Arc<Self> {
        Arc::new_cyclic(|me| Stack {
            me: me.clone(),
            pages: Mutex::new(Vec::new()),
            blocked: Mutex::new(HashSet::new()),
            in_transition: Mutex::new(false),
            simulate_transitions,
            attempts: Mutex::new(Vec::new()),
        })
    }

    fn block(&self, place: Place) {
        self.blocked.lock().unwrap().insert(place);
    }

    fn unblock(&self, place: Place) {
        self.blocked.lock().unwrap().remove(&place);
    }

    fn push(&self, place: Place) {
        self.pages.lock().unwrap().push(Arc::new(Page(place)));
    }

    fn finish_transition(&self) {
        *self.in_transition.lock().unwrap() = false;
    }

    fn attempts(&self) -> Vec<Place> {
        self.attempts.lock().unwrap().clone()
    }

    fn top(&self) -> Option<Place> {
        self.pages.lock().unwrap().last().map(|page| page.0)
    }
}

impl Navigatable for Stack {
    fn origin(&self) -> DestinationRef {
        Arc::new(Place::Main)
    }

    fn as_controller(&self) -> Option<&dyn NavigationController> {
        Some(self)
    }
}

impl NavigationController for Stack {
    fn navigate(&self, to: &dyn Destination, _animated: bool) -> bool {
        let Some(place) = to.as_any().downcast_ref::<Place>().copied() else {
            return false;
        };
        self.attempts.lock().unwrap().push(place);
        if self.blocked.lock().unwrap().contains(&place) || *self.in_transition.lock().unwrap() {
            return false;
        }
        self.push(place);
        if self.simulate_transitions {
            *self.in_transition.lock().unwrap() = true;
        }
        true
    }
}

impl Screen for Stack {
    fn navigatable(&self) -> Option<Arc<dyn Navigatable>> {
        self.me.upgrade().map(|me| me as Arc<dyn Navigatable>)
    }

    fn frontmost_child(&self) -> Option<Arc<dyn Screen>> {
        self.pages
            .lock()
            .unwrap()
            .last()
            .map(|page| page.clone() as Arc<dyn Screen>)
    }
}

/// The window: a pass-through container around the stack.
struct Window(Arc<Stack>);

impl Screen for Window {
    fn navigatable(&self) -> Option<Arc<dyn Navigatable>> {
        None
    }

    fn frontmost_child(&self) -> Option<Arc<dyn Screen>> {
        Some(self.0.clone())
    }
}

struct Harness {
    scheduler: Arc<LoopScheduler>,
    stack: Arc<Stack>,
    router: Router,
}

fn harness_with(simulate_transitions: bool, config: RouterConfig) -> Harness {
    let scheduler = Arc::new(LoopScheduler::new());
    let stack = Stack::new(simulate_transitions);
    let paths = Arc::new(HierarchyPathProvider::with_root(Arc::new(Window(stack.clone()))));
    let router = Router::with_config(paths, scheduler.clone(), config);
    Harness {
        scheduler,
        stack,
        router,
    }
}

fn harness() -> Harness {
    harness_with(false, RouterConfig::default())
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_single_unmatched_destination_navigates_immediately() {
    let h = harness();
    h.stack.push(Place::Inbox);

    h.router
        .navigate(&route![Place::Main, Place::Inbox, Place::Thread(1)], true)
        .unwrap();

    assert_eq!(h.stack.attempts(), vec![Place::Thread(1)]);
    assert_eq!(h.stack.top(), Some(Place::Thread(1)));
    assert!(!h.router.is_active());
    assert_eq!(h.scheduler.pending_jobs(), 0);
}

#[test]
fn test_fully_matched_route_schedules_nothing() {
    let h = harness();
    h.stack.push(Place::Inbox);

    h.router.navigate(&route![Place::Main, Place::Inbox], true).unwrap();

    assert!(h.stack.attempts().is_empty());
    assert_eq!(h.scheduler.pending_jobs(), 0);
}

#[test]
fn test_divergent_route_is_queued_and_each_pop_reschedules() {
    let h = harness();
    h.stack.block(Place::Thread(2));

    h.router
        .navigate(&route![Place::Inbox, Place::Thread(2), Place::Message(3)], true)
        .unwrap();
    assert_eq!(h.router.pending_len(), 3);
    assert!(h.stack.attempts().is_empty());

    h.scheduler.run_pending();

    assert_eq!(h.stack.attempts(), vec![Place::Inbox, Place::Thread(2)]);
    let pending = h.router.pending();
    assert_eq!(pending.len(), 2);
    assert!(pending[0].is_equal_to(&Place::Thread(2)));
    assert!(pending[1].is_equal_to(&Place::Message(3)));
}

#[test]
fn test_stalled_route_is_abandoned_after_expiry() {
    let h = harness();
    h.stack.block(Place::Thread(1));

    h.router
        .navigate(&route![Place::Main, Place::Inbox, Place::Thread(1)], false)
        .unwrap();
    // Only two destinations remain after matching `Main`.
    assert_eq!(h.router.pending_len(), 2);
    h.scheduler.run_pending();
    assert_eq!(h.stack.top(), Some(Place::Inbox));

    h.scheduler.advance(Duration::from_millis(301));
    assert!(!h.router.is_active());
    assert!(!h.router.is_animated());

    h.stack.unblock(Place::Thread(1));
    h.router.check_active_navigation();
    assert_eq!(h.scheduler.run_pending(), 0);
    assert_eq!(h.stack.top(), Some(Place::Inbox));
}

#[test]
fn test_expiry_is_measured_from_last_progress() {
    let h = harness();
    h.stack.block(Place::Inbox);
    h.stack.block(Place::Thread(1));

    h.router
        .navigate(&route![Place::Inbox, Place::Thread(1), Place::Message(1)], true)
        .unwrap();
    h.scheduler.advance(Duration::from_millis(200));

    h.stack.unblock(Place::Inbox);
    h.router.check_active_navigation();
    h.scheduler.run_pending();
    assert_eq!(h.stack.top(), Some(Place::Inbox));

    // 300ms after the last restart, not after the route started.
    h.scheduler.advance(Duration::from_millis(299));
    assert!(h.router.is_active());
    h.scheduler.advance(Duration::from_millis(1));
    assert!(!h.router.is_active());
}

#[test]
#[should_panic(expected = "not allowed during active navigation")]
fn test_second_route_during_active_route_is_fatal() {
    let h = harness();
    h.stack.block(Place::Inbox);

    h.router
        .navigate(&route![Place::Inbox, Place::Thread(1)], true)
        .unwrap();
    let _ = h.router.navigate(&route![Place::Thread(2), Place::Message(2)], true);
}

#[test]
fn test_second_route_can_be_rejected_instead() {
    let h = harness_with(
        false,
        RouterConfig::default().on_conflict(ConflictPolicy::Reject),
    );
    h.stack.block(Place::Inbox);
    h.router
        .navigate(&route![Place::Inbox, Place::Thread(1)], true)
        .unwrap();

    let result = h
        .router
        .navigate(&route![Place::Thread(2), Place::Message(2)], true);
    assert!(matches!(result, Err(Error::RouteInProgress { pending: 2 })));

    // Once the first route is gone a new one is accepted.
    h.scheduler.advance(Duration::from_secs(1));
    h.stack.unblock(Place::Inbox);
    h.router
        .navigate(&route![Place::Inbox, Place::Thread(2)], true)
        .unwrap();
    h.scheduler.run_pending();
    assert_eq!(h.stack.top(), Some(Place::Thread(2)));
}

// ============================================================================
// Resuming through screen lifecycles
// ============================================================================

#[test]
fn test_route_follows_screen_transitions() {
    let h = harness_with(true, RouterConfig::default());
    let lifecycle = ScreenLifecycle::new(h.router.clone());

    h.router
        .navigate(
            &route![Place::Main, Place::Inbox, Place::Thread(4), Place::Message(9)],
            true,
        )
        .unwrap();

    for expected in [Place::Inbox, Place::Thread(4), Place::Message(9)] {
        h.scheduler.advance(Duration::from_millis(120));
        assert_eq!(h.stack.top(), Some(expected));

        h.stack.finish_transition();
        lifecycle.did_appear();
    }
    h.scheduler.run_pending();

    assert!(!h.router.is_active());
    assert_eq!(h.scheduler.pending_jobs(), 0);
    assert_eq!(
        h.stack.attempts(),
        vec![
            Place::Inbox,
            Place::Thread(4),
            Place::Thread(4),
            Place::Message(9),
            Place::Message(9),
        ]
    );
}

#[test]
fn test_navigate_to_does_not_touch_route_state() {
    let h = harness();
    assert!(h.router.navigate_to(&Place::Inbox, true));
    h.stack.block(Place::Thread(1));
    assert!(!h.router.navigate_to(&Place::Thread(1), true));

    assert!(!h.router.is_active());
    assert_eq!(h.scheduler.pending_jobs(), 0);
}
