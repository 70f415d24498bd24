//! Matching a desired route against a live path.

use crate::destination::DestinationRef;
use crate::node::PathSlot;

/// Count how many leading destinations of `route` the live `path` already
/// satisfies.
///
/// The path is walked root first with one cursor per sequence. Pass-through
/// slots only advance the path cursor; a slot whose origin matches the next
/// destination advances both; the first mismatch ends the walk. The returned
/// index is where navigation has to continue.
pub fn divergence(path: &[PathSlot], route: &[DestinationRef]) -> usize {
    let mut path_index = 0;
    let mut route_index = 0;
    while route_index < route.len() && path_index < path.len() {
        if let Some(node) = &path[path_index] {
            if !node.origin().is_equal_to(route[route_index].as_ref()) {
                break;
            }
            route_index += 1;
        }
        path_index += 1;
    }
    route_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination;
    use crate::node::Navigatable;
    use crate::route;
    use std::sync::Arc;

    #[destination]
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum P {
        X,
        Y,
        Z,
        A,
    }

    struct Node(P);

    impl Navigatable for Node {
        fn origin(&self) -> DestinationRef {
            Arc::new(self.0)
        }
    }

    fn slot(p: P) -> PathSlot {
        Some(Arc::new(Node(p)))
    }

    #[test]
    fn test_prefix_match_stops_at_route_end() {
        let path = vec![slot(P::X), slot(P::Y)];
        assert_eq!(divergence(&path, &route![P::X, P::Y, P::Z]), 2);
        assert_eq!(divergence(&path, &route![P::X, P::Y]), 2);
        assert_eq!(divergence(&path, &route![P::X]), 1);
    }

    #[test]
    fn test_first_mismatch_ends_walk() {
        let path = vec![slot(P::X), slot(P::Y), slot(P::Z)];
        assert_eq!(divergence(&path, &route![P::A, P::Y, P::Z]), 0);
        // A later match after a mismatch does not count.
        assert_eq!(divergence(&path, &route![P::X, P::Z, P::Z]), 1);
    }

    #[test]
    fn test_pass_through_slots_are_skipped() {
        let path = vec![None, slot(P::X), None, None, slot(P::Y)];
        assert_eq!(divergence(&path, &route![P::X, P::Y, P::Z]), 2);
    }

    #[test]
    fn test_empty_inputs() {
        let path = vec![slot(P::X)];
        assert_eq!(divergence(&path, &route![]), 0);
        assert_eq!(divergence(&[], &route![P::X]), 0);
        assert_eq!(divergence(&[None, None], &route![P::X]), 0);
    }

    #[test]
    fn test_route_index_never_exceeds_either_length() {
        let paths: Vec<Vec<PathSlot>> = vec![
            vec![],
            vec![None],
            vec![slot(P::X), None, slot(P::Y), slot(P::Z)],
            vec![slot(P::X), slot(P::X), slot(P::X)],
        ];
        let routes = vec![
            route![],
            route![P::X],
            route![P::X, P::Y],
            route![P::X, P::X, P::X, P::X],
        ];
        for path in &paths {
            let matchable = path.iter().filter(|s| s.is_some()).count();
            for route in &routes {
                let index = divergence(path, route);
                assert!(index <= route.len());
                assert!(index <= matchable);
            }
        }
    }
}
