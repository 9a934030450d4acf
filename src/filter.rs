//! User-supplied point predicates.
use crate::scan::Point;

/// A predicate applied to every candidate point before it is appended to a
/// scan buffer. The decoder applies its configured filters in registration
/// order and short-circuits on the first rejection.
pub trait PointFilter: Send + Sync {
    fn excluded(&self, point: &Point) -> bool;
}
