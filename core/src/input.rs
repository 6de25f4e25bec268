//! Touch gesture classification.

use crate::direction::Direction;

/// Minimum travel toward the top/left for a swipe to count, in pixels.
pub const SWIPE_FORWARD_THRESHOLD: f64 = 20.0;
/// Minimum travel toward the bottom/right for a swipe to count, in pixels.
pub const SWIPE_BACKWARD_THRESHOLD: f64 = 15.0;

/// Classify a swipe from the offset between touch start and touch end.
///
/// `dx` and `dy` are `start - end`, so positive values mean the finger
/// travelled left or up. The longer axis wins; a perfect diagonal or a
/// swipe shorter than the threshold is not a move.
pub fn classify_swipe(dx: f64, dy: f64) -> Option<Direction> {
    if dx.abs() > dy.abs() {
        if dx > SWIPE_FORWARD_THRESHOLD {
            Some(Direction::Left)
        } else if dx < -SWIPE_BACKWARD_THRESHOLD {
            Some(Direction::Right)
        } else {
            None
        }
    } else if dy.abs() > dx.abs() {
        if dy > SWIPE_FORWARD_THRESHOLD {
            Some(Direction::Up)
        } else if dy < -SWIPE_BACKWARD_THRESHOLD {
            Some(Direction::Down)
        } else {
            None
        }
    } else {
        None
    }
}
