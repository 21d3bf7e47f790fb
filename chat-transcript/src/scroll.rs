//! Scroll estimation.
//!
//! The chat view only renders what fits in the viewport. To get N messages
//! on screen the driver scrolls back roughly one viewport per batch of
//! visible messages. The density is an assumption, not a measurement.

use std::num::NonZeroUsize;

/// Assumed number of messages visible in one viewport without scrolling.
pub const MESSAGES_PER_VIEWPORT: usize = 15;

/// Number of scroll actions needed to surface `desired` messages.
pub fn estimate_scrolls(desired: NonZeroUsize) -> usize {
    estimate_scrolls_with(desired, MESSAGES_PER_VIEWPORT)
}

/// Same as [`estimate_scrolls`] with a configured viewport density.
/// A density of zero is treated as one message per viewport.
pub fn estimate_scrolls_with(desired: NonZeroUsize, per_viewport: usize) -> usize {
    desired.get().div_ceil(per_viewport.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).unwrap()
    }

    #[test]
    fn test_default_density() {
        assert_eq!(estimate_scrolls(n(50)), 4);
        assert_eq!(estimate_scrolls(n(15)), 1);
        assert_eq!(estimate_scrolls(n(16)), 2);
        assert_eq!(estimate_scrolls(n(1)), 1);
    }

    #[test]
    fn test_custom_density() {
        assert_eq!(estimate_scrolls_with(n(50), 25), 2);
        assert_eq!(estimate_scrolls_with(n(3), 0), 3);
    }
}
