//! Custom test assertions

use catalog_fetch::core::warmer::WarmingResult;

/// Assert two values are approximately equal (for floats)
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, 1e-6_f64)
    };
    ($left:expr, $right:expr, $epsilon:expr) => {
        let left_val: f64 = $left as f64;
        let right_val: f64 = $right as f64;
        let diff = (left_val - right_val).abs();
        assert!(
            diff < $epsilon,
            "assertion failed: `(left ~= right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`",
            left_val,
            right_val,
            diff
        );
    };
}

/// Assertions for warming outcomes
pub trait WarmingResultAssertions {
    fn assert_counts(&self, processed: usize, warmed: usize, failed: usize);
    fn assert_skipped(&self);
}

impl WarmingResultAssertions for WarmingResult {
    fn assert_counts(&self, processed: usize, warmed: usize, failed: usize) {
        assert_eq!(
            (
                self.resources_processed,
                self.resources_warmed,
                self.resources_failed
            ),
            (processed, warmed, failed),
            "unexpected counts for strategy '{}': {:?}",
            self.strategy,
            self.errors
        );
        assert_eq!(self.errors.len(), failed);
    }

    fn assert_skipped(&self) {
        assert!(
            self.is_skipped(),
            "expected strategy '{}' to be skipped",
            self.strategy
        );
        assert_eq!(self.resources_processed, 0);
    }
}
