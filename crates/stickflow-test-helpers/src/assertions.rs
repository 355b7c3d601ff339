//! Assertion macros for numeric sequences.

/// Assert two floats are within `tolerance` of each other.
///
/// ```
/// use stickflow_test_helpers::assert_approx_eq;
/// assert_approx_eq!(0.1 + 0.2, 0.3, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let tolerance: f64 = $tolerance;
        let diff = (left - right).abs();
        if !(diff <= tolerance) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`",
                left, right, diff, tolerance
            );
        }
    };
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let tolerance: f64 = $tolerance;
        let diff = (left - right).abs();
        if !(diff <= tolerance) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`: {}",
                left, right, diff, tolerance, format_args!($($arg)+)
            );
        }
    };
}

/// Assert every value lies in `[lo, hi]`.
#[macro_export]
macro_rules! assert_all_within {
    ($values:expr, $lo:expr, $hi:expr $(,)?) => {
        let lo = $lo;
        let hi = $hi;
        for (i, v) in $values.into_iter().enumerate() {
            if !(lo <= v && v <= hi) {
                panic!(
                    "assertion failed: value outside [{:?}, {:?}]\n  index {}: {:?}",
                    lo, hi, i, v
                );
            }
        }
    };
}

/// Assert a sequence never increases.
#[macro_export]
macro_rules! assert_non_increasing {
    ($collection:expr $(,)?) => {
        let collection = $collection;
        let mut iter = collection.iter();
        if let Some(mut prev) = iter.next() {
            for (i, curr) in iter.enumerate() {
                if prev < curr {
                    panic!(
                        "assertion failed: sequence increases\n  at index {}: {:?} < {:?}",
                        i + 1,
                        prev,
                        curr
                    );
                }
                prev = curr;
            }
        }
    };
}
