use super::{CreationError, Histogram};

#[path = "helpers.rs"]
mod helpers;
#[path = "index_calculation.rs"]
mod index_calculation;

#[test]
fn new_err_low_zero() {
    let res = Histogram::<u64>::new_with_bounds(0, 100, 3);
    assert_eq!(CreationError::LowIsZero, res.unwrap_err());
}

#[test]
fn new_err_low_exceeds_max() {
    let res = Histogram::<u64>::new_with_bounds(u64::max_value() / 2 + 1, u64::max_value(), 3);
    assert_eq!(CreationError::LowExceedsMax, res.unwrap_err());
}

#[test]
fn new_err_high_not_double_low() {
    let res = Histogram::<u64>::new_with_bounds(10, 15, 0);
    assert_eq!(CreationError::HighLessThanTwiceLow, res.unwrap_err());
}

#[test]
fn new_err_sigfig_exceeds_max() {
    let res = Histogram::<u64>::new_with_bounds(1, 100, 6);
    assert_eq!(CreationError::SigFigExceedsMax, res.unwrap_err());
}

#[test]
fn new_err_cannot_represent_sigfig_beyond_low() {
    // 5 sigfig needs an 18-bit sub-bucket range; a low near the top of u64
    // leaves no room for it
    let res = Histogram::<u64>::new_with_bounds(1_u64 << 50, u64::max_value(), 5);
    assert_eq!(
        CreationError::CannotRepresentSigFigBeyondLow,
        res.unwrap_err()
    );
}

#[test]
fn new_ok_at_sigfig_boundaries() {
    assert!(Histogram::<u64>::new_with_bounds(1, 100, 0).is_ok());
    assert!(Histogram::<u64>::new_with_bounds(1, 100, 5).is_ok());
}
