//! Series transforms: monthly resampling, change rates and rolling windows.
//!
//! All functions are pure: they borrow their input and return a new sequence.

pub mod change;
pub mod resample;
pub mod rolling;

pub use change::{CHANGE_SUFFIX, CHANGE_UNIT, monthly_change};
pub use resample::{AsOfAnchor, month_start, resample_monthly, resample_monthly_anchored};
pub use rolling::rolling_mean;
