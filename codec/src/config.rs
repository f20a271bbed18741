//! Length limits applied while decoding untrusted input.

use core::ops::{Bound, RangeBounds};

/// Configuration for limiting the range of a decoded length or count.
///
/// Collections decoded from untrusted bytes declare their own length. A limit rejects an
/// oversized declaration before anything is allocated for it.
///
/// # Examples
///
/// ```
/// use binprot_codec::RangeCfg;
///
/// // Limit lengths to 0..=1024
/// let cfg = RangeCfg::new(0..=1024);
/// assert!(cfg.contains(500));
/// assert!(!cfg.contains(2000));
///
/// // Allow any length >= 1
/// let cfg_min = RangeCfg::from(1..);
/// assert!(cfg_min.contains(1));
/// assert!(!cfg_min.contains(0));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RangeCfg {
    /// The lower bound of the range.
    start: Bound<usize>,

    /// The upper bound of the range.
    end: Bound<usize>,
}

impl Default for RangeCfg {
    /// Accepts every length.
    fn default() -> Self {
        Self::new(..)
    }
}

macro_rules! impl_from_range {
    ($($range:ty),*) => {
        $(
            impl From<$range> for RangeCfg {
                fn from(r: $range) -> Self {
                    Self::new(r)
                }
            }
        )*
    };
}

impl_from_range!(
    core::ops::Range<usize>,
    core::ops::RangeInclusive<usize>,
    core::ops::RangeFrom<usize>,
    core::ops::RangeTo<usize>,
    core::ops::RangeToInclusive<usize>,
    core::ops::RangeFull
);

impl RangeCfg {
    /// Creates a new `RangeCfg` from any type implementing `RangeBounds<usize>`.
    pub fn new(r: impl RangeBounds<usize>) -> Self {
        RangeCfg {
            start: r.start_bound().cloned(),
            end: r.end_bound().cloned(),
        }
    }

    /// Returns true if `value` is within this range.
    pub fn contains(&self, value: usize) -> bool {
        (self.start, self.end).contains(&value)
    }
}
