//! Success predicates that rolled totals are tested against.

use std::fmt;

/// Condition an attempt's totals must meet to count as a success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Unlikely to change, no logical fallback")]
pub enum Target {
	/// Total must be greater than or equal to the value (`/15`, `/+15`, `/>=15`)
	AtLeast(i64),

	/// Total must be less than or equal to the value (`/-4`, `/<=4`)
	AtMost(i64),

	/// Total must be exactly the value (`/=4`, `/==4`)
	Equals(i64),

	/// Total must be within the inclusive range (`/3-5`)
	Range(i64, i64),
}

impl Target {
	/// Creates a range target, making sure the range isn't inverted.
	///
	/// # Errors
	/// If `lo` is greater than `hi`, [`Error::InvertedRange`] is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::{target::Error, Target};
	///
	/// assert_eq!(Target::range(3, 5), Ok(Target::Range(3, 5)));
	/// assert_eq!(Target::range(5, 3), Err(Error::InvertedRange(5, 3)));
	/// ```
	pub const fn range(lo: i64, hi: i64) -> Result<Self, Error> {
		Self::Range(lo, hi).validated()
	}

	/// Returns the target as-is if it can be met by some value at all.
	///
	/// # Errors
	/// If the target is a range with its bounds the wrong way around, [`Error::InvertedRange`] is returned.
	pub const fn validated(self) -> Result<Self, Error> {
		match self {
			Self::Range(lo, hi) if lo > hi => Err(Error::InvertedRange(lo, hi)),
			Self::AtLeast(..) | Self::AtMost(..) | Self::Equals(..) | Self::Range(..) => Ok(self),
		}
	}

	/// Checks whether a value satisfies the target.
	///
	/// # Examples
	/// ```
	/// use rollstats::Target;
	///
	/// assert!(Target::AtLeast(15).matches(15));
	/// assert!(!Target::AtMost(4).matches(5));
	/// assert!(Target::Range(3, 5).matches(4));
	/// ```
	#[must_use]
	pub const fn matches(&self, val: i64) -> bool {
		match self {
			Self::AtLeast(expected) => val >= *expected,
			Self::AtMost(expected) => val <= *expected,
			Self::Equals(expected) => val == *expected,
			Self::Range(lo, hi) => *lo <= val && val <= *hi,
		}
	}

	/// Checks whether any of the values satisfies the target. Used for attempts with several options, where one
	/// success among them is enough.
	///
	/// # Examples
	/// ```
	/// use rollstats::Target;
	///
	/// assert!(Target::AtLeast(4).matches_any([1, 2, 4]));
	/// assert!(!Target::AtLeast(4).matches_any([1, 2, 3]));
	/// assert!(!Target::AtLeast(4).matches_any([]));
	/// ```
	#[must_use]
	pub fn matches_any(&self, vals: impl IntoIterator<Item = i64>) -> bool {
		vals.into_iter().any(|val| self.matches(val))
	}
}

impl fmt::Display for Target {
	/// Formats the target the way it is described in reports: `>= 15`, `<= 4`, `== 4`, or `3<=...<=5`.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::AtLeast(val) => write!(f, ">= {val}"),
			Self::AtMost(val) => write!(f, "<= {val}"),
			Self::Equals(val) => write!(f, "== {val}"),
			Self::Range(lo, hi) => write!(f, "{lo}<=...<={hi}"),
		}
	}
}

/// An error resulting from building a [`Target`]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// The range's start is past its end, so nothing could ever match it.
	#[error("range start {0} is greater than its end {1}")]
	InvertedRange(i64, i64),
}
