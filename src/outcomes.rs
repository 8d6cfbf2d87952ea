//! Exact enumeration of every total a formula, or a set of options rolled together, can produce.
//!
//! Outcome lists are multisets: a total appears once for every way of rolling it, so counting entries gives exact
//! probabilities. Their size grows exponentially with the number of dice, which is why every step is checked against
//! [`Limits`] before anything is allocated.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::{dice::Error, target::Target};

/// Default maximum number of entries any single outcome list may have
pub const DEFAULT_MAX_OUTCOMES: usize = 1_000_000;

/// Bounds on how large enumerations are allowed to get
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Limits {
	/// Maximum number of entries in any outcome list (die rolls, formula totals, or joint outcomes)
	pub max_outcomes: usize,
}

impl Limits {
	/// Creates limits with the given maximum number of outcomes.
	#[must_use]
	#[inline]
	pub const fn new(max_outcomes: usize) -> Self {
		Self { max_outcomes }
	}

	/// Checks whether an enumeration of the given size is allowed.
	///
	/// # Errors
	/// If `outcomes` is larger than [`Self::max_outcomes`], [`Error::TooManyOutcomes`] is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::outcomes::Limits;
	///
	/// let limits = Limits::new(36);
	/// assert!(limits.check(36).is_ok());
	/// assert!(limits.check(37).is_err());
	/// ```
	pub fn check(&self, outcomes: u128) -> Result<(), Error> {
		if outcomes > self.max_outcomes as u128 {
			return Err(Error::TooManyOutcomes {
				outcomes,
				limit: self.max_outcomes,
			});
		}
		Ok(())
	}
}

impl Default for Limits {
	#[inline]
	fn default() -> Self {
		Self::new(DEFAULT_MAX_OUTCOMES)
	}
}

/// Product of two list lengths, saturating instead of overflowing.
fn len_product(a: usize, b: usize) -> u128 {
	(a as u128).saturating_mul(b as u128)
}

/// Adds every entry of `rolls` to every entry of `totals`, producing the totals of both rolled together.
/// An empty `rolls` list leaves `totals` unchanged.
///
/// # Errors
/// If the combined list would be larger than the limits allow, [`Error::TooManyOutcomes`] is returned.
///
/// # Examples
/// ```
/// use rollstats::outcomes::{combine_sums, Limits};
///
/// let totals = combine_sums(&[1, 2], &[10, 20], &Limits::default())?;
/// assert_eq!(totals, vec![11, 21, 12, 22]);
/// assert_eq!(combine_sums(&totals, &[], &Limits::default())?, totals);
/// # Ok::<(), rollstats::dice::Error>(())
/// ```
pub fn combine_sums(totals: &[i64], rolls: &[i64], limits: &Limits) -> Result<Vec<i64>, Error> {
	if rolls.is_empty() {
		return Ok(totals.to_vec());
	}

	limits.check(len_product(totals.len(), rolls.len()))?;
	Ok(totals
		.iter()
		.flat_map(|total| rolls.iter().map(move |roll| total.saturating_add(*roll)))
		.collect())
}

/// How often each total turns up in one option's outcome list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tally {
	/// Number of entries in the list
	len: u128,

	/// Entries per distinct total
	counts: BTreeMap<i64, u128>,
}

impl Tally {
	/// Tallies an outcome list.
	fn new(totals: &[i64]) -> Self {
		let mut counts = BTreeMap::new();
		for total in totals {
			let count = counts.entry(*total).or_insert(0_u128);
			*count = count.saturating_add(1);
		}
		Self {
			len: totals.len() as u128,
			counts,
		}
	}

	/// Entries that don't satisfy the predicate.
	fn missing(&self, pred: impl Fn(i64) -> bool) -> u128 {
		let hits: u128 = self
			.counts
			.iter()
			.filter(|(total, _)| pred(**total))
			.map(|(_, count)| count)
			.sum();
		self.len.saturating_sub(hits)
	}
}

/// Every combination of totals across several options rolled side by side, counted without being built.
///
/// A combination is a tuple holding one total per option. There are as many tuples as the product of the options'
/// list lengths, so rather than storing them, counts are derived from each option's own tally: the tuples with some
/// property are all of them minus the ones where no option has it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JointOutcomes {
	/// Tally of each option's totals, in option order
	options: Vec<Tally>,

	/// Number of tuples
	len: u128,
}

impl JointOutcomes {
	/// Tallies each option's possible totals.
	///
	/// # Errors
	/// If the number of tuples doesn't fit in a [`u128`], [`Error::TooManyOutcomes`] is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::outcomes::{JointOutcomes, Limits};
	///
	/// let joint = JointOutcomes::new(&[vec![1_i64, 2], vec![5, 6, 7]], &Limits::default())?;
	/// assert_eq!(joint.len(), 6);
	/// assert_eq!(joint.count_containing(2), 3);
	/// assert_eq!(joint.count_containing(6), 2);
	/// # Ok::<(), rollstats::dice::Error>(())
	/// ```
	pub fn new<T: AsRef<[i64]>>(options: &[T], limits: &Limits) -> Result<Self, Error> {
		let options = options.iter().map(|totals| Tally::new(totals.as_ref())).collect::<Vec<_>>();
		let len = if options.is_empty() {
			0
		} else {
			options
				.iter()
				.try_fold(1_u128, |len, tally| len.checked_mul(tally.len))
				.ok_or(Error::TooManyOutcomes {
					outcomes: u128::MAX,
					limit: limits.max_outcomes,
				})?
		};

		debug!("counted {len} joint outcomes across {} options", options.len());
		Ok(Self { options, len })
	}

	/// Number of values in each tuple (the number of options).
	#[must_use]
	#[inline]
	pub fn arity(&self) -> usize {
		self.options.len()
	}

	/// Number of tuples.
	#[must_use]
	#[inline]
	pub const fn len(&self) -> u128 {
		self.len
	}

	/// Checks whether there are no tuples at all.
	#[must_use]
	#[inline]
	pub const fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Counts the tuples where at least one value satisfies the predicate.
	fn count_any(&self, pred: impl Fn(i64) -> bool) -> u128 {
		if self.is_empty() {
			return 0;
		}

		// Never more than len, so the product can't overflow
		let none = self.options.iter().map(|tally| tally.missing(&pred)).product::<u128>();
		self.len.saturating_sub(none)
	}

	/// Counts the tuples that contain the value in any position.
	#[must_use]
	pub fn count_containing(&self, val: i64) -> u128 {
		self.count_any(|total| total == val)
	}

	/// Counts the tuples where any value satisfies the target.
	///
	/// # Examples
	/// ```
	/// use rollstats::{outcomes::{JointOutcomes, Limits}, Target};
	///
	/// let d6 = vec![1_i64, 2, 3, 4, 5, 6];
	/// let joint = JointOutcomes::new(&[d6.clone(), d6], &Limits::default())?;
	/// assert_eq!(joint.count_matching(&Target::AtLeast(6)), 11);
	/// # Ok::<(), rollstats::dice::Error>(())
	/// ```
	#[must_use]
	pub fn count_matching(&self, target: &Target) -> u128 {
		self.count_any(|total| target.matches(total))
	}

	/// Counts, for every value that occurs, the number of tuples containing it. Same as calling
	/// [`Self::count_containing()`] for every value.
	#[must_use]
	pub fn value_counts(&self) -> BTreeMap<i64, u128> {
		let vals = self
			.options
			.iter()
			.flat_map(|tally| tally.counts.keys().copied())
			.collect::<BTreeSet<_>>();
		vals.into_iter()
			.map(|val| (val, self.count_containing(val)))
			.collect()
	}
}
