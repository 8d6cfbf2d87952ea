//! Data structures for full dice expressions (summed formulas, alternative options, and targets) and working with
//! their rolled results.

use std::fmt;

use crate::{
	dice::{Die, Error as DiceError, Rolled, Roller},
	outcomes::{self, JointOutcomes, Limits},
	target::Target,
};

/// Die terms summed together, such as `2d6+3`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Formula {
	/// Terms to add up, in the order they were written
	pub terms: Vec<Die>,
}

impl Formula {
	/// Creates a formula from its terms.
	#[must_use]
	#[inline]
	pub const fn new(terms: Vec<Die>) -> Self {
		Self { terms }
	}

	/// Lowest total the formula can produce.
	#[must_use]
	pub fn min(&self) -> i64 {
		self.terms.iter().map(Die::min).fold(0, i64::saturating_add)
	}

	/// Highest total the formula can produce.
	#[must_use]
	pub fn max(&self) -> i64 {
		self.terms.iter().map(Die::max).fold(0, i64::saturating_add)
	}

	/// Calculates the expected total of the formula.
	///
	/// # Errors
	/// If any term has no finite average, [`DiceError::DegenerateDie`] is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::{Die, Formula};
	///
	/// let formula = Formula::new(vec![Die::new(2, 6), Die::constant(3)]);
	/// assert_eq!(formula.avg()?, 10.0);
	/// # Ok::<(), rollstats::dice::Error>(())
	/// ```
	pub fn avg(&self) -> Result<f64, DiceError> {
		let mut sum = 0.0;
		for die in &self.terms {
			sum += die.avg()?;
		}
		Ok(sum)
	}

	/// Rolls every term of the formula once and totals the results.
	///
	/// # Errors
	/// If rolling any term fails, or there is an integer overflow while totalling, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::{dice::roller::Iter as IterRoller, Die, Formula};
	///
	/// let formula = Formula::new(vec![Die::new(2, 6), Die::constant(3)]);
	/// let rolled = formula.roll(&mut IterRoller::new(vec![4, 5]))?;
	/// assert_eq!(rolled.total, 12);
	/// # Ok::<(), rollstats::dice::Error>(())
	/// ```
	pub fn roll<'f>(&'f self, roller: &mut impl Roller) -> Result<RolledFormula<'f>, DiceError> {
		let rolls = self
			.terms
			.iter()
			.map(|die| roller.roll(die))
			.collect::<Result<Vec<_>, _>>()?;

		let mut total: i64 = 0;
		for rolled in &rolls {
			total = total
				.checked_add(rolled.total()?)
				.ok_or_else(|| DiceError::Overflow(rolled.die.clone().into_owned()))?;
		}

		Ok(RolledFormula { rolls, total })
	}

	/// Enumerates every total the formula can produce, one entry per way of rolling it.
	///
	/// # Errors
	/// If any term is degenerate or the enumeration would exceed the limits, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::{outcomes::Limits, Die, Formula};
	///
	/// let formula = Formula::new(vec![Die::new(1, 2), Die::new(1, 2), Die::constant(10)]);
	/// assert_eq!(formula.possible_totals(&Limits::default())?, vec![12, 13, 13, 14]);
	/// # Ok::<(), rollstats::dice::Error>(())
	/// ```
	pub fn possible_totals(&self, limits: &Limits) -> Result<Vec<i64>, DiceError> {
		let mut totals = vec![0];
		for die in &self.terms {
			totals = outcomes::combine_sums(&totals, &die.all_possible_rolls(limits)?, limits)?;
		}
		Ok(totals)
	}
}

impl fmt::Display for Formula {
	/// Formats the formula the way it is labelled in reports, e.g. `2d6 + 3`.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}",
			self.terms
				.iter()
				.map(ToString::to_string)
				.collect::<Vec<_>>()
				.join(" + ")
		)
	}
}

/// Representation of the result from rolling a [`Formula`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct RolledFormula<'a> {
	/// Rolled results of each term
	pub rolls: Vec<Rolled<'a>>,

	/// Sum of all the terms' totals
	pub total: i64,
}

impl RolledFormula<'_> {
	/// Moves all of self's owned data into a new instance and clones any unowned data in order to create a `'static`
	/// instance of self.
	#[must_use]
	pub fn into_owned(self) -> RolledFormula<'static> {
		RolledFormula {
			rolls: self.rolls.into_iter().map(Rolled::into_owned).collect(),
			total: self.total,
		}
	}
}

impl Describe for RolledFormula<'_> {
	/// Builds a string of every rolled term joined with ` + `. Individual faces are only listed when the formula has
	/// more than one term.
	///
	/// # Examples
	/// ```
	/// use rollstats::{dice::roller::Iter as IterRoller, expr::Describe, Die, Formula};
	///
	/// let formula = Formula::new(vec![Die::new(2, 6), Die::constant(3)]);
	/// let rolled = formula.roll(&mut IterRoller::new(vec![4, 5]))?;
	/// assert_eq!(rolled.describe(None), "2d6 (4, 5) + 3");
	///
	/// let formula = Formula::new(vec![Die::new(2, 6)]);
	/// let rolled = formula.roll(&mut IterRoller::new(vec![4, 5]))?;
	/// assert_eq!(rolled.describe(None), "2d6");
	/// # Ok::<(), rollstats::dice::Error>(())
	/// ```
	fn describe(&self, list_limit: Option<usize>) -> String {
		let show_faces = self.rolls.len() > 1;
		self.rolls
			.iter()
			.map(|rolled| {
				if show_faces {
					rolled.describe(list_limit)
				} else {
					rolled.die.to_string()
				}
			})
			.collect::<Vec<_>>()
			.join(" + ")
	}
}

impl fmt::Display for RolledFormula<'_> {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output is the description followed by ` = ` and the total, e.g. `2d6 (4, 5) + 3 = 12`.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} = {}", self.describe(None), self.total)
	}
}

/// One full dice expression: one or more alternative formulas (options), and optionally a target for them to meet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Attempt {
	/// Dice part of the expression as it was written (everything before the `/`)
	pub source: String,

	/// Alternative formulas, any of which may meet the target
	pub options: Vec<Formula>,

	/// Target the options' totals are tested against
	pub target: Option<Target>,
}

impl Attempt {
	/// Lowest total any option can produce.
	#[must_use]
	pub fn min(&self) -> i64 {
		self.options.iter().map(Formula::min).min().unwrap_or(0)
	}

	/// Highest total any option can produce.
	#[must_use]
	pub fn max(&self) -> i64 {
		self.options.iter().map(Formula::max).max().unwrap_or(0)
	}

	/// Name used to label the attempt's percentages: the source, followed by the target description if there is one.
	#[must_use]
	pub fn name(&self) -> String {
		match &self.target {
			Some(target) => format!("{} {target}", self.source),
			None => self.source.clone(),
		}
	}

	/// Enumerates each option's totals and counts every combination of them across the options.
	///
	/// # Errors
	/// If any term is degenerate or an option's enumeration would exceed the limits, an error variant is returned.
	pub fn joint_outcomes(&self, limits: &Limits) -> Result<JointOutcomes, DiceError> {
		let totals = self
			.options
			.iter()
			.map(|formula| formula.possible_totals(limits))
			.collect::<Result<Vec<_>, _>>()?;
		JointOutcomes::new(&totals, limits)
	}

	/// Rolls every option once.
	///
	/// # Errors
	/// If rolling any option fails, an error variant is returned.
	pub fn roll<'a>(&'a self, roller: &mut impl Roller) -> Result<Vec<RolledFormula<'a>>, DiceError> {
		self.options.iter().map(|formula| formula.roll(roller)).collect()
	}
}

/// Trait to allow creation of expanded descriptions with an optional max number of individual listed results where
/// applicable
pub trait Describe {
	/// Builds a detailed string with additional information about non-deterministic elements.
	/// Any elements that can have a different result between multiple rolls should list all of the specific
	/// individual results that occurred (ideally, up to `list_limit` of them).
	#[must_use]
	fn describe(&self, list_limit: Option<usize>) -> String;
}
