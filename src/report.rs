//! Aggregation of parsed attempts into everything worth reporting about them: stats for each formula, exact
//! percentage tables, the realized rolls, and whether the targets were met.

use std::fmt;

use log::debug;

use crate::{
	dice::{Error as DiceError, Roller},
	expr::{Attempt, Formula, RolledFormula},
	outcomes::{JointOutcomes, Limits},
	target::Target,
};

/// Settings for building a [`Report`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Plain settings bag")]
pub struct Options {
	/// Whether to enumerate every outcome to build percentage tables and target chances
	pub percentages: bool,

	/// Bounds on the enumeration
	pub limits: Limits,
}

impl Default for Options {
	#[inline]
	fn default() -> Self {
		Self {
			percentages: true,
			limits: Limits::default(),
		}
	}
}

/// Range and expected value of a single formula
#[derive(Debug, Clone, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Stats {
	/// Formula as it is labelled, e.g. `2d6 + 3`
	pub header: String,

	/// Lowest possible total
	pub min: i64,

	/// Highest possible total
	pub max: i64,

	/// Expected total
	pub avg: f64,
}

impl Stats {
	/// Calculates the stats of a formula.
	///
	/// # Errors
	/// If any term of the formula has no finite average, [`DiceError::DegenerateDie`] is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::{report::Stats, Die, Formula};
	///
	/// let stats = Stats::of(&Formula::new(vec![Die::new(2, 6), Die::constant(3)]))?;
	/// assert_eq!(stats.header, "2d6 + 3");
	/// assert_eq!((stats.min, stats.max, stats.avg), (5, 15, 10.0));
	/// # Ok::<(), rollstats::dice::Error>(())
	/// ```
	pub fn of(formula: &Formula) -> Result<Self, DiceError> {
		Ok(Self {
			header: formula.to_string(),
			min: formula.min(),
			max: formula.max(),
			avg: formula.avg()?,
		})
	}
}

/// Portion of all outcomes that meet some condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Share {
	/// Number of outcomes meeting the condition
	pub count: u128,

	/// Number of outcomes overall
	pub total: u128,
}

impl Share {
	/// Fraction of outcomes meeting the condition. A share of nothing is `0.0`.
	#[must_use]
	#[expect(clippy::cast_precision_loss, reason = "Only used for display and chance products")]
	pub fn ratio(&self) -> f64 {
		if self.total == 0 {
			0.0
		} else {
			self.count as f64 / self.total as f64
		}
	}

	/// Percentage of outcomes meeting the condition, rounded to one decimal place.
	#[must_use]
	pub fn percent(&self) -> f64 {
		percent(self.count, self.total)
	}
}

impl fmt::Display for Share {
	/// Formats the share as `count of total (percent%)`, e.g. `3 of 6 (50.0%)`.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} of {} ({:.1}%)", self.count, self.total, self.percent())
	}
}

/// One line of a percentage table: how many outcomes contain a specific value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Row {
	/// Value being counted
	pub val: i64,

	/// Outcomes containing the value
	pub share: Share,
}

/// Exact chances of every value an attempt can produce, and of meeting its target
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Percentages {
	/// Attempt source followed by its target description, if any
	pub name: String,

	/// One row per value from the attempt's lowest to highest possible total
	pub rows: Vec<Row>,

	/// Target and the outcomes meeting it
	pub target: Option<(Target, Share)>,
}

impl Percentages {
	/// Enumerates every outcome of an attempt to build its percentage table.
	///
	/// # Errors
	/// If the enumeration (or the table itself) would be larger than the limits allow, or any term is degenerate, an
	/// error variant is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::{outcomes::Limits, report::Percentages, Attempt, Target};
	///
	/// let attempt: Attempt = "d6/3-5".parse()?;
	/// let percentages = Percentages::enumerate(&attempt, &Limits::default())?;
	/// assert_eq!(percentages.name, "d6 3<=...<=5");
	/// assert_eq!(percentages.rows.len(), 6);
	///
	/// let (target, share) = percentages.target.unwrap();
	/// assert_eq!(target, Target::Range(3, 5));
	/// assert_eq!((share.count, share.total, share.percent()), (3, 6, 50.0));
	/// # Ok::<(), Box<dyn std::error::Error>>(())
	/// ```
	pub fn enumerate(attempt: &Attempt, limits: &Limits) -> Result<Self, DiceError> {
		let joint = attempt.joint_outcomes(limits)?;
		Self::from_joint(attempt, &joint, limits)
	}

	/// Builds the percentage table of an attempt from its already enumerated outcomes.
	///
	/// # Errors
	/// If the table would have more rows than the limits allow, [`DiceError::TooManyOutcomes`] is returned.
	pub fn from_joint(attempt: &Attempt, joint: &JointOutcomes, limits: &Limits) -> Result<Self, DiceError> {
		let total = joint.len();
		let counts = joint.value_counts();

		// Multiplied exploding dice can enumerate totals outside of their stated bounds
		let min = counts.keys().next().map_or(attempt.min(), |low| attempt.min().min(*low));
		let max = counts.keys().next_back().map_or(attempt.max(), |high| attempt.max().max(*high));
		let width = i128::from(max).saturating_sub(i128::from(min)).saturating_add(1);
		limits.check(u128::try_from(width).unwrap_or(0))?;
		let rows = (min..=max)
			.map(|val| Row {
				val,
				share: Share {
					count: counts.get(&val).copied().unwrap_or(0),
					total,
				},
			})
			.collect();

		let target = attempt.target.map(|target| {
			(target, Share {
				count: joint.count_matching(&target),
				total,
			})
		});

		Ok(Self {
			name: attempt.name(),
			rows,
			target,
		})
	}
}

/// Realized rolls of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Rolls<'a> {
	/// Attempt without a target, one rolled formula per option
	Plain(Vec<RolledFormula<'a>>),

	/// Attempt with a target, tested against its rolled options
	Target {
		/// Attempt source
		name: &'a str,

		/// Target the rolls were tested against
		target: Target,

		/// One rolled formula per option
		rolls: Vec<RolledFormula<'a>>,

		/// Whether any option's total met the target
		succeeded: bool,
	},
}

impl<'a> Rolls<'a> {
	/// Rolled formulas, one per option.
	#[must_use]
	pub fn rolls(&self) -> &[RolledFormula<'a>] {
		match self {
			Self::Plain(rolls) | Self::Target { rolls, .. } => rolls,
		}
	}
}

/// Rollup of every attempt that had a target
#[derive(Debug, Clone, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Success {
	/// Number of attempts with a target
	pub targets: usize,

	/// Whether every realized target roll succeeded
	pub succeeded: bool,

	/// Chance of each targeted attempt meeting its target, if percentages were calculated
	pub chances: Option<Vec<f64>>,
}

impl Success {
	/// Chance of every targeted attempt meeting its target, if percentages were calculated.
	#[must_use]
	pub fn chance(&self) -> Option<f64> {
		self.chances.as_ref().map(|chances| chances.iter().product())
	}

	/// [`Self::chance()`] as a percentage rounded to one decimal place.
	#[must_use]
	pub fn percent(&self) -> Option<f64> {
		self.chance()
			.map(|chance| (chance * 1000.0).round_ties_even() / 10.0)
	}
}

impl Default for Success {
	fn default() -> Self {
		Self {
			targets: 0,
			succeeded: true,
			chances: None,
		}
	}
}

/// Everything known about a set of attempts after enumerating and rolling them
#[derive(Debug, Clone, PartialEq)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Report<'a> {
	/// Stats of every distinct formula, in the order first encountered
	pub stats: Vec<Stats>,

	/// Percentage tables of every distinctly named attempt, in the order first encountered (empty if percentages
	/// weren't requested)
	pub percentages: Vec<Percentages>,

	/// Realized rolls, one entry per attempt
	pub rolls: Vec<Rolls<'a>>,

	/// Rollup of the targeted attempts
	pub success: Success,
}

impl<'a> Report<'a> {
	/// Builds a report for some attempts. Every attempt is enumerated before anything is rolled, so an enumeration
	/// failure never consumes any rolls.
	///
	/// # Errors
	/// If enumerating or rolling any attempt fails, an error variant is returned naming the attempt.
	///
	/// # Examples
	/// ```
	/// use rollstats::{dice::roller::Iter as IterRoller, parse, report::Options, Report};
	///
	/// let attempts = parse::attempts(["2d6+3", "d20/15", "d20,d20/>=15"]).unwrap();
	/// let mut roller = IterRoller::new(vec![4, 5, 17, 3, 9]);
	/// let report = Report::build(&attempts, &mut roller, &Options::default())?;
	///
	/// assert_eq!(report.stats.len(), 2);
	/// assert_eq!(report.rolls[0].rolls()[0].total, 12);
	/// assert!(!report.success.succeeded);
	/// assert_eq!(report.total_success().and_then(|success| success.percent()), Some(15.3));
	/// # Ok::<(), rollstats::report::Error>(())
	/// ```
	pub fn build(attempts: &'a [Attempt], roller: &mut impl Roller, options: &Options) -> Result<Self, Error> {
		let mut stats: Vec<Stats> = Vec::new();
		let mut percentages: Vec<Percentages> = Vec::new();
		let mut chances = Vec::new();

		for attempt in attempts {
			let wrap = |source| Error::Dice {
				attempt: attempt.source.clone(),
				source,
			};

			for formula in &attempt.options {
				let formula_stats = Stats::of(formula).map_err(wrap)?;
				if !stats.iter().any(|existing| existing.header == formula_stats.header) {
					stats.push(formula_stats);
				}
			}

			if options.percentages {
				let table = Percentages::enumerate(attempt, &options.limits).map_err(wrap)?;
				if let Some((_, share)) = table.target {
					chances.push(share.ratio());
				}
				debug!("{}: {} percentage rows", table.name, table.rows.len());
				if !percentages.iter().any(|existing| existing.name == table.name) {
					percentages.push(table);
				}
			}
		}

		let mut rolls = Vec::with_capacity(attempts.len());
		let mut success = Success {
			chances: options.percentages.then_some(chances),
			..Success::default()
		};
		for attempt in attempts {
			let rolled = attempt.roll(roller).map_err(|source| Error::Dice {
				attempt: attempt.source.clone(),
				source,
			})?;

			rolls.push(match attempt.target {
				Some(target) => {
					let succeeded = target.matches_any(rolled.iter().map(|formula| formula.total));
					debug!("{}: target {target} {}", attempt.source, if succeeded { "met" } else { "missed" });
					success.targets += 1;
					success.succeeded &= succeeded;
					Rolls::Target {
						name: &attempt.source,
						target,
						rolls: rolled,
						succeeded,
					}
				}
				None => Rolls::Plain(rolled),
			});
		}

		Ok(Self {
			stats,
			percentages,
			rolls,
			success,
		})
	}

	/// Rollup of the targeted attempts, only when there is more than one of them to roll up.
	#[must_use]
	pub fn total_success(&self) -> Option<&Success> {
		(self.success.targets > 1).then_some(&self.success)
	}
}

/// Calculates `count` as a percentage of `total`, rounded to one decimal place with ties going to the even digit.
/// A total of zero gives `0.0`.
///
/// # Examples
/// ```
/// use rollstats::report::percent;
///
/// assert_eq!(percent(3, 6), 50.0);
/// assert_eq!(percent(1, 3), 33.3);
/// assert_eq!(percent(1, 16), 6.2);
/// assert_eq!(percent(3, 16), 18.8);
/// assert_eq!(percent(1, 0), 0.0);
/// ```
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "Tenths of a percent are far below f64's precision")]
pub fn percent(count: u128, total: u128) -> f64 {
	if total == 0 {
		return 0.0;
	}

	// Totals too large to scale by 1000 lose low bits first, which a tenth of a percent can't show anyway
	let shift = 10_u32.saturating_sub(total.leading_zeros());
	let (num, den) = ((count >> shift).saturating_mul(1000), (total >> shift).max(1));
	let (mut tenths, rem) = (num / den, num % den);
	if rem.saturating_mul(2) > den || (rem.saturating_mul(2) == den && tenths % 2 == 1) {
		tenths = tenths.saturating_add(1);
	}
	tenths as f64 / 10.0
}

/// An error resulting from building a [`Report`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// An attempt's dice couldn't be enumerated or rolled.
	#[error("unable to evaluate `{attempt}`")]
	Dice {
		/// Source of the attempt that failed
		attempt: String,

		/// Problem with its dice
		#[source]
		source: DiceError,
	},
}
