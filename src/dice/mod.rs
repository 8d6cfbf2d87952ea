//! All functionality for directly creating die terms, rolling them, and enumerating their possible totals.
//!
//! This is the home of the dice "primitives". For summing several terms together, see [`Formula`].
//!
//! [`Formula`]: crate::expr::Formula

pub mod roller;

use std::{borrow::Cow, fmt, iter};

pub use self::roller::Roller;
use crate::{expr::Describe, outcomes::Limits};

/// Number of sides on a percentile die (`d%`)
pub const PERCENTILE_SIDES: u32 = 100;

/// Maximum number of faces a single exploding die may chain together before rolling is abandoned.
/// Fair dice never get anywhere near this; it only guards against rigged rollers such as [`roller::Max`].
pub const MAX_EXPLOSIONS: usize = u16::MAX as usize;

/// Maximum number of dice a single term may roll at once
pub const MAX_ROLLED_DICE: u32 = 1_000_000;

/// A single term of a dice formula: either a fixed number or some dice to roll, optionally multiplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Die {
	/// Fixed value that is added as-is (e.g. `3`, `-2`)
	Constant(i32),

	/// Plain set of dice (e.g. `2d6`, `3*d8`)
	Standard {
		/// Value each die face is multiplied by
		multiplier: i32,

		/// Number of dice to roll
		count: u32,

		/// Number of sides for each die
		sides: u32,
	},

	/// Set of hundred-sided dice (e.g. `d%`, `2d%`)
	Percentile {
		/// Value each die face is multiplied by
		multiplier: i32,

		/// Number of dice to roll
		count: u32,
	},

	/// Single die that is rolled again and added whenever it shows its highest face (e.g. `d6!`, `d%!`)
	Exploding {
		/// Value the accumulated faces are multiplied by
		multiplier: i32,

		/// Number of sides of the die
		sides: u32,

		/// Whether the die was written as a percentile die
		percentile: bool,
	},
}

impl Die {
	/// Creates a constant term.
	#[must_use]
	#[inline]
	pub const fn constant(val: i32) -> Self {
		Self::Constant(val)
	}

	/// Creates a plain set of dice with a given count and number of sides.
	#[must_use]
	pub const fn new(count: u32, sides: u32) -> Self {
		Self::Standard {
			multiplier: 1,
			count,
			sides,
		}
	}

	/// Creates a single exploding die with the given number of sides.
	#[must_use]
	pub const fn new_exploding(sides: u32) -> Self {
		Self::Exploding {
			multiplier: 1,
			sides,
			percentile: false,
		}
	}

	/// Creates a new die builder.
	#[must_use]
	#[inline]
	pub fn builder() -> Builder {
		Builder::default()
	}

	/// Value that faces rolled for this term are multiplied by. Constants always report 1.
	#[must_use]
	pub const fn multiplier(&self) -> i32 {
		match self {
			Self::Constant(..) => 1,
			Self::Standard { multiplier, .. } | Self::Percentile { multiplier, .. } | Self::Exploding { multiplier, .. } => {
				*multiplier
			}
		}
	}

	/// Number of dice initially rolled for this term. Constants have none.
	#[must_use]
	pub const fn count(&self) -> u32 {
		match self {
			Self::Constant(..) => 0,
			Self::Standard { count, .. } | Self::Percentile { count, .. } => *count,
			Self::Exploding { .. } => 1,
		}
	}

	/// Number of sides per die. Constants have none.
	#[must_use]
	pub const fn sides(&self) -> u32 {
		match self {
			Self::Constant(..) => 0,
			Self::Standard { sides, .. } | Self::Exploding { sides, .. } => *sides,
			Self::Percentile { .. } => PERCENTILE_SIDES,
		}
	}

	/// Lowest total this term can produce.
	#[must_use]
	pub fn min(&self) -> i64 {
		self.bounds().0
	}

	/// Highest total this term can produce. For exploding dice, this is three maxed faces' worth (two explosions deep),
	/// not the unbounded theoretical maximum.
	#[must_use]
	pub fn max(&self) -> i64 {
		self.bounds().1
	}

	/// Calculates the expected total of this term.
	///
	/// # Errors
	/// An exploding die with fewer than two sides has no finite average, so [`Error::DegenerateDie`] is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::Die;
	///
	/// assert_eq!(Die::new(2, 6).avg()?, 7.0);
	/// assert!((Die::new_exploding(6).avg()? - 4.2).abs() < 1e-9);
	/// assert!(Die::new_exploding(1).avg().is_err());
	/// # Ok::<(), rollstats::dice::Error>(())
	/// ```
	pub fn avg(&self) -> Result<f64, Error> {
		let multiplier = f64::from(self.multiplier());
		let sides = f64::from(self.sides());

		Ok(match self {
			Self::Constant(val) => f64::from(*val),
			Self::Standard { .. } | Self::Percentile { .. } => multiplier * f64::from(self.count()) * (sides + 1.0) / 2.0,
			Self::Exploding { sides: ..=1, .. } => {
				return Err(Error::DegenerateDie(self.clone(), "an exploding die needs at least two sides"));
			}
			Self::Exploding { .. } => multiplier * (sides + 1.0) / 2.0 * sides / (sides - 1.0),
		})
	}

	/// Checks that the term describes dice that can actually be rolled.
	///
	/// # Errors
	/// If the dice have no sides, no dice are rolled at all, or an exploding die has a single side (and would explode
	/// forever), [`Error::DegenerateDie`] is returned.
	pub fn validate(&self) -> Result<(), Error> {
		match self {
			Self::Standard { sides: 0, .. } => Err(Error::DegenerateDie(self.clone(), "dice need at least one side")),
			Self::Standard { count: 0, .. } | Self::Percentile { count: 0, .. } => {
				Err(Error::DegenerateDie(self.clone(), "at least one die must be rolled"))
			}
			Self::Exploding { sides: ..=1, .. } => {
				Err(Error::DegenerateDie(self.clone(), "an exploding die needs at least two sides"))
			}
			Self::Constant(..) | Self::Standard { .. } | Self::Percentile { .. } | Self::Exploding { .. } => Ok(()),
		}
	}

	/// Enumerates every total this term can produce, one entry per way of rolling it. The list is not deduplicated,
	/// so each total appears as many times as there are rolls that produce it.
	///
	/// A constant of zero yields an empty list, which combining treats as "no change".
	///
	/// Exploding dice use a fixed approximation that stops after two explosions, weighted over `sides³` outcomes:
	/// each non-max face `sides²` times, each once-exploded total `sides` times, and each twice-exploded total once.
	/// Only the last face of an exploded total is multiplied, so with a multiplier other than 1 these totals differ
	/// from the ones rolling produces, which multiplies every face.
	///
	/// # Errors
	/// If the die is degenerate, [`Error::DegenerateDie`] is returned. If the list would be longer than the given
	/// limits allow, [`Error::TooManyOutcomes`] is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::{outcomes::Limits, Die};
	///
	/// let mut rolls = Die::new(2, 4).all_possible_rolls(&Limits::default())?;
	/// rolls.sort_unstable();
	/// assert_eq!(rolls, vec![2, 3, 3, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 7, 7, 8]);
	/// # Ok::<(), rollstats::dice::Error>(())
	/// ```
	pub fn all_possible_rolls(&self, limits: &Limits) -> Result<Vec<i64>, Error> {
		self.validate()?;
		let multiplier = i64::from(self.multiplier());

		match self {
			Self::Constant(0) => Ok(Vec::new()),
			Self::Constant(val) => Ok(vec![i64::from(*val)]),

			Self::Standard { .. } | Self::Percentile { .. } => {
				let (count, sides) = (self.count(), self.sides());
				if sides == 1 {
					return Ok(vec![multiplier.saturating_mul(i64::from(count))]);
				}

				limits.check(u128::from(sides).checked_pow(count).unwrap_or(u128::MAX))?;
				let faces = (1..=i64::from(sides))
					.map(|face| multiplier.saturating_mul(face))
					.collect::<Vec<_>>();
				Ok(face_sums(&faces, count))
			}

			Self::Exploding { sides, .. } => {
				limits.check(u128::from(*sides).pow(3))?;
				let copies = usize::try_from(*sides).unwrap_or(usize::MAX);
				let sides = i64::from(*sides);
				let scaled = |face: i64| multiplier.saturating_mul(face);

				let mut rolls = Vec::with_capacity(copies.saturating_pow(3));
				for face in 1..sides {
					rolls.extend(iter::repeat(scaled(face)).take(copies.saturating_mul(copies)));
				}
				for face in 1..sides {
					rolls.extend(iter::repeat(sides.saturating_add(scaled(face))).take(copies));
				}
				rolls.extend((1..=sides).map(|face| sides.saturating_mul(2).saturating_add(scaled(face))));
				Ok(rolls)
			}
		}
	}

	/// Lowest and highest totals, ordered correctly even when the multiplier is negative.
	fn bounds(&self) -> (i64, i64) {
		let multiplier = i64::from(self.multiplier());
		let sides = i64::from(self.sides());

		let (first, second) = match self {
			Self::Constant(val) => (i64::from(*val), i64::from(*val)),
			Self::Standard { .. } | Self::Percentile { .. } => {
				let low = multiplier.saturating_mul(i64::from(self.count()));
				(low, low.saturating_mul(sides))
			}
			Self::Exploding { .. } => (multiplier, multiplier.saturating_mul(sides).saturating_mul(3)),
		};

		(first.min(second), first.max(second))
	}
}

impl Default for Die {
	/// Creates the default die (d20).
	#[inline]
	fn default() -> Self {
		Self::new(1, 20)
	}
}

impl fmt::Display for Die {
	/// Formats the term the way it is labelled in reports: `3`, `d6`, `2d6`, `d%`, `d6!`, with a `N × ` prefix when the
	/// multiplier isn't 1.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let multiplier = match self {
			Self::Constant(val) => return write!(f, "{val}"),
			Self::Standard { .. } | Self::Percentile { .. } | Self::Exploding { .. } => self.multiplier(),
		};

		if multiplier != 1 {
			write!(f, "{multiplier} × ")?;
		}

		match self {
			Self::Constant(..) => Ok(()),
			Self::Standard { count: 1, sides, .. } => write!(f, "d{sides}"),
			Self::Standard { count, sides, .. } => write!(f, "{count}d{sides}"),
			Self::Percentile { count: 1, .. } => write!(f, "d%"),
			Self::Percentile { count, .. } => write!(f, "{count}d%"),
			Self::Exploding { percentile: true, .. } => write!(f, "d%!"),
			Self::Exploding { sides, .. } => write!(f, "d{sides}!"),
		}
	}
}

/// Builds every sum of `count` picks from `faces`, keeping duplicates.
fn face_sums(faces: &[i64], count: u32) -> Vec<i64> {
	if count <= 1 {
		return faces.to_vec();
	}

	face_sums(faces, count - 1)
		.iter()
		.flat_map(|sum| faces.iter().map(move |face| sum.saturating_add(*face)))
		.collect()
}

/// Representation of the result from rolling a [`Die`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Rolled<'a> {
	/// Each individual face that was rolled, in order (explosions included)
	pub faces: Vec<u32>,

	/// Die term that was rolled to produce this
	pub die: Cow<'a, Die>,
}

impl Rolled<'_> {
	/// Calculates the total of the roll: the constant's value, or the sum of all faces times the multiplier.
	///
	/// # Errors
	/// If there is an integer overflow while totalling the faces, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use rollstats::dice::{roller::{Iter as IterRoller, Roller}, Die};
	///
	/// let die = Die::builder().count(3).sides(6).multiplier(2).build();
	/// let rolled = IterRoller::new(vec![1, 5, 6]).roll(&die)?;
	/// assert_eq!(rolled.total()?, 24);
	/// # Ok::<(), rollstats::dice::Error>(())
	/// ```
	pub fn total(&self) -> Result<i64, Error> {
		if let Die::Constant(val) = self.die.as_ref() {
			return Ok(i64::from(*val));
		}

		let mut sum: i64 = 0;
		for face in &self.faces {
			sum = sum
				.checked_add(i64::from(*face))
				.ok_or_else(|| Error::Overflow(self.die.clone().into_owned()))?;
		}

		sum.checked_mul(i64::from(self.die.multiplier()))
			.ok_or_else(|| Error::Overflow(self.die.clone().into_owned()))
	}

	/// Moves all of self's owned data into a new instance and clones any unowned data in order to create a `'static`
	/// instance of self.
	#[must_use]
	pub fn into_owned(self) -> Rolled<'static> {
		Rolled {
			faces: self.faces,
			die: Cow::Owned(self.die.into_owned()),
		}
	}

	/// Creates a new rolled die term from a given term and an iterator of faces.
	#[must_use]
	pub fn from_die_and_faces(die: &Die, faces: impl IntoIterator<Item = u32>) -> Rolled {
		Rolled {
			faces: faces.into_iter().collect(),
			die: Cow::Borrowed(die),
		}
	}
}

impl Describe for Rolled<'_> {
	/// Builds a string of the term the roll is from and a list of all of the individual faces. Faces that caused an
	/// exploding die to explode are marked with `!`.
	///
	/// If `list_limit` is specified and there are more faces than it, the list is truncated and appended with
	/// "X more..." (where X is the remaining face count past the max).
	///
	/// # Examples
	/// ```
	/// use rollstats::{dice::{Die, Rolled}, expr::Describe};
	///
	/// let die = Die::new(4, 6);
	/// let rolled = Rolled::from_die_and_faces(&die, [6, 2, 5, 3]);
	/// assert_eq!(rolled.describe(None), "4d6 (6, 2, 5, 3)");
	/// assert_eq!(rolled.describe(Some(2)), "4d6 (6, 2, 2 more...)");
	///
	/// let die = Die::new_exploding(6);
	/// let rolled = Rolled::from_die_and_faces(&die, [6, 6, 1]);
	/// assert_eq!(rolled.describe(None), "d6! (6!, 6!, 1)");
	/// ```
	fn describe(&self, list_limit: Option<usize>) -> String {
		if self.faces.is_empty() {
			return self.die.to_string();
		}

		let list_limit = list_limit.unwrap_or(usize::MAX);
		let truncated_faces = self.faces.len().saturating_sub(list_limit);
		let explodes_on = match self.die.as_ref() {
			Die::Exploding { sides, .. } => Some(*sides),
			Die::Constant(..) | Die::Standard { .. } | Die::Percentile { .. } => None,
		};

		format!(
			"{} ({}{})",
			self.die,
			self.faces
				.iter()
				.take(list_limit)
				.map(|face| if explodes_on == Some(*face) {
					format!("{face}!")
				} else {
					face.to_string()
				})
				.collect::<Vec<_>>()
				.join(", "),
			if truncated_faces > 0 {
				format!(", {truncated_faces} more...")
			} else {
				String::new()
			}
		)
	}
}

impl fmt::Display for Rolled<'_> {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output is equivalent to calling [`Self::describe(None)`].
	///
	/// [`Self::describe(None)`]: Self::describe()
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.describe(None))
	}
}

/// An error resulting from a dice operation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// The term can't be rolled or averaged meaningfully.
	///
	/// # Examples
	/// ```
	/// use rollstats::dice::{Die, Error};
	///
	/// assert!(matches!(Die::new(0, 6).validate(), Err(Error::DegenerateDie(..))));
	/// ```
	#[error("{0} is degenerate: {1}")]
	DegenerateDie(Die, &'static str),

	/// Rolling the term would never finish.
	///
	/// # Examples
	/// ```
	/// use rollstats::dice::{roller::{Max as MaxRoller, Roller}, Die, Error};
	///
	/// let die = Die::new_exploding(6);
	/// assert!(matches!(MaxRoller.roll(&die), Err(Error::InfiniteRolls(..))));
	/// ```
	#[error("{0} would result in infinite rolls")]
	InfiniteRolls(Die),

	/// The term has more dice than [`MAX_ROLLED_DICE`] to roll at once.
	///
	/// # Examples
	/// ```
	/// use rollstats::dice::{roller::{Roller, Val as ValRoller}, Die, Error};
	///
	/// let die = Die::new(4_000_000_000, 6);
	/// assert!(matches!(ValRoller(1).roll(&die), Err(Error::TooManyDice(..))));
	/// ```
	#[error("{0} has too many dice to roll at once")]
	TooManyDice(Die),

	/// There was an integer overflow when totalling roll values.
	#[error("integer overflow while totalling {0}")]
	Overflow(Die),

	/// Enumerating every possible outcome would produce more entries than allowed.
	///
	/// # Examples
	/// ```
	/// use rollstats::{dice::{Die, Error}, outcomes::Limits};
	///
	/// let result = Die::new(20, 6).all_possible_rolls(&Limits::default());
	/// assert!(matches!(result, Err(Error::TooManyOutcomes { .. })));
	/// ```
	#[error("enumerating {outcomes} outcomes exceeds the limit of {limit}")]
	TooManyOutcomes {
		/// Number of outcomes the enumeration would have produced (saturated at [`u128::MAX`])
		outcomes: u128,

		/// Configured maximum
		limit: usize,
	},
}

/// Sides of the dice being built by a [`Builder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sides {
	/// Regular die with the given number of sides
	Num(u32),

	/// Percentile die
	Percent,
}

/// Builds a [`Die`] with a fluent interface.
///
/// # Examples
///
/// ## Basic dice
/// ```
/// use rollstats::Die;
///
/// let die = Die::builder().count(2).sides(6).build();
/// assert_eq!(die, Die::new(2, 6));
/// ```
///
/// ## Multiplied exploding die
/// ```
/// use rollstats::Die;
///
/// let die = Die::builder().sides(8).multiplier(3).explode().build();
/// assert_eq!(
/// 	die,
/// 	Die::Exploding {
/// 		multiplier: 3,
/// 		sides: 8,
/// 		percentile: false,
/// 	},
/// );
/// ```
///
/// ## Percentile dice
/// ```
/// use rollstats::Die;
///
/// let die = Die::builder().count(2).percentile().build();
/// assert_eq!(die.to_string(), "2d%");
/// assert_eq!(die.sides(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
	/// Multiplier applied to rolled faces
	multiplier: i32,

	/// Number of dice, if explicitly given
	count: Option<u32>,

	/// Sides of the dice
	sides: Sides,

	/// Whether the die explodes
	explode: bool,
}

impl Default for Builder {
	fn default() -> Self {
		Self {
			multiplier: 1,
			count: None,
			sides: Sides::Num(20),
			explode: false,
		}
	}
}

impl Builder {
	/// Sets the number of dice to roll. Exploding dice are always rolled one at a time and ignore this.
	#[must_use]
	pub const fn count(mut self, count: u32) -> Self {
		self.count = Some(count);
		self
	}

	/// Sets the number of sides per die.
	#[must_use]
	pub const fn sides(mut self, sides: u32) -> Self {
		self.sides = Sides::Num(sides);
		self
	}

	/// Makes the dice percentile dice.
	#[must_use]
	pub const fn percentile(mut self) -> Self {
		self.sides = Sides::Percent;
		self
	}

	/// Sets the value faces are multiplied by.
	#[must_use]
	pub const fn multiplier(mut self, multiplier: i32) -> Self {
		self.multiplier = multiplier;
		self
	}

	/// Makes the die explode on its highest face.
	#[must_use]
	pub const fn explode(mut self) -> Self {
		self.explode = true;
		self
	}

	/// Finalizes the die.
	#[must_use]
	pub fn build(self) -> Die {
		let multiplier = self.multiplier;
		let count = self.count.unwrap_or(1);

		match (self.sides, self.explode) {
			(Sides::Num(sides), false) => Die::Standard {
				multiplier,
				count,
				sides,
			},
			(Sides::Percent, false) => Die::Percentile { multiplier, count },
			(Sides::Num(sides), true) => Die::Exploding {
				multiplier,
				sides,
				percentile: false,
			},
			(Sides::Percent, true) => Die::Exploding {
				multiplier,
				sides: PERCENTILE_SIDES,
				percentile: true,
			},
		}
	}
}
