//! Abstractions for rolling [`Die`] terms using various means.

use std::{borrow::Cow, iter, iter::Peekable};

#[cfg(feature = "fastrand")]
use fastrand::Rng;
use log::trace;

use super::{Die, Error, Rolled, MAX_EXPLOSIONS, MAX_ROLLED_DICE};

/// Rolls dice - what else is there to say?
pub trait Roller {
	/// Rolls a single die, returning a face in `1..=sides`.
	#[must_use]
	fn roll_die(&mut self, sides: u32) -> u32;

	/// Rolls a die term. Constants roll nothing, plain and percentile dice roll each die once, and exploding dice keep
	/// rolling for as long as they show their highest face.
	///
	/// # Errors
	/// If an exploding die has fewer than two sides, or keeps exploding past [`MAX_EXPLOSIONS`] faces,
	/// [`Error::InfiniteRolls`] is returned. If the term has more than [`MAX_ROLLED_DICE`] dice,
	/// [`Error::TooManyDice`] is returned.
	fn roll<'d>(&mut self, die: &'d Die) -> Result<Rolled<'d>, Error>
	where
		Self: Sized,
	{
		let faces = match die {
			Die::Constant(..) => Vec::new(),

			Die::Standard { .. } | Die::Percentile { .. } => {
				if die.count() > MAX_ROLLED_DICE {
					return Err(Error::TooManyDice(die.clone()));
				}

				let sides = die.sides();
				iter::repeat_with(|| self.roll_die(sides))
					.take(usize::try_from(die.count()).unwrap_or(0))
					.collect()
			}

			Die::Exploding { sides, .. } => {
				// A one-sided die always shows its highest face
				if *sides < 2 {
					return Err(Error::InfiniteRolls(die.clone()));
				}

				let mut faces = Vec::new();
				loop {
					let face = self.roll_die(*sides);
					faces.push(face);
					if face < *sides {
						break faces;
					}
					if faces.len() >= MAX_EXPLOSIONS {
						return Err(Error::InfiniteRolls(die.clone()));
					}
				}
			}
		};

		trace!("rolled {die}: {faces:?}");
		Ok(Rolled {
			faces,
			die: Cow::Borrowed(die),
		})
	}
}

/// Generates rolls with random values using [fastrand]. Requires the `fastrand` feature (enabled by default).
///
/// # Examples
///
/// ## Default fastrand roller
/// ```
/// use rollstats::dice::{roller::{FastRand as FastRandRoller, Roller}, Die};
///
/// let mut roller = FastRandRoller::default();
///
/// let die = Die::new(4, 6);
/// let _ = roller.roll(&die)?;
/// let _ = roller.roll(&die)?;
/// # Ok::<(), rollstats::dice::Error>(())
/// ```
///
/// ## Manually seeded fastrand roller
/// ```
/// use rollstats::dice::{roller::{FastRand as FastRandRoller, Roller}, Die};
///
/// let mut first = FastRandRoller::with_seed(0x750c38d574400);
/// let mut second = FastRandRoller::with_seed(0x750c38d574400);
///
/// let die = Die::new(4, 6);
/// assert_eq!(first.roll(&die)?, second.roll(&die)?);
/// # Ok::<(), rollstats::dice::Error>(())
/// ```
#[cfg(feature = "fastrand")]
#[derive(Debug, Clone, Default)]
pub struct FastRand(Rng);

#[cfg(feature = "fastrand")]
impl FastRand {
	/// Creates a new fastrand roller that uses the given RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub const fn new(rng: Rng) -> Self {
		Self(rng)
	}

	/// Creates a new fastrand roller that uses a pre-seeded RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub fn with_seed(seed: u64) -> Self {
		Self(Rng::with_seed(seed))
	}
}

#[cfg(feature = "fastrand")]
impl Roller for FastRand {
	/// Rolls a single die using the [`fastrand::Rng`] the roller was created with.
	#[inline]
	fn roll_die(&mut self, sides: u32) -> u32 {
		if sides > 0 {
			self.0.u32(1..=sides)
		} else {
			0
		}
	}
}

/// Generates rolls that always have a specific value.
///
/// # Examples
/// ```
/// use rollstats::dice::{roller::{Roller, Val as ValRoller}, Die};
///
/// let mut roller = ValRoller(3);
///
/// let die = Die::new(4, 6);
/// let rolled = roller.roll(&die)?;
/// assert!(rolled.faces.iter().all(|face| *face == 3));
/// assert_eq!(rolled.total()?, 12);
/// # Ok::<(), rollstats::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Val(pub u32);

impl Roller for Val {
	/// Rolls a single die, always with one specific value.
	#[inline]
	fn roll_die(&mut self, _sides: u32) -> u32 {
		self.0
	}
}

/// Generates rolls that always have their max value.
///
/// # Examples
/// ```
/// use rollstats::dice::{roller::{Max as MaxRoller, Roller}, Die};
///
/// let mut roller = MaxRoller;
///
/// let die = Die::new(4, 6);
/// let rolled = roller.roll(&die)?;
/// assert!(rolled.faces.iter().all(|face| *face == 6));
///
/// let die = Die::builder().count(2).percentile().build();
/// let rolled = roller.roll(&die)?;
/// assert!(rolled.faces.iter().all(|face| *face == 100));
/// # Ok::<(), rollstats::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Max;

impl Roller for Max {
	/// Rolls a single die, always with the max value (same as the number of sides).
	#[inline]
	fn roll_die(&mut self, sides: u32) -> u32 {
		sides
	}
}

/// Generates rolls from an iterator of values. Mainly useful for testing purposes.
///
/// # Examples
/// ```
/// use rollstats::dice::{roller::{Iter as IterRoller, Roller}, Die};
///
/// let mut roller = IterRoller::new(vec![6, 6, 2, 4]);
/// assert_eq!(roller.roll(&Die::new_exploding(6))?.faces, vec![6, 6, 2]);
/// assert_eq!(roller.roll(&Die::new(1, 6))?.faces, vec![4]);
/// assert!(!roller.can_roll());
/// # Ok::<(), rollstats::dice::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Iter<I: Iterator<Item = u32>>(Peekable<I>);

impl<I: Iterator<Item = u32>> Iter<I> {
	/// Checks whether the iterator still has values available.
	#[inline]
	pub fn can_roll(&mut self) -> bool {
		self.0.peek().is_some()
	}

	/// Creates a new roller that uses the given iterator to provide roll values.
	#[must_use]
	#[inline]
	pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
		Self(iter.into_iter().peekable())
	}
}

impl<I: Iterator<Item = u32>> Roller for Iter<I> {
	/// Rolls a die with the value from the next iteration.
	///
	/// # Panics
	/// If the iterator has finished, this will panic.
	#[inline]
	#[expect(
		clippy::expect_used,
		reason = "Mostly for testing, otherwise manual checking of can_roll() is expected"
	)]
	fn roll_die(&mut self, _sides: u32) -> u32 {
		self.0.next().expect("iterator is finished")
	}
}
