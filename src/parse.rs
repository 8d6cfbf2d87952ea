//! Parsers for dice notation like `2d6+3`, `3*d8!`, and `d20,d20/>=15`, built with [chumsky].

#![cfg(feature = "parse")]

use std::{fmt, ops::Range, str::FromStr};

use chumsky::prelude::*;
use log::debug;

use crate::{
	dice::{Die, Error as DiceError},
	expr::{Attempt, Formula},
	target::Target,
};

/// Extra parser state used by every parser in this module
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Generates a parser for an unsigned decimal number, labelling any conversion failure with `what`.
fn unsigned<'src, T>(what: &'static str) -> impl Parser<'src, &'src str, T, Extra<'src>> + Clone
where
	T: FromStr,
	T::Err: fmt::Display,
{
	text::int::<&'src str, _, _>(10).try_map(move |digits: &str, span| {
		digits
			.parse()
			.map_err(|err| Rich::custom(span, format!("{what}: {err}")))
	})
}

/// Generates a parser for a decimal number with an optional `+` or `-` sign.
fn signed<'src>() -> impl Parser<'src, &'src str, i64, Extra<'src>> + Clone {
	one_of("+-")
		.or_not()
		.then(text::int::<&'src str, _, _>(10))
		.try_map(|(sign, digits): (Option<char>, &str), span| {
			let val: i64 = digits
				.parse()
				.map_err(|err| Rich::custom(span, format!("Integer: {err}")))?;
			Ok(if sign == Some('-') { -val } else { val })
		})
}

/// Generates a parser that specifically handles dice terms like "d20", "2d6", "3*d%", "-2*d8!", etc.
pub fn die_part<'src>() -> impl Parser<'src, &'src str, Die, Extra<'src>> + Clone {
	let multiplier = signed().then_ignore(just('*')).or_not();
	let sides = unsigned::<u32>("Dice sides")
		.map(Some)
		.or(just('%').to(None));

	multiplier
		.then(unsigned::<u32>("Dice count").or_not())
		.then_ignore(just('d'))
		.then(sides)
		.then(just('!').or_not().map(|bang| bang.is_some()))
		.try_map(|(((multiplier, count), sides), explode), span| {
			let multiplier = match multiplier {
				Some(multiplier) => i32::try_from(multiplier)
					.map_err(|err| Rich::custom(span, format!("Dice multiplier: {err}")))?,
				None => 1,
			};
			if explode && count.is_some_and(|count| count != 1) {
				return Err(Rich::custom(span, "Exploding dice are rolled one at a time"));
			}

			let mut builder = Die::builder().multiplier(multiplier);
			if let Some(count) = count {
				builder = builder.count(count);
			}
			builder = match sides {
				Some(sides) => builder.sides(sides),
				None => builder.percentile(),
			};
			if explode {
				builder = builder.explode();
			}

			Ok(builder.build())
		})
}

/// Generates a parser that handles a single term of a formula: either dice or a constant like "3" or "-2"
pub fn term_part<'src>() -> impl Parser<'src, &'src str, Die, Extra<'src>> + Clone {
	let constant = signed().try_map(|val, span| {
		i32::try_from(val)
			.map(Die::Constant)
			.map_err(|err| Rich::custom(span, format!("Constant: {err}")))
	});

	die_part().or(constant)
}

/// Generates a parser that handles a single term of a formula and expects end of input
pub fn term<'src>() -> impl Parser<'src, &'src str, Die, Extra<'src>> + Clone {
	term_part().then_ignore(end())
}

/// Generates a parser that handles terms added together, like "2d6+3"
pub fn formula_part<'src>() -> impl Parser<'src, &'src str, Formula, Extra<'src>> + Clone {
	term_part()
		.separated_by(just('+'))
		.at_least(1)
		.collect::<Vec<_>>()
		.map(Formula::new)
}

/// Generates a parser that handles a comma-separated list of alternative formulas, like "2d6+3,d8"
pub fn options_part<'src>() -> impl Parser<'src, &'src str, Vec<Formula>, Extra<'src>> + Clone {
	formula_part().separated_by(just(',')).at_least(1).collect()
}

/// Generates a parser that handles a comma-separated list of alternative formulas and expects end of input
pub fn options<'src>() -> impl Parser<'src, &'src str, Vec<Formula>, Extra<'src>> + Clone {
	options_part().then_ignore(end())
}

/// Generates a parser that handles the target part of an attempt (after the `/`), like "15", ">=15", "-4", "=4", or
/// "3-5"
pub fn target_part<'src>() -> impl Parser<'src, &'src str, Target, Extra<'src>> + Clone {
	let range = unsigned::<i64>("Range start")
		.then_ignore(just('-'))
		.then(unsigned::<i64>("Range end"))
		.try_map(|(lo, hi), span| Target::range(lo, hi).map_err(|err| Rich::custom(span, err.to_string())));

	choice((
		range,
		just(">=").ignore_then(signed()).map(Target::AtLeast),
		just("<=").ignore_then(signed()).map(Target::AtMost),
		just("==").ignore_then(signed()).map(Target::Equals),
		just('=').ignore_then(signed()).map(Target::Equals),
		just('+').ignore_then(unsigned::<i64>("Target")).map(Target::AtLeast),
		just('-').ignore_then(unsigned::<i64>("Target")).map(Target::AtMost),
		unsigned::<i64>("Target").map(Target::AtLeast),
	))
}

/// Generates a parser that handles the target part of an attempt and expects end of input
pub fn target<'src>() -> impl Parser<'src, &'src str, Target, Extra<'src>> + Clone {
	target_part().then_ignore(end())
}

/// Parses every input into an attempt. Either every attempt is returned, or every error encountered across all of
/// the inputs is, so that nothing gets rolled when any input is bad.
///
/// # Errors
/// If any of the inputs fails to parse, all of the errors are returned.
///
/// # Examples
/// ```
/// use rollstats::{parse, Target};
///
/// let attempts = parse::attempts(["2d6+3", "d20/15"]).unwrap();
/// assert_eq!(attempts.len(), 2);
/// assert_eq!(attempts[1].target, Some(Target::AtLeast(15)));
///
/// let errors = parse::attempts(["xyz", "d6", "0d6"]).unwrap_err();
/// assert_eq!(errors.len(), 2);
/// ```
pub fn attempts<I, S>(inputs: I) -> Result<Vec<Attempt>, Vec<Error>>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut attempts = Vec::new();
	let mut errors = Vec::new();
	for input in inputs {
		match input.as_ref().parse::<Attempt>() {
			Ok(attempt) => attempts.push(attempt),
			Err(err) => errors.push(err),
		}
	}

	if errors.is_empty() {
		Ok(attempts)
	} else {
		Err(errors)
	}
}

/// Converts parser errors into problems, shifting their spans by `offset` bytes.
fn problems(errs: Vec<Rich<'_, char>>, offset: usize) -> Vec<Problem> {
	errs.into_iter()
		.map(|err| {
			let span = err.span();
			Problem {
				message: err.to_string(),
				span: span.start + offset..span.end + offset,
			}
		})
		.collect()
}

/// Joins problem messages for display.
fn list(problems: &[Problem]) -> String {
	problems
		.iter()
		.map(|problem| problem.message.as_str())
		.collect::<Vec<_>>()
		.join("; ")
}

/// A single thing wrong with an input, located within it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_structs, reason = "Plain data")]
pub struct Problem {
	/// Description of what was wrong
	pub message: String,

	/// Byte range of the input the problem was found at
	pub span: Range<usize>,
}

impl fmt::Display for Problem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} (at {}..{})", self.message, self.span.start, self.span.end)
	}
}

/// An error resulting from parsing dice notation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// The dice part of the input doesn't follow the notation.
	#[error("invalid dice expression `{input}`: {}", list(.problems))]
	InvalidExpression {
		/// Full input that was parsed
		input: String,

		/// Everything found wrong with it
		problems: Vec<Problem>,
	},

	/// The target part of the input (after the `/`) doesn't follow the notation.
	#[error("invalid target in `{input}`: {}", list(.problems))]
	InvalidTarget {
		/// Full input that was parsed
		input: String,

		/// Everything found wrong with it, with spans into the full input
		problems: Vec<Problem>,
	},

	/// The input follows the notation, but describes dice that can't be rolled.
	#[error("invalid dice in `{input}`")]
	Dice {
		/// Full input that was parsed
		input: String,

		/// Problem with the dice
		#[source]
		source: DiceError,
	},
}

impl Error {
	/// Input the error originated from.
	#[must_use]
	pub fn input(&self) -> &str {
		match self {
			Self::InvalidExpression { input, .. } | Self::InvalidTarget { input, .. } | Self::Dice { input, .. } => input,
		}
	}

	/// Every located problem with the input. Dice errors aren't tied to a location, so they have none.
	#[must_use]
	pub fn problems(&self) -> &[Problem] {
		match self {
			Self::InvalidExpression { problems, .. } | Self::InvalidTarget { problems, .. } => problems,
			Self::Dice { .. } => &[],
		}
	}
}

impl FromStr for Die {
	type Err = Error;

	/// Parses a single term, like `2d6`, `d%`, `3*d8!`, or `-2`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lc = s.to_ascii_lowercase();
		let die = term().parse(&lc).into_result().map_err(|errs| Error::InvalidExpression {
			input: s.to_owned(),
			problems: problems(errs, 0),
		})?;
		die.validate().map_err(|source| Error::Dice {
			input: s.to_owned(),
			source,
		})?;
		Ok(die)
	}
}

impl FromStr for Target {
	type Err = Error;

	/// Parses a target on its own (without the leading `/`), like `15`, `>=15`, `-4`, `=4`, or `3-5`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lc = s.to_ascii_lowercase();
		let target = target().parse(&lc).into_result().map_err(|errs| Error::InvalidTarget {
			input: s.to_owned(),
			problems: problems(errs, 0),
		})?;
		Ok(target)
	}
}

impl FromStr for Attempt {
	type Err = Error;

	/// Parses a full attempt, like `2d6+3`, `d20,d20/>=15`, or `d6/3-5`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lc = s.to_ascii_lowercase();
		let (dice_part, target_part) = match lc.split_once('/') {
			Some((dice_part, target_part)) => (dice_part, Some(target_part)),
			None => (lc.as_str(), None),
		};

		let options = options()
			.parse(dice_part)
			.into_result()
			.map_err(|errs| Error::InvalidExpression {
				input: s.to_owned(),
				problems: problems(errs, 0),
			})?;

		let target = target_part
			.map(|target_part| {
				target().parse(target_part).into_result().map_err(|errs| Error::InvalidTarget {
					input: s.to_owned(),
					problems: problems(errs, dice_part.len() + 1),
				})
			})
			.transpose()?;

		for die in options.iter().flat_map(|formula| &formula.terms) {
			die.validate().map_err(|source| Error::Dice {
				input: s.to_owned(),
				source,
			})?;
		}

		debug!("parsed {s:?} into {} options with target {target:?}", options.len());
		Ok(Attempt {
			// ASCII lowercasing keeps byte offsets intact, so the input casing can be sliced out directly
			source: s[..dice_part.len()].to_owned(),
			options,
			target,
		})
	}
}
