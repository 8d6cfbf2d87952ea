use chumsky::Parser;

use crate::{
	dice::Error as DiceError,
	parse::{self, Error},
	Attempt, Die, Formula, Target,
};

#[test]
fn basic_formula() {
	let attempt: Attempt = "2d6+3".parse().unwrap();
	assert_eq!(attempt.source, "2d6+3");
	assert_eq!(attempt.options, vec![Formula::new(vec![Die::new(2, 6), Die::constant(3)])]);
	assert_eq!(attempt.target, None);
	assert_eq!((attempt.min(), attempt.max()), (5, 15));
	assert_eq!(attempt.options[0].avg().unwrap(), 10.0);
}

#[test]
fn count_defaults_to_one() {
	assert_eq!("d20".parse::<Die>().unwrap(), Die::new(1, 20));
	assert_eq!("d%".parse::<Die>().unwrap(), Die::builder().count(1).percentile().build());
	assert_eq!("3d%".parse::<Die>().unwrap(), Die::builder().count(3).percentile().build());
}

#[test]
fn multipliers() {
	assert_eq!(
		"3*d8".parse::<Die>().unwrap(),
		Die::builder().sides(8).multiplier(3).build()
	);
	assert_eq!(
		"-2*4d6".parse::<Die>().unwrap(),
		Die::builder().count(4).sides(6).multiplier(-2).build()
	);
	assert_eq!(
		"+5*d%".parse::<Die>().unwrap(),
		Die::builder().percentile().multiplier(5).build()
	);
}

#[test]
fn exploding_dice() {
	assert_eq!("d6!".parse::<Die>().unwrap(), Die::new_exploding(6));
	assert_eq!("1d6!".parse::<Die>().unwrap(), Die::new_exploding(6));
	assert_eq!(
		"-2*d10!".parse::<Die>().unwrap(),
		Die::builder().sides(10).multiplier(-2).explode().build()
	);
	assert!(matches!("2d6!".parse::<Die>(), Err(Error::InvalidExpression { .. })));

	let attempt: Attempt = "d%!".parse().unwrap();
	assert_eq!(attempt.options[0].to_string(), "d%!");
	assert_eq!(attempt.options[0].terms[0].sides(), 100);
}

#[test]
fn constants() {
	assert_eq!("7".parse::<Die>().unwrap(), Die::constant(7));
	assert_eq!("-3".parse::<Die>().unwrap(), Die::constant(-3));
	assert_eq!("+3".parse::<Die>().unwrap(), Die::constant(3));

	let attempt: Attempt = "d20+-1+2".parse().unwrap();
	assert_eq!(attempt.options[0].terms, vec![
		Die::new(1, 20),
		Die::constant(-1),
		Die::constant(2)
	]);
}

#[test]
fn uppercase_input() {
	let attempt: Attempt = "2D6,D%/>=15".parse().unwrap();
	assert_eq!(attempt.source, "2D6,D%");
	assert_eq!(attempt.options.len(), 2);
	assert_eq!(attempt.options[0].terms, vec![Die::new(2, 6)]);
	assert_eq!(attempt.name(), "2D6,D% >= 15");
}

#[test]
fn options() {
	let attempt: Attempt = "d20,d20+2,3".parse().unwrap();
	assert_eq!(attempt.options.len(), 3);
	assert_eq!(attempt.options[2].terms, vec![Die::constant(3)]);
	assert_eq!((attempt.min(), attempt.max()), (1, 22));
}

#[test]
fn target_on_its_own() {
	assert_eq!("3-5".parse::<Target>().unwrap(), Target::Range(3, 5));
	assert_eq!("<=4".parse::<Target>().unwrap(), Target::AtMost(4));
	assert!(matches!("5-3".parse::<Target>(), Err(Error::InvalidTarget { .. })));
}

#[test]
fn targets() {
	for (input, expected) in [
		("d20/15", Target::AtLeast(15)),
		("d20/+15", Target::AtLeast(15)),
		("d20/>=15", Target::AtLeast(15)),
		("d20/>=-1", Target::AtLeast(-1)),
		("d6/-4", Target::AtMost(4)),
		("d6/<=4", Target::AtMost(4)),
		("d6/=4", Target::Equals(4)),
		("d6/==4", Target::Equals(4)),
		("d6/=-4", Target::Equals(-4)),
		("d6/3-5", Target::Range(3, 5)),
		("d6/4-4", Target::Range(4, 4)),
	] {
		let attempt: Attempt = input.parse().unwrap();
		assert_eq!(attempt.target, Some(expected), "{input}");
	}

	assert_eq!(">=15".parse::<Target>().unwrap(), Target::AtLeast(15));
}

#[test]
fn inverted_range_target() {
	let err = "d6/5-3".parse::<Attempt>().unwrap_err();
	assert!(matches!(err, Error::InvalidTarget { .. }));
	assert_eq!(err.input(), "d6/5-3");
	assert!(!err.problems().is_empty());
	assert!(err.problems().iter().all(|problem| problem.span.start >= 3));
}

#[test]
fn invalid_targets() {
	for input in ["d6/", "d6/x", "d6/>4", "d6/1-", "d6/4/5", "d6/3--5"] {
		assert!(
			matches!(input.parse::<Attempt>(), Err(Error::InvalidTarget { .. })),
			"{input}"
		);
	}
}

#[test]
fn invalid_expressions() {
	for input in ["xyz", "", "2d", "d", "2d6+", "+", "d6,", ",d6", "2d6-3", "d6 + 2", "4d8x", "2d6!!", "2dd6"] {
		let err = input.parse::<Attempt>().unwrap_err();
		assert!(matches!(err, Error::InvalidExpression { .. }), "{input}: {err:?}");
		assert!(
			err.problems()
				.iter()
				.all(|problem| problem.span.end <= input.len()),
			"{input}"
		);
	}
}

#[test]
fn out_of_range_numbers() {
	let huge = format!("{}d6", u64::MAX);
	assert!(matches!(huge.parse::<Attempt>(), Err(Error::InvalidExpression { .. })));

	let huge = format!("{}", i64::from(i32::MAX) + 1);
	assert!(matches!(huge.parse::<Die>(), Err(Error::InvalidExpression { .. })));
}

#[test]
fn degenerate_dice() {
	for input in ["0d6", "d0", "d1!", "d20,3d0/4"] {
		let err = input.parse::<Attempt>().unwrap_err();
		assert!(
			matches!(err, Error::Dice {
				source: DiceError::DegenerateDie(..),
				..
			}),
			"{input}"
		);
		assert!(err.problems().is_empty());
	}
	assert!("d1".parse::<Attempt>().is_ok());
}

#[test]
fn attempts_aggregate_errors() {
	let attempts = parse::attempts(["d6", "2d6+3/9", "d20,d20"]).unwrap();
	assert_eq!(attempts.len(), 3);

	let errors = parse::attempts(["xyz", "d6", "d6/9-1", "0d6"]).unwrap_err();
	assert_eq!(errors.len(), 3);
	assert!(matches!(errors[0], Error::InvalidExpression { .. }));
	assert!(matches!(errors[1], Error::InvalidTarget { .. }));
	assert!(matches!(errors[2], Error::Dice { .. }));
}

#[test]
fn raw_parsers() {
	assert_eq!(parse::die_part().parse("4d8").into_result().ok(), Some(Die::new(4, 8)));
	assert!(parse::term().parse("4d8+1").has_errors());
	assert_eq!(
		parse::options().parse("d4,2").into_result().ok(),
		Some(vec![
			Formula::new(vec![Die::new(1, 4)]),
			Formula::new(vec![Die::constant(2)])
		])
	);
	assert_eq!(parse::target().parse("3-5").into_result().ok(), Some(Target::Range(3, 5)));
}

#[test]
fn error_messages_name_the_input() {
	let err = "d6/x".parse::<Attempt>().unwrap_err();
	assert!(err.to_string().contains("`d6/x`"));

	let err = "0d6".parse::<Attempt>().unwrap_err();
	assert!(err.to_string().contains("`0d6`"));
}
