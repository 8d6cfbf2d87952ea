use crate::{
	dice::{
		roller::{FastRand as FastRandRoller, Iter as IterRoller, Max as MaxRoller, Roller, Val as ValRoller},
		Die, Error, Rolled, MAX_ROLLED_DICE,
	},
	expr::Describe,
	outcomes::Limits,
};

#[test]
fn single_d20() {
	let die = Die::new(1, 20);
	let rolled = rolls_successfully_and_in_range(&die);
	assert_eq!(rolled.faces.len(), 1);
	assert_eq!(rolled.die.as_ref(), &die);
}

#[test]
fn hundred_d42s() {
	let die = Die::new(100, 42);
	let rolled = rolls_successfully_and_in_range(&die);
	assert_eq!(rolled.faces.len(), 100);
}

#[test]
fn percentile_dice() {
	let die = Die::builder().count(3).percentile().build();
	let rolled = rolls_successfully_and_in_range(&die);
	assert_eq!(rolled.faces.len(), 3);
	assert_eq!(die.sides(), 100);
}

#[test]
fn all_dice_sides_occur() {
	let die = Die::new(100, 20);
	let mut roller = FastRandRoller::with_seed(0x0d20);
	let mut faces = Vec::new();

	for _ in 1..=100 {
		faces.append(&mut roller.roll(&die).unwrap().faces);
	}

	faces_in_range(&faces, 20);
	for side in 1..=20 {
		assert!(faces.contains(&side));
	}
}

#[test]
fn constants_roll_nothing() {
	let die = Die::constant(-7);
	let rolled = ValRoller(3).roll(&die).unwrap();
	assert!(rolled.faces.is_empty());
	assert_eq!(rolled.total().unwrap(), -7);
}

#[test]
fn multiplier_applies_to_sum() {
	let die = Die::builder().count(2).sides(8).multiplier(-3).build();
	let rolled = IterRoller::new(vec![2, 7]).roll(&die).unwrap();
	assert_eq!(rolled.total().unwrap(), -27);
}

#[test]
fn exploding_chain_stops_below_max() {
	let die = Die::new_exploding(6);
	let mut roller = FastRandRoller::with_seed(0x6666);

	for _ in 0..1000 {
		let rolled = roller.roll(&die).unwrap();
		let (last, exploded) = rolled.faces.split_last().unwrap();
		assert!(exploded.iter().all(|face| *face == 6));
		assert!((1..=5).contains(last));
	}
}

#[test]
fn exploding_total_accumulates() {
	let die = Die::builder().sides(6).multiplier(2).explode().build();
	let rolled = IterRoller::new(vec![6, 6, 3]).roll(&die).unwrap();
	assert_eq!(rolled.faces, vec![6, 6, 3]);
	assert_eq!(rolled.total().unwrap(), 30);
}

#[test]
fn exploding_forever_is_an_error() {
	let die = Die::new_exploding(6);
	assert_eq!(MaxRoller.roll(&die), Err(Error::InfiniteRolls(die.clone())));

	let one_sided = Die::new_exploding(1);
	assert!(matches!(ValRoller(1).roll(&one_sided), Err(Error::InfiniteRolls(..))));
}

#[test]
fn too_many_dice_to_roll() {
	let die = Die::new(4_000_000_000, 6);
	assert_eq!(ValRoller(1).roll(&die), Err(Error::TooManyDice(die.clone())));

	let die = Die::builder().count(MAX_ROLLED_DICE).percentile().build();
	assert_eq!(ValRoller(1).roll(&die).unwrap().faces.len(), MAX_ROLLED_DICE as usize);
}

#[test]
fn total_overflow() {
	let die = Die::builder().count(3).sides(u32::MAX).multiplier(i32::MAX).build();
	let rolled = Rolled::from_die_and_faces(&die, [u32::MAX; 3]);
	assert_eq!(rolled.total(), Err(Error::Overflow(die.clone())));
}

#[test]
fn standard_enumeration_size_and_range() {
	let limits = Limits::default();
	for die in [
		Die::new(1, 20),
		Die::new(3, 6),
		Die::new(2, 10),
		Die::builder().count(2).sides(4).multiplier(-3).build(),
		Die::builder().count(2).percentile().build(),
	] {
		let rolls = die.all_possible_rolls(&limits).unwrap();
		assert_eq!(rolls.len(), die.sides().pow(die.count()) as usize, "{die}");
		assert!(rolls.iter().all(|roll| (die.min()..=die.max()).contains(roll)), "{die}");
		assert!(rolls.contains(&die.min()) && rolls.contains(&die.max()), "{die}");
	}
}

#[test]
fn negative_multiplier_bounds() {
	let die = Die::builder().count(3).sides(6).multiplier(-2).build();
	assert_eq!(die.min(), -36);
	assert_eq!(die.max(), -6);
	assert_eq!(die.avg().unwrap(), -21.0);
}

#[test]
fn avg_within_bounds() {
	for die in [
		Die::constant(4),
		Die::constant(-4),
		Die::new(1, 1),
		Die::new(2, 6),
		Die::builder().count(2).sides(8).multiplier(-5).build(),
		Die::builder().percentile().build(),
		Die::new_exploding(2),
		Die::new_exploding(6),
		Die::builder().sides(10).multiplier(-1).explode().build(),
	] {
		let avg = die.avg().unwrap();
		assert!(die.min() as f64 <= avg && avg <= die.max() as f64, "{die}: {avg}");
	}
}

#[test]
fn single_sided_dice_are_fixed() {
	let die = Die::new(3, 1);
	assert_eq!(die.all_possible_rolls(&Limits::default()).unwrap(), vec![3]);
	assert_eq!((die.min(), die.max()), (3, 3));
}

#[test]
fn constant_enumeration() {
	let limits = Limits::default();
	assert_eq!(Die::constant(5).all_possible_rolls(&limits).unwrap(), vec![5]);
	assert!(Die::constant(0).all_possible_rolls(&limits).unwrap().is_empty());
}

#[test]
fn exploding_enumeration_tiers() {
	let die = Die::new_exploding(6);
	let rolls = die.all_possible_rolls(&Limits::default()).unwrap();
	assert_eq!(rolls.len(), 216);

	let copies = |val: i64| rolls.iter().filter(|roll| **roll == val).count();
	for face in 1..=5 {
		assert_eq!(copies(face), 36);
	}
	assert_eq!(copies(6), 0);
	for face in 7..=11 {
		assert_eq!(copies(face), 6);
	}
	assert_eq!(copies(12), 0);
	for face in 13..=18 {
		assert_eq!(copies(face), 1);
	}
	assert_eq!(die.max(), 18);
}

#[test]
fn multiplied_explosions_only_scale_the_last_face() {
	let die = Die::builder().sides(4).multiplier(3).explode().build();
	let mut rolls = die.all_possible_rolls(&Limits::default()).unwrap();
	assert_eq!(rolls.len(), 64);
	rolls.sort_unstable();
	rolls.dedup();
	assert_eq!(rolls, vec![3, 6, 7, 9, 10, 11, 13, 14, 17, 20]);
	assert_eq!(die.max(), 36);

	// Rolling multiplies the whole chain, so 4 then 1 totals 15, a value the enumeration never lists
	let rolled = IterRoller::new(vec![4, 1]).roll(&die).unwrap();
	assert_eq!(rolled.total().unwrap(), 15);
	assert!(!rolls.contains(&15));
}

#[test]
fn unit_multiplier_explosions_match_rolling() {
	let die = Die::new_exploding(4);
	let rolls = die.all_possible_rolls(&Limits::default()).unwrap();
	for faces in [vec![3], vec![4, 1], vec![4, 4, 2]] {
		let total = IterRoller::new(faces).roll(&die).unwrap().total().unwrap();
		assert!(rolls.contains(&total), "{total}");
	}
}

#[test]
fn too_many_outcomes() {
	let limits = Limits::new(1000);
	assert!(Die::new(3, 10).all_possible_rolls(&limits).is_ok());
	assert_eq!(
		Die::new(4, 10).all_possible_rolls(&limits),
		Err(Error::TooManyOutcomes {
			outcomes: 10_000,
			limit: 1000,
		})
	);
	assert!(matches!(
		Die::new(u32::MAX, 6).all_possible_rolls(&Limits::default()),
		Err(Error::TooManyOutcomes { .. })
	));
	assert!(matches!(
		Die::new_exploding(11).all_possible_rolls(&limits),
		Err(Error::TooManyOutcomes { outcomes: 1331, .. })
	));
}

#[test]
fn degenerate_dice() {
	for die in [Die::new(0, 6), Die::new(2, 0), Die::new_exploding(1), Die::new_exploding(0)] {
		assert!(matches!(die.validate(), Err(Error::DegenerateDie(..))), "{die}");
		assert!(matches!(die.all_possible_rolls(&Limits::default()), Err(Error::DegenerateDie(..))), "{die}");
	}
	assert!(Die::new(1, 1).validate().is_ok());
	assert!(Die::new_exploding(2).validate().is_ok());
}

#[test]
fn headers() {
	assert_eq!(Die::constant(-3).to_string(), "-3");
	assert_eq!(Die::new(1, 6).to_string(), "d6");
	assert_eq!(Die::new(2, 6).to_string(), "2d6");
	assert_eq!(Die::builder().percentile().build().to_string(), "d%");
	assert_eq!(Die::new_exploding(8).to_string(), "d8!");
	assert_eq!(Die::builder().percentile().explode().build().to_string(), "d%!");
	assert_eq!(Die::new_exploding(100).to_string(), "d100!");
	assert_eq!(Die::builder().count(2).sides(6).multiplier(3).build().to_string(), "3 × 2d6");
	assert_eq!(Die::builder().sides(6).multiplier(-1).explode().build().to_string(), "-1 × d6!");
}

#[test]
fn describe_faces() {
	let die = Die::new(8, 6);
	let rolled = Rolled::from_die_and_faces(&die, [1, 2, 3, 4, 5, 6, 1, 2]);
	assert_eq!(rolled.describe(None), "8d6 (1, 2, 3, 4, 5, 6, 1, 2)");
	assert_eq!(rolled.describe(Some(3)), "8d6 (1, 2, 3, 5 more...)");
	assert_eq!(rolled.to_string(), rolled.describe(None));

	let constant = Die::constant(4);
	assert_eq!(Rolled::from_die_and_faces(&constant, []).describe(None), "4");
}

#[test]
fn seeded_rollers_agree() {
	let die = Die::new(10, 20);
	let first = FastRandRoller::with_seed(42).roll(&die).unwrap();
	let second = FastRandRoller::with_seed(42).roll(&die).unwrap();
	assert_eq!(first, second);
}

#[test]
fn owned_rolls_outlive_dice() {
	let rolled = {
		let die = Die::new(2, 4);
		IterRoller::new(vec![1, 4]).roll(&die).unwrap().into_owned()
	};
	assert_eq!(rolled.die.as_ref(), &Die::new(2, 4));
	assert_eq!(rolled.total().unwrap(), 5);
}

fn rolls_successfully_and_in_range(die: &Die) -> Rolled<'_> {
	let rolled = FastRandRoller::default().roll(die).unwrap();
	faces_in_range(&rolled.faces, die.sides());
	rolled
}

fn faces_in_range(faces: &[u32], sides: u32) {
	for face in faces {
		assert!((1..=sides).contains(face));
	}
}
