#![feature(test)]

extern crate test;

use chumsky::Parser;
use rollstats::{parse, Attempt};
use test::Bencher;

const LONG_ATTEMPT: &str = "4d6+2*d8+d%+-3+10d10+d12!+3*2d4+7,d20+d20+d20+5,2d%/>=150";

#[bench]
fn parse_basic(b: &mut Bencher) {
	let parser = parse::options();
	b.iter(|| parser.parse("4d8+4").into_result().unwrap());
}

#[bench]
fn parse_options(b: &mut Bencher) {
	let parser = parse::options();
	b.iter(|| parser.parse("d20+5,d20+5,2d6!").into_result().unwrap());
}

#[bench]
fn parser_creation(b: &mut Bencher) {
	b.iter(parse::options);
}

#[bench]
fn fromstr_basic(b: &mut Bencher) {
	b.iter(|| "4d8+4".parse::<Attempt>().unwrap());
}

#[bench]
fn fromstr_target(b: &mut Bencher) {
	b.iter(|| "d20,d20/>=15".parse::<Attempt>().unwrap());
}

#[bench]
fn fromstr_long(b: &mut Bencher) {
	b.iter(|| LONG_ATTEMPT.parse::<Attempt>().unwrap());
}
