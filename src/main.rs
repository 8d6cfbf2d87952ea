use std::{error::Error as _, process::ExitCode};

use ariadne::{Config, IndexType, Label, Report as Diagnostic, ReportKind, Source};
use clap::Parser;
use rollstats::{
	dice::roller::FastRand as FastRandRoller,
	expr::Describe,
	outcomes::{Limits, DEFAULT_MAX_OUTCOMES},
	parse,
	report::{Options, Rolls},
	Report,
};

const NOTATION: &str = "\
Dice must be in the form [M*][N]dX[!][+...][,...][/T] where:
  M - Multiplier for the dice (positive or negative)
  N - Number of dice (1 if left out)
  X - Number of sides, or % for percentile dice
  ! - Exploding die, rolled again and added while it shows its max (one die only)
  Constants such as 3 or -2 can be added in place of dice.

  T - Target value:
    15, +15 or >=15 means \"greater than or equal to 15\"
    -4 or <=4 means \"less than or equal to 4\"
    =4 or ==4 means \"equal to 4\"
    3-5 means \"in the range 3-5, inclusive\"

When several comma-separated options are given, any of them can meet the target (e.g. a Savage Worlds wild die).";

/// Rolls dice and reports the odds behind them
#[derive(Debug, Parser)]
#[command(name = "roll", version, about, after_help = NOTATION)]
struct Cli {
	/// Show stats and percentage tables
	#[arg(long)]
	stats: bool,

	/// Show rolls and whether targets were met
	#[arg(long)]
	roll: bool,

	/// Seed for reproducible rolls
	#[arg(long)]
	seed: Option<u64>,

	/// Maximum number of outcomes to enumerate for any one attempt
	#[arg(long, default_value_t = DEFAULT_MAX_OUTCOMES)]
	max_outcomes: usize,

	/// Maximum number of rolled faces to list per die
	#[arg(long)]
	list_limit: Option<usize>,

	/// Dice expressions, such as 2d6+3 or d20,d20/>=15
	#[arg(allow_hyphen_values = true)]
	dice: Vec<String>,
}

fn main() -> ExitCode {
	env_logger::init();
	let cli = Cli::parse();

	if cli.dice.is_empty() {
		eprintln!("Missing dice argument");
		eprintln!("{NOTATION}");
		return ExitCode::FAILURE;
	}

	// Without either flag, everything is shown
	let (show_stats, show_rolls) = if cli.stats || cli.roll {
		(cli.stats, cli.roll)
	} else {
		(true, true)
	};

	let attempts = match parse::attempts(&cli.dice) {
		Ok(attempts) => attempts,
		Err(errors) => {
			errors.iter().for_each(report_parse_error);
			eprintln!();
			eprintln!("{NOTATION}");
			return ExitCode::FAILURE;
		}
	};

	let mut roller = cli.seed.map_or_else(FastRandRoller::default, FastRandRoller::with_seed);
	let options = Options {
		percentages: show_stats,
		limits: Limits::new(cli.max_outcomes),
	};

	match Report::build(&attempts, &mut roller, &options) {
		Ok(report) => {
			print_report(&report, show_stats, show_rolls, cli.list_limit);
			ExitCode::SUCCESS
		}
		Err(err) => {
			eprintln!("Error: {err}");
			if let Some(source) = err.source() {
				eprintln!("  {source}");
			}
			ExitCode::FAILURE
		}
	}
}

/// Prints a diagnostic pointing at everything wrong with an input.
fn report_parse_error(err: &parse::Error) {
	let input = err.input();
	let whole = 0..input.len();
	let span = err.problems().first().map_or_else(|| whole.clone(), |problem| problem.span.clone());

	let mut diagnostic = Diagnostic::build(ReportKind::Error, span)
		.with_config(Config::default().with_index_type(IndexType::Byte))
		.with_message(err.to_string());
	if err.problems().is_empty() {
		diagnostic.add_label(Label::new(whole).with_message(err.source().map_or_else(String::new, |source| source.to_string())));
	}
	for problem in err.problems() {
		diagnostic.add_label(Label::new(problem.span.clone()).with_message(&problem.message));
	}

	if let Err(io_err) = diagnostic.finish().eprint(Source::from(input)) {
		eprintln!("{err} ({io_err})");
	}
}

/// Dashes as wide as the text, plus some padding. Headers can hold multibyte characters such as `×`.
fn rule(text: &str, pad: usize) -> String {
	"-".repeat(text.chars().count().saturating_add(pad))
}

fn section(name: &str) {
	let bar = format!("+--{}--+", rule(name, 0));
	println!("{bar}");
	println!("|  {name}  |");
	println!("{bar}");
}

fn label(name: &str) {
	println!(" {name}");
	println!("{}", rule(name, 2));
}

fn print_report(report: &Report<'_>, show_stats: bool, show_rolls: bool, list_limit: Option<usize>) {
	if show_stats {
		section("STATS");
		for stats in &report.stats {
			label(&stats.header);
			println!("min: {}", stats.min);
			println!("max: {}", stats.max);
			println!("avg: {}", stats.avg);
			println!();
		}

		section("PERCENTAGES");
		for percentages in &report.percentages {
			println!("{}", percentages.name);
			println!("{}", rule(&percentages.name, 0));
			for row in &percentages.rows {
				println!("{}: {}", row.val, row.share);
			}
			if let Some((target, share)) = &percentages.target {
				println!("% of rolls {target}: {share}");
			}
			println!();
		}
	}

	if show_rolls {
		section("ROLLS");
		for rolls in &report.rolls {
			if let Rolls::Target { name, .. } = rolls {
				if rolls.rolls().len() > 1 {
					println!("{name}");
					println!("{}", rule(name, 0));
				}
			}

			for rolled in rolls.rolls() {
				println!("  {} = {}", rolled.describe(list_limit), rolled.total);
			}

			if let Rolls::Target { target, succeeded, .. } = rolls {
				println!("target ({target}): {}", outcome(*succeeded));
				println!();
			}
		}
		println!();

		if let Some(success) = report.total_success() {
			section("TOTAL SUCCESS");
			if show_stats {
				if let Some(percent) = success.percent() {
					println!("%chance: {percent:.1}%");
				}
			}
			println!("Target rolls: {}", outcome(success.succeeded));
		}
	}
}

const fn outcome(succeeded: bool) -> &'static str {
	if succeeded {
		"Succeeded"
	} else {
		"Failed"
	}
}

#[cfg(test)]
mod tests {
	use super::rule;

	#[test]
	fn rules_count_characters() {
		assert_eq!(rule("2d6", 0), "---");
		assert_eq!(rule("3 × 2d6", 0), "-------");
		assert_eq!(rule("3 × 2d6", 2), "---------");
	}
}
