#[cfg(feature = "fastrand")]
mod dice;
#[cfg(feature = "parse")]
mod parse;
