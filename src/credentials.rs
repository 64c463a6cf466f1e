//! Correlation of cracking output back to the accounts it came from.
//!
//! The only join key between the two subsystems is the cracking output file
//! name, which embeds the original dump file stem and the cracking session
//! identifier around the reserved delimiter. Anything that cannot be split
//! cleanly is treated as `not_found`, never as an error: polling clients hit
//! misses routinely.

pub mod correlator;

pub use correlator::{BrutedAcc, BrutedCreds, CredsCorrelator, CredsStatus};
