//! Cracking subsystem: launches the external cracking tool, infers the
//! state of running or previously-run sessions from their log tails, and
//! runs the blocking benchmark.
//!
//! The tool exposes no structured status API. A live process is nudged with
//! a single status-request byte on stdin and the most recent free-text
//! status block is parsed out of a bounded log tail; stale or garbled blocks
//! degrade to the `undefined` state rather than failing.

pub mod benchmark;
pub mod crack_manager;
pub mod status;

pub use crack_manager::{CrackManager, LaunchKind, ReRunReport, ReRunStatus};
pub use status::{InstanceInfo, InstanceState, StatusField};
