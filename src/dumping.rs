//! Dumping subsystem: launches the external AD secrets-dumping tool and
//! classifies each session into a closed state set from its log files.
//!
//! Unlike cracking there is no interactive status channel; the inference
//! works entirely from the completion marker on stdout, stderr content, and
//! registry membership, in that priority order. Registry membership does
//! not survive a server restart, which is what lets a marker-less,
//! error-less pair of leftover logs be classified as `interrupted`.

pub mod dump_manager;
pub mod status;

pub use dump_manager::DumpManager;
pub use status::{DumpState, DumpStatusReport};
