//! Generic supervision of external worker processes.
//!
//! A supervisor spawns an opaque external tool with its stdout/stderr
//! redirected into per-session log files, keeps stdin open for control
//! bytes, and appends an [`InstanceRecord`] to a mutex-guarded
//! [`SessionRegistry`]. The registry is the only signal that a session was
//! launched by this server process; it is never persisted, which the
//! dumping status inference relies on to tell a running job from one
//! orphaned by a server restart.
//!
//! The cracking and dumping subsystems each own one supervisor instance and
//! layer their own state-inference rules on top of it.

pub mod registry;
pub mod supervisor;
pub mod types;

pub use registry::SessionRegistry;
pub use supervisor::ProcessSupervisor;
pub use types::InstanceRecord;
