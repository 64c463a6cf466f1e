use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::process::Child;
use uuid::Uuid;

/// One launched external process tracked by a [`super::SessionRegistry`].
///
/// The record owns the OS process handle for the lifetime of the registry
/// entry; the log files are owned by the filesystem and referenced by path
/// only.
#[derive(Debug)]
pub struct InstanceRecord {
    /// Registry key, external session tag and log/artifact file stem.
    pub session_id: Uuid,
    /// Spawned process, if this record was created by a live launch. Used to
    /// poll liveness and to write control bytes to stdin.
    pub process_handle: Option<Child>,
    /// File the child's stdout is redirected into.
    pub stdout_log_path: PathBuf,
    /// File the child's stderr is redirected into.
    pub stderr_log_path: PathBuf,
    /// Launch timestamp.
    pub launched_at: DateTime<Utc>,
}
