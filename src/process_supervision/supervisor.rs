use super::registry::SessionRegistry;
use super::types::InstanceRecord;
use crate::artifacts::files::delete_if_exists;
use crate::artifacts::naming::{is_reserved_name, session_log_paths};
use crate::error_handling::types::LaunchError;
use chrono::Utc;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use uuid::Uuid;

/// Spawns and tracks external worker processes of one kind.
///
/// The supervisor never waits for a child to finish: `launch` returns as
/// soon as the OS process exists, and all later observation happens through
/// the log files and the registry. Children keep running when a client
/// disconnects; there is no cancellation primitive.
pub struct ProcessSupervisor {
    registry: Arc<SessionRegistry>,
    logs_dir: PathBuf,
    log_prefix: &'static str,
}

impl ProcessSupervisor {
    pub fn new(
        registry: Arc<SessionRegistry>,
        logs_dir: PathBuf,
        log_prefix: &'static str,
    ) -> Self {
        Self {
            registry,
            logs_dir,
            log_prefix,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Stdout/stderr log file paths for `session_id`. Derivable without a
    /// registry entry so status inference and cleanup also work for
    /// sessions launched before a server restart.
    pub fn log_paths(&self, session_id: &Uuid) -> (PathBuf, PathBuf) {
        session_log_paths(&self.logs_dir, self.log_prefix, session_id)
    }

    /// Launches `program` with `args`, redirecting stdout/stderr into fresh
    /// per-session log files and leaving stdin open for control bytes, then
    /// registers the instance.
    ///
    /// Fails fast with [`LaunchError::InvalidName`] if the session
    /// identifier carries the reserved delimiter, before any file is
    /// touched. A spawn failure (missing binary, permissions) is fatal to
    /// the caller and not retried.
    pub async fn launch(
        &self,
        session_id: Uuid,
        program: &str,
        args: &[String],
    ) -> Result<(), LaunchError> {
        let session_name = session_id.to_string();
        if is_reserved_name(&session_name) {
            return Err(LaunchError::InvalidName(format!(
                "session name {} contains the reserved delimiter",
                session_name
            )));
        }

        let (stdout_log_path, stderr_log_path) = self.log_paths(&session_id);
        let stdout_file =
            std::fs::File::create(&stdout_log_path).map_err(LaunchError::LogSetupFailed)?;
        let stderr_file =
            std::fs::File::create(&stderr_log_path).map_err(LaunchError::LogSetupFailed)?;

        info!("Running subprocess: {} {:?}", program, args);
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::from(stdout_file))
            .stderr(Stdio::from(stderr_file))
            .spawn()
            .map_err(LaunchError::SpawnFailed)?;

        self.registry
            .insert(InstanceRecord {
                session_id,
                process_handle: Some(child),
                stdout_log_path,
                stderr_log_path,
                launched_at: Utc::now(),
            })
            .await;

        info!(
            "Subprocess started with session name {} ({} supervisor)",
            session_name, self.log_prefix
        );
        Ok(())
    }

    /// Writes `bytes` to the stdin of a registered, still-running child and
    /// flushes. Returns whether the write happened; a missing record, a
    /// finished process or a closed pipe all yield `false` without error.
    pub async fn send_control(&self, session_id: &Uuid, bytes: &[u8]) -> bool {
        let mut records = self.registry.lock().await;
        let Some(record) = records
            .iter_mut()
            .find(|record| record.session_id == *session_id)
        else {
            return false;
        };
        let Some(child) = record.process_handle.as_mut() else {
            return false;
        };

        // try_wait() == Ok(None) means the process is still running.
        match child.try_wait() {
            Ok(None) => {}
            Ok(Some(status)) => {
                debug!("Session {} already exited with {}", session_id, status);
                return false;
            }
            Err(e) => {
                warn!("Liveness poll for session {} failed: {}", session_id, e);
                return false;
            }
        }

        let Some(stdin) = child.stdin.as_mut() else {
            return false;
        };
        if let Err(e) = stdin.write_all(bytes).await {
            warn!("Control write to session {} failed: {}", session_id, e);
            return false;
        }
        if let Err(e) = stdin.flush().await {
            warn!("Control flush to session {} failed: {}", session_id, e);
            return false;
        }
        true
    }

    /// Administrative cleanup: removes the registry record if present, then
    /// deletes the session's two log files if they exist. Unrelated sessions
    /// and files are untouched; repeating the call is harmless.
    pub async fn cleanup(&self, session_id: &Uuid) {
        if self.registry.remove(session_id).await.is_some() {
            info!("Session {} removed from registry", session_id);
        }

        let (stdout_log_path, stderr_log_path) = self.log_paths(session_id);
        for path in [&stdout_log_path, &stderr_log_path] {
            if delete_if_exists(path) {
                debug!("Deleted log file {}", path.display());
            }
        }
    }
}

impl std::fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("logs_dir", &self.logs_dir)
            .field("log_prefix", &self.log_prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn supervisor_in(dir: &Path) -> ProcessSupervisor {
        ProcessSupervisor::new(Arc::new(SessionRegistry::new()), dir.to_path_buf(), "crack")
    }

    #[tokio::test]
    async fn launch_creates_logs_and_registers() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(dir.path());
        let id = Uuid::new_v4();

        supervisor
            .launch(id, "/bin/sh", &["-c".to_string(), "exit 0".to_string()])
            .await
            .unwrap();

        let (out, err) = supervisor.log_paths(&id);
        assert!(out.is_file());
        assert!(err.is_file());
        assert!(supervisor.registry().contains(&id).await);
    }

    #[tokio::test]
    async fn spawn_failure_is_fatal_and_registers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(dir.path());
        let id = Uuid::new_v4();

        let result = supervisor
            .launch(id, "/nonexistent/definitely-missing-binary", &[])
            .await;

        assert!(matches!(result, Err(LaunchError::SpawnFailed(_))));
        assert!(!supervisor.registry().contains(&id).await);
    }

    #[tokio::test]
    async fn send_control_reaches_a_live_child() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(dir.path());
        let id = Uuid::new_v4();

        // cat stays alive reading stdin until the pipe closes.
        supervisor
            .launch(id, "cat", &[])
            .await
            .unwrap();

        assert!(supervisor.send_control(&id, b"s\n").await);
        assert!(!supervisor.send_control(&Uuid::new_v4(), b"s\n").await);

        supervisor.cleanup(&id).await;
    }

    #[tokio::test]
    async fn cleanup_removes_only_the_targeted_session() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(dir.path());
        let target = Uuid::new_v4();
        let other = Uuid::new_v4();

        for id in [target, other] {
            supervisor
                .launch(id, "/bin/sh", &["-c".to_string(), "exit 0".to_string()])
                .await
                .unwrap();
        }

        supervisor.cleanup(&target).await;

        let (target_out, target_err) = supervisor.log_paths(&target);
        let (other_out, other_err) = supervisor.log_paths(&other);
        assert!(!target_out.exists());
        assert!(!target_err.exists());
        assert!(other_out.is_file());
        assert!(other_err.is_file());
        assert!(!supervisor.registry().contains(&target).await);
        assert!(supervisor.registry().contains(&other).await);

        // Idempotent on repeat.
        supervisor.cleanup(&target).await;
        assert!(supervisor.registry().contains(&other).await);
    }
}
