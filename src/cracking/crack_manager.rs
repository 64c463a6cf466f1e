use super::benchmark::{parse_benchmark_output, BenchmarkReport};
use super::status::{
    parse_status_block, InstanceInfo, STATUS_FLUSH_DELAY_MS, STATUS_REQUEST, STATUS_TAIL_LINES,
};
use crate::artifacts::files::read_tail;
use crate::artifacts::naming::{
    cracked_output_name, is_reserved_name, restore_file_path, SESSION_DELIMITER,
};
use crate::error_handling::types::LaunchError;
use crate::process_supervision::{ProcessSupervisor, SessionRegistry};
use log::{error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use uuid::Uuid;

/// Which branch a `run_or_resume` call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchKind {
    Fresh,
    Resumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReRunStatus {
    Success,
    NotFound,
}

/// Outcome of an explicit re-run request.
#[derive(Debug, Clone, Serialize)]
pub struct ReRunReport {
    pub status: ReRunStatus,
    pub session_name: Uuid,
}

/// Launches and observes cracking sessions.
///
/// All external work happens in a spawned child of `cracker_binary`; the
/// manager itself only builds command lines, tails logs and keeps the
/// registry through its [`ProcessSupervisor`].
pub struct CrackManager {
    supervisor: ProcessSupervisor,
    cracker_binary: String,
    output_dir: PathBuf,
    restores_dir: PathBuf,
}

impl CrackManager {
    pub fn new(
        registry: Arc<SessionRegistry>,
        logs_dir: PathBuf,
        output_dir: PathBuf,
        restores_dir: PathBuf,
        cracker_binary: String,
    ) -> Self {
        Self {
            supervisor: ProcessSupervisor::new(registry, logs_dir, "crack"),
            cracker_binary,
            output_dir,
            restores_dir,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.supervisor.registry()
    }

    /// Starts a cracking session under a newly generated session name and
    /// returns it.
    pub async fn run_instance(
        &self,
        hash_file: &Path,
        dictionary_file: &Path,
        rules_file: &Path,
    ) -> Result<Uuid, LaunchError> {
        let session_id = Uuid::new_v4();
        self.run_or_resume(session_id, hash_file, dictionary_file, rules_file)
            .await?;
        Ok(session_id)
    }

    /// Launches a session under `session_id`, resuming from its restore file
    /// when one exists.
    ///
    /// The restore branch ignores every other argument: the tool's restore
    /// mechanism is self-contained. The fresh branch validates the naming
    /// invariant before anything is written or spawned.
    pub async fn run_or_resume(
        &self,
        session_id: Uuid,
        hash_file: &Path,
        dictionary_file: &Path,
        rules_file: &Path,
    ) -> Result<LaunchKind, LaunchError> {
        let restore_path = restore_file_path(&self.restores_dir, &session_id);

        if restore_path.is_file() {
            info!(
                "Restore file {} exists, resuming session {}",
                restore_path.display(),
                session_id
            );
            self.supervisor
                .launch(session_id, &self.cracker_binary, &resume_args(&restore_path))
                .await?;
            return Ok(LaunchKind::Resumed);
        }

        let hash_file_name = hash_file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                LaunchError::InvalidName(format!(
                    "hash file path {} has no file name",
                    hash_file.display()
                ))
            })?;
        if is_reserved_name(&hash_file_name) {
            return Err(LaunchError::InvalidName(format!(
                "Name {} of file with hashes can't contain {:?}",
                hash_file_name, SESSION_DELIMITER
            )));
        }

        let args = self.fresh_run_args(
            &session_id,
            hash_file,
            &hash_file_name,
            dictionary_file,
            rules_file,
        );
        self.supervisor
            .launch(session_id, &self.cracker_binary, &args)
            .await?;
        Ok(LaunchKind::Fresh)
    }

    /// Re-runs a crashed session if its restore file exists; `not_found`
    /// otherwise.
    pub async fn re_run_instance(&self, session_id: Uuid) -> Result<ReRunReport, LaunchError> {
        let restore_path = restore_file_path(&self.restores_dir, &session_id);
        if !restore_path.is_file() {
            return Ok(ReRunReport {
                status: ReRunStatus::NotFound,
                session_name: session_id,
            });
        }

        self.supervisor
            .launch(session_id, &self.cracker_binary, &resume_args(&restore_path))
            .await?;
        Ok(ReRunReport {
            status: ReRunStatus::Success,
            session_name: session_id,
        })
    }

    /// Best-effort snapshot of one session's progress.
    ///
    /// Registry membership is checked first and wins over any log content: a
    /// session this server never launched (or already cleaned up) is
    /// `not_found` even if old logs linger on disk.
    pub async fn instance_info(&self, session_id: Uuid) -> InstanceInfo {
        if !self.supervisor.registry().contains(&session_id).await {
            return InstanceInfo::not_found(session_id);
        }

        // Nudge a live process into printing a fresh status block, then give
        // it a moment to reach the log file. No acknowledgment exists; a
        // stale block is an accepted outcome.
        if self.supervisor.send_control(&session_id, STATUS_REQUEST).await {
            tokio::time::sleep(Duration::from_millis(STATUS_FLUSH_DELAY_MS)).await;
        }

        let (stdout_log_path, _) = self.supervisor.log_paths(&session_id);
        let tail = match read_tail(&stdout_log_path, STATUS_TAIL_LINES) {
            Ok(tail) => tail,
            Err(e) => {
                warn!(
                    "Cannot read log file {}: {}",
                    stdout_log_path.display(),
                    e
                );
                Vec::new()
            }
        };

        match parse_status_block(&tail) {
            Some(status_data) => InstanceInfo::found(session_id, status_data),
            None => InstanceInfo::undefined(session_id),
        }
    }

    /// Snapshots of every registered session.
    pub async fn all_instances_info(&self) -> Vec<InstanceInfo> {
        let mut infos = Vec::new();
        for session_id in self.supervisor.registry().session_ids().await {
            infos.push(self.instance_info(session_id).await);
        }
        infos
    }

    /// Runs the tool's benchmark to completion and classifies its output.
    /// The one place the manager awaits a child process; a benchmark run
    /// lasts seconds, not hours.
    pub async fn run_benchmark(&self) -> Result<BenchmarkReport, LaunchError> {
        let output = Command::new(&self.cracker_binary)
            .args(["-b", "-m", "1000", "--force"])
            .output()
            .await
            .map_err(LaunchError::SpawnFailed)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        info!("Benchmark finished, {} bytes of output", stdout.len());
        if !stderr.is_empty() {
            error!("Benchmark stderr: {}", stderr.trim());
        }

        Ok(parse_benchmark_output(&stdout, &stderr))
    }

    /// Administrative cleanup of one session's registry record and log files.
    pub async fn cleanup(&self, session_id: &Uuid) {
        self.supervisor.cleanup(session_id).await;
    }

    fn fresh_run_args(
        &self,
        session_id: &Uuid,
        hash_file: &Path,
        hash_file_name: &str,
        dictionary_file: &Path,
        rules_file: &Path,
    ) -> Vec<String> {
        let restore_path = restore_file_path(&self.restores_dir, session_id);
        let output_path = self
            .output_dir
            .join(cracked_output_name(hash_file_name, session_id));
        vec![
            "-m".to_string(),
            "1000".to_string(),
            hash_file.display().to_string(),
            dictionary_file.display().to_string(),
            "-r".to_string(),
            rules_file.display().to_string(),
            format!("--session={}", session_id),
            format!("--restore-file-path={}", restore_path.display()),
            "-o".to_string(),
            output_path.display().to_string(),
            "--potfile-disable".to_string(),
            "--force".to_string(),
        ]
    }
}

fn resume_args(restore_path: &Path) -> Vec<String> {
    vec![
        "--restore".to_string(),
        format!("--restore-file-path={}", restore_path.display()),
    ]
}

impl std::fmt::Debug for CrackManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrackManager")
            .field("cracker_binary", &self.cracker_binary)
            .field("output_dir", &self.output_dir)
            .field("restores_dir", &self.restores_dir)
            .finish()
    }
}
