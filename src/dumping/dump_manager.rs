use super::status::{classify, DumpStatusReport};
use crate::artifacts::naming::{dump_output_base, is_reserved_name, SESSION_DELIMITER};
use crate::error_handling::types::LaunchError;
use crate::process_supervision::{ProcessSupervisor, SessionRegistry};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Launches and observes AD secrets-dumping sessions.
///
/// The dump tool is an opaque configured command; on success its output
/// artifact lands under `dumps_dir` with the session identifier as the file
/// name stem, which later serves as the correlation key for cracking runs.
pub struct DumpManager {
    supervisor: ProcessSupervisor,
    dumper_binary: String,
    dumps_dir: PathBuf,
}

impl DumpManager {
    pub fn new(
        registry: Arc<SessionRegistry>,
        logs_dir: PathBuf,
        dumps_dir: PathBuf,
        dumper_binary: String,
    ) -> Self {
        Self {
            supervisor: ProcessSupervisor::new(registry, logs_dir, "dump"),
            dumper_binary,
            dumps_dir,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.supervisor.registry()
    }

    /// Starts a dumping session against `target` and returns its generated
    /// session name.
    ///
    /// `just_dc_user` narrows the dump to one account and becomes part of
    /// the output file name, so it is subject to the same naming
    /// precondition as every user-supplied file name component.
    pub async fn run_instance(
        &self,
        target: &str,
        just_dc_user: Option<&str>,
    ) -> Result<Uuid, LaunchError> {
        if let Some(user) = just_dc_user {
            if is_reserved_name(user) {
                return Err(LaunchError::InvalidName(format!(
                    "User name {} can't contain {:?}",
                    user, SESSION_DELIMITER
                )));
            }
        }

        let session_id = Uuid::new_v4();
        let output_base = self.dumps_dir.join(dump_output_base(&session_id, just_dc_user));

        let mut args = vec![
            "--target".to_string(),
            target.to_string(),
            "--session-name".to_string(),
            session_id.to_string(),
            "--output-file".to_string(),
            output_base.display().to_string(),
        ];
        if let Some(user) = just_dc_user {
            args.push("--just-dc-user".to_string());
            args.push(user.to_string());
        }

        info!("Run dump process for session {}", session_id);
        self.supervisor
            .launch(session_id, &self.dumper_binary, &args)
            .await?;
        Ok(session_id)
    }

    /// Classifies a dumping session; see [`super::status::classify`] for the
    /// evidence ordering.
    pub async fn instance_status(&self, session_id: Uuid) -> DumpStatusReport {
        let (stdout_log_path, stderr_log_path) = self.supervisor.log_paths(&session_id);
        let registered = self.supervisor.registry().contains(&session_id).await;
        classify(&stdout_log_path, &stderr_log_path, registered)
    }

    /// Administrative cleanup of one session's registry record and log files.
    pub async fn cleanup(&self, session_id: &Uuid) {
        self.supervisor.cleanup(session_id).await;
    }
}

impl std::fmt::Debug for DumpManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpManager")
            .field("dumper_binary", &self.dumper_binary)
            .field("dumps_dir", &self.dumps_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dumping::status::DumpState;

    struct Fixture {
        _root: tempfile::TempDir,
        manager: DumpManager,
    }

    fn fixture(dumper_binary: &str) -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let logs = root.path().join("logs");
        let dumps = root.path().join("dumps");
        for dir in [&logs, &dumps] {
            std::fs::create_dir_all(dir).unwrap();
        }
        let manager = DumpManager::new(
            Arc::new(SessionRegistry::new()),
            logs,
            dumps,
            dumper_binary.to_string(),
        );
        Fixture {
            _root: root,
            manager,
        }
    }

    #[tokio::test]
    async fn run_registers_and_creates_logs() {
        let fx = fixture("true");

        let id = fx
            .manager
            .run_instance("corp.local/admin:secret@10.0.0.5", None)
            .await
            .unwrap();

        assert!(fx.manager.registry().contains(&id).await);
        let (out, err) = fx.manager.supervisor.log_paths(&id);
        assert!(out.is_file());
        assert!(err.is_file());
    }

    #[tokio::test]
    async fn reserved_user_name_fails_before_spawn() {
        let fx = fixture("/nonexistent/dumper");

        let result = fx
            .manager
            .run_instance("corp.local/admin@10.0.0.5", Some("svc___backup"))
            .await;

        assert!(matches!(result, Err(LaunchError::InvalidName(_))));
        assert!(fx.manager.registry().is_empty().await);
    }

    #[tokio::test]
    async fn status_of_unknown_session_without_logs_is_not_found() {
        let fx = fixture("true");

        let report = fx.manager.instance_status(Uuid::new_v4()).await;
        assert_eq!(report.status, DumpState::NotFound);
    }

    #[tokio::test]
    async fn status_of_registered_session_with_quiet_logs_is_running() {
        let fx = fixture("true");
        let id = fx
            .manager
            .run_instance("corp.local/admin@10.0.0.5", None)
            .await
            .unwrap();

        let report = fx.manager.instance_status(id).await;
        assert_eq!(report.status, DumpState::Running);
    }

    #[tokio::test]
    async fn status_flips_to_interrupted_after_cleanup_leaves_logs_behind() {
        let fx = fixture("true");
        let id = fx
            .manager
            .run_instance("corp.local/admin@10.0.0.5", None)
            .await
            .unwrap();

        // Simulate the registry loss of a server restart: drop the record
        // but keep the log files on disk.
        fx.manager.registry().remove(&id).await;

        let report = fx.manager.instance_status(id).await;
        assert_eq!(report.status, DumpState::Interrupted);
    }

    #[tokio::test]
    async fn finished_marker_is_detected_with_artifact_path() {
        let fx = fixture("true");
        let id = fx
            .manager
            .run_instance("corp.local/admin@10.0.0.5", None)
            .await
            .unwrap();
        let (out, _) = fx.manager.supervisor.log_paths(&id);
        std::fs::write(
            &out,
            format!("working\nNTLM-hashes dump file: /data/dumps/{}_all_users.ntds\n", id),
        )
        .unwrap();

        let report = fx.manager.instance_status(id).await;
        assert_eq!(report.status, DumpState::Finished);
        assert_eq!(
            report.hashes_file_path,
            format!("/data/dumps/{}_all_users.ntds", id)
        );
    }
}
