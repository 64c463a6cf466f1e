use crate::artifacts::files::{is_non_empty_file, last_line};
use log::warn;
use serde::Serialize;
use std::path::Path;

/// Marker the dump tool prints on its final stdout line on success. The
/// output artifact path follows the last colon of that line.
pub const DUMP_DONE_MARKER: &str = "NTLM-hashes dump file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DumpState {
    Finished,
    Error,
    Running,
    Interrupted,
    NotFound,
}

/// Classification result for one dumping session.
#[derive(Debug, Clone, Serialize)]
pub struct DumpStatusReport {
    pub status: DumpState,
    pub err_desc: String,
    pub hashes_file_path: String,
}

impl DumpStatusReport {
    fn bare(status: DumpState) -> Self {
        Self {
            status,
            err_desc: String::new(),
            hashes_file_path: String::new(),
        }
    }
}

/// Classifies a dumping session from its two log files and registry
/// membership.
///
/// The checks form a total order over ambiguous evidence: missing logs mean
/// the session never ran here (`not_found`); a completion marker wins over
/// everything else; stderr content wins over registry state; registry
/// membership is the weakest signal and only distinguishes `running` from
/// `interrupted`, the latter covering sessions started before a server
/// restart, whose outcome is unknown.
pub fn classify(stdout_log: &Path, stderr_log: &Path, registered: bool) -> DumpStatusReport {
    if !stdout_log.exists() && !stderr_log.exists() {
        return DumpStatusReport::bare(DumpState::NotFound);
    }

    match last_line(stdout_log) {
        Ok(line) if line.contains(DUMP_DONE_MARKER) => {
            let hashes_file_path = line.rsplit(':').next().unwrap_or("").trim().to_string();
            return DumpStatusReport {
                status: DumpState::Finished,
                err_desc: String::new(),
                hashes_file_path,
            };
        }
        Ok(_) => {}
        Err(e) => {
            // The stderr log may exist alone; fall through to its checks.
            warn!("Cannot read log file {}: {}", stdout_log.display(), e);
        }
    }

    if is_non_empty_file(stderr_log) {
        return DumpStatusReport {
            status: DumpState::Error,
            err_desc: format!("Check file {} for additional info", stderr_log.display()),
            hashes_file_path: String::new(),
        };
    }

    if registered {
        return DumpStatusReport::bare(DumpState::Running);
    }
    DumpStatusReport::bare(DumpState::Interrupted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Logs {
        _dir: tempfile::TempDir,
        stdout: PathBuf,
        stderr: PathBuf,
    }

    fn logs() -> Logs {
        let dir = tempfile::tempdir().unwrap();
        let stdout = dir.path().join("dump_x.log");
        let stderr = dir.path().join("dump_x_errors.log");
        Logs {
            _dir: dir,
            stdout,
            stderr,
        }
    }

    #[test]
    fn missing_logs_mean_not_found_regardless_of_registry() {
        let logs = logs();
        assert_eq!(
            classify(&logs.stdout, &logs.stderr, true).status,
            DumpState::NotFound
        );
        assert_eq!(
            classify(&logs.stdout, &logs.stderr, false).status,
            DumpState::NotFound
        );
    }

    #[test]
    fn completion_marker_wins_over_everything() {
        let logs = logs();
        std::fs::write(
            &logs.stdout,
            "connecting\nNTLM-hashes dump file: /data/dumps/abc_all_users.ntds\n",
        )
        .unwrap();
        // Even stderr content and registry absence cannot demote a finish.
        std::fs::write(&logs.stderr, "warning noise\n").unwrap();

        let report = classify(&logs.stdout, &logs.stderr, false);
        assert_eq!(report.status, DumpState::Finished);
        assert_eq!(report.hashes_file_path, "/data/dumps/abc_all_users.ntds");
    }

    #[test]
    fn stderr_content_beats_registry_state() {
        let logs = logs();
        std::fs::write(&logs.stdout, "connecting\n").unwrap();
        std::fs::write(&logs.stderr, "SMB SessionError\n").unwrap();

        let report = classify(&logs.stdout, &logs.stderr, true);
        assert_eq!(report.status, DumpState::Error);
        assert!(report.err_desc.contains("dump_x_errors.log"));
        assert!(report.hashes_file_path.is_empty());
    }

    #[test]
    fn registered_session_with_quiet_logs_is_running() {
        let logs = logs();
        std::fs::write(&logs.stdout, "connecting\n").unwrap();
        std::fs::write(&logs.stderr, "").unwrap();

        assert_eq!(
            classify(&logs.stdout, &logs.stderr, true).status,
            DumpState::Running
        );
    }

    #[test]
    fn unregistered_session_with_quiet_logs_is_interrupted() {
        let logs = logs();
        std::fs::write(&logs.stdout, "connecting\n").unwrap();
        std::fs::write(&logs.stderr, "").unwrap();

        assert_eq!(
            classify(&logs.stdout, &logs.stderr, false).status,
            DumpState::Interrupted
        );
    }

    #[test]
    fn repeated_classification_of_unchanged_logs_is_identical() {
        let logs = logs();
        std::fs::write(&logs.stdout, "connecting\n").unwrap();

        let first = classify(&logs.stdout, &logs.stderr, false);
        let second = classify(&logs.stdout, &logs.stderr, false);
        assert_eq!(first.status, second.status);
        assert_eq!(first.hashes_file_path, second.hashes_file_path);
    }
}
