use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Reserved delimiter joining a hash file name with a session identifier in
/// cracking output file names. No other module may hard-code this value.
pub const SESSION_DELIMITER: &str = "___";

/// Whether `name` carries the reserved delimiter and is therefore forbidden
/// as a session identifier or as the basename of a user-supplied file.
pub fn is_reserved_name(name: &str) -> bool {
    name.contains(SESSION_DELIMITER)
}

/// File name of a cracking output artifact: `{hash_file_name}___{session_id}.txt`.
pub fn cracked_output_name(hash_file_name: &str, session_id: &Uuid) -> String {
    format!("{}{}{}.txt", hash_file_name, SESSION_DELIMITER, session_id)
}

/// Splits a cracking output file name back into its hash-file stem and the
/// session part. Returns `None` unless the delimiter occurs exactly once;
/// a file that cannot be split this way cannot be correlated.
pub fn split_cracked_output_name(file_name: &str) -> Option<(&str, &str)> {
    let mut parts = file_name.split(SESSION_DELIMITER);
    let stem = parts.next()?;
    let session_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((stem, session_part))
}

/// Base name (no extension) of a dumping output artifact. The external dump
/// tool appends its own extension.
pub fn dump_output_base(session_id: &Uuid, just_dc_user: Option<&str>) -> String {
    match just_dc_user {
        Some(user) => format!("{}_{}", session_id, user),
        None => format!("{}_all_users", session_id),
    }
}

/// Path of the restore file the cracking tool writes for a session. Its mere
/// existence decides the run-vs-resume branch.
pub fn restore_file_path(restores_dir: &Path, session_id: &Uuid) -> PathBuf {
    restores_dir.join(format!("{}.restore", session_id))
}

/// Stdout/stderr log file paths for a supervised session, distinguished by a
/// per-supervisor prefix ("crack", "dump").
pub fn session_log_paths(logs_dir: &Path, prefix: &str, session_id: &Uuid) -> (PathBuf, PathBuf) {
    (
        logs_dir.join(format!("{}_{}.log", prefix, session_id)),
        logs_dir.join(format!("{}_{}_errors.log", prefix, session_id)),
    )
}
