use serde::Deserialize;
use std::path::PathBuf;

/// Network settings of the HTTP front end.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct ServerConfig {
    /// IP address the server listens on.
    pub bind_address: String,
    /// TCP port the server listens on.
    pub port: u16,
}

/// External tool commands the orchestrator spawns.
///
/// Both are opaque executables: the cracker must behave like `hashcat`
/// (status nudge on stdin, free-text status blocks on stdout), the dumper
/// must print a completion marker line on success and anything at all to
/// stderr on failure.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct ToolsConfig {
    pub cracker_binary: String,
    pub dumper_binary: String,
}

/// Working directories. Paths are configuration, never hard-coded.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct DirectoriesConfig {
    /// Per-session stdout/stderr log files of spawned processes.
    pub logs: PathBuf,
    /// Restore files written by the cracking tool itself.
    pub restores: PathBuf,
    /// Cracking output artifacts (`{hash_file}___{session}.txt`).
    pub cracked: PathBuf,
    /// Dumping output artifacts (`{session}_{suffix}.ntds`).
    pub dumps: PathBuf,
    /// Dictionaries selectable by file name at run time.
    pub dictionaries: PathBuf,
    /// Rule files selectable by file name at run time.
    pub rules: PathBuf,
}
