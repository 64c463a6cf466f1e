use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

/// Minimal session info returned by every launch endpoint.
#[derive(Debug, Serialize)]
pub struct SessionData {
    pub session_name: Uuid,
}

/// Body of `POST /brute-ntlm/run`.
///
/// The hash file is addressed by full path (it is usually the
/// `hashes_file_path` a finished dump reported); dictionaries and rules are
/// addressed by file name inside their configured directories.
#[derive(Debug, Deserialize)]
pub struct RunBruteParams {
    pub hash_file_path: String,
    #[serde(default = "default_dictionary")]
    pub dictionary_file_name: String,
    #[serde(default = "default_rules")]
    pub rules_file_name: String,
}

fn default_dictionary() -> String {
    "rockyou.txt".to_string()
}

fn default_rules() -> String {
    "InsidePro-PasswordsPro.rule".to_string()
}

/// Body of `POST /dump-ntlm/run`.
#[derive(Debug, Deserialize)]
pub struct RunDumpParams {
    /// Format: `[[domain/]username[:password]@]<targetName or address>`.
    pub target: String,
    /// Narrow the dump to one AD account.
    pub just_dc_user: Option<String>,
}

/// `?session_name=<uuid>` query used by every per-session endpoint.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_name: String,
}

/// `?file_path=` query of the dumped-hashes download endpoint.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub file_path: String,
}
