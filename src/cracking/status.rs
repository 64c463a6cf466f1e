use log::warn;
use serde::Serialize;
use uuid::Uuid;

/// First line of the status block the cracking tool prints on stdout after a
/// status request.
pub const STATUS_BLOCK_MARKER: &str = "Session...";

/// Separator between a status field's dotted title padding and its value.
pub const STATUS_FIELD_SEPARATOR: &str = ".:";

/// How many lines of the stdout log the inferrer tails. A status block is a
/// couple dozen lines, so this always covers the most recent one.
pub const STATUS_TAIL_LINES: usize = 40;

/// Single status-request control byte plus newline, written to the tool's
/// stdin while it is running.
pub const STATUS_REQUEST: &[u8] = b"s\n";

/// How long to wait after a status request for the child to flush a fresh
/// block into its log. Best-effort only; there is no acknowledgment.
pub const STATUS_FLUSH_DELAY_MS: u64 = 50;

/// Inferred lifecycle state of a cracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Found,
    NotFound,
    Undefined,
}

/// One `(title, value)` attribute the tool chose to print, order preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusField {
    pub title: String,
    pub value: String,
}

/// Point-in-time snapshot of one cracking session. Not persisted.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceInfo {
    pub session_name: Uuid,
    pub state: InstanceState,
    pub status_data: Vec<StatusField>,
}

impl InstanceInfo {
    pub fn not_found(session_name: Uuid) -> Self {
        Self {
            session_name,
            state: InstanceState::NotFound,
            status_data: Vec::new(),
        }
    }

    pub fn undefined(session_name: Uuid) -> Self {
        Self {
            session_name,
            state: InstanceState::Undefined,
            status_data: Vec::new(),
        }
    }

    pub fn found(session_name: Uuid, status_data: Vec<StatusField>) -> Self {
        Self {
            session_name,
            state: InstanceState::Found,
            status_data,
        }
    }
}

/// Extracts the most recent status block from a log tail.
///
/// Scans backwards for the block marker, then consumes lines forward until
/// the blank terminator line. Returns `None` when no marker is present in
/// the tail. Lines that do not split into exactly two fields are logged and
/// skipped, never fatal: the log is free text and partial blocks happen.
pub fn parse_status_block(tail: &[String]) -> Option<Vec<StatusField>> {
    let start = tail
        .iter()
        .rposition(|line| line.contains(STATUS_BLOCK_MARKER))?;

    let mut status_data = Vec::new();
    for line in &tail[start..] {
        if line.is_empty() {
            break;
        }

        let parts: Vec<&str> = line.split(STATUS_FIELD_SEPARATOR).collect();
        if parts.len() != 2 {
            warn!("Line {:?} hasn't been split into two parts", line);
            continue;
        }
        status_data.push(StatusField {
            title: parts[0]
                .trim_matches(&['.', ' ', '\t', '\n', '\r'][..])
                .to_string(),
            value: parts[1].trim().to_string(),
        });
    }

    Some(status_data)
}
