use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static STARTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Started: (.+)").expect("started regex is valid"));

static STOPPED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Stopped: (.+)").expect("stopped regex is valid"));

/// Per-device throughput lines look like
/// `Speed.#1.........:   310.1 MH/s (6.40ms) @ Accel:1024 ...`; the value is
/// whatever follows the dotted padding and colon.
static SPEED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\.:\s+(.+)").expect("speed regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkStatus {
    Success,
    Error,
}

/// Outcome of one blocking benchmark run of the cracking tool.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub status: BenchmarkStatus,
    pub started: String,
    pub stopped: String,
    pub speeds: Vec<String>,
}

/// Classifies a finished benchmark run from its captured output.
///
/// `Started:`/`Stopped:` timestamps are extracted even on failure; any
/// stderr content at all marks the run as an error with no speeds.
pub fn parse_benchmark_output(stdout: &str, stderr: &str) -> BenchmarkReport {
    let started = STARTED_REGEX
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let stopped = STOPPED_REGEX
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    if !stderr.is_empty() {
        return BenchmarkReport {
            status: BenchmarkStatus::Error,
            started,
            stopped,
            speeds: Vec::new(),
        };
    }

    let speeds = SPEED_REGEX
        .captures_iter(stdout)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect();

    BenchmarkReport {
        status: BenchmarkStatus::Success,
        started,
        stopped,
        speeds,
    }
}
