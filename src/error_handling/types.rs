use std::fmt;
use std::io;

#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    TomlError(String),
    BadBindAddress(String),
    BadPort(String),
    EmptyToolCommand(String),
    DirectoryError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::BadBindAddress(e) => write!(f, "Bind address error: {}", e),
            ConfigError::BadPort(e) => write!(f, "Port error: {}", e),
            ConfigError::EmptyToolCommand(e) => write!(f, "Tool command error: {}", e),
            ConfigError::DirectoryError(e) => write!(f, "Directory error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Errors raised when launching a supervised external process.
///
/// `InvalidName` is a hard precondition failure: a generated session name or
/// a user-supplied file name carried the reserved delimiter. It is reported
/// before any file is written or any process is spawned, never corrected
/// silently.
#[derive(Debug)]
pub enum LaunchError {
    InvalidName(String),
    LogSetupFailed(io::Error),
    SpawnFailed(io::Error),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::InvalidName(e) => write!(f, "Invalid name: {}", e),
            LaunchError::LogSetupFailed(e) => write!(f, "Log file setup failed: {}", e),
            LaunchError::SpawnFailed(e) => write!(f, "Process spawn failed: {}", e),
        }
    }
}

impl std::error::Error for LaunchError {}

#[derive(Debug)]
pub enum CredsError {
    IoError(io::Error),
}

impl fmt::Display for CredsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredsError::IoError(e) => write!(f, "Credentials IO error: {}", e),
        }
    }
}

impl std::error::Error for CredsError {}

impl From<io::Error> for CredsError {
    fn from(err: io::Error) -> Self {
        CredsError::IoError(err)
    }
}

#[derive(Debug)]
pub enum WebError {
    BindFailed(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BindFailed(e) => write!(f, "Web server bind failed: {}", e),
        }
    }
}

impl std::error::Error for WebError {}
