//! Error types for the inventory agent
//!
//! Three tiers, matching how far a failure is allowed to travel:
//! - `FetchError`: one probe failed, the caller decides what degrades
//! - `TaskFailure`: a task behind a join barrier panicked or was lost
//! - `BuildError`: the whole run must stop

use std::path::PathBuf;

/// Failure of a single probe
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("probe not supported on this platform: {0}")]
    Unsupported(String),
    #[error("command '{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("command '{command}' timed out after {secs}s")]
    Timeout { command: String, secs: u64 },
    #[error("cannot parse output of '{command}': {message}")]
    Parse { command: String, message: String },
    #[error("unknown OS user: {0}")]
    UnknownUser(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A task that never delivered its result to the join barrier
#[derive(Debug, Clone, thiserror::Error)]
pub enum TaskFailure {
    #[error("task '{label}' panicked: {message}")]
    Panicked { label: String, message: String },
    #[error("task '{label}' did not report back")]
    Lost { label: String },
}

/// A probe run off the async workers: either the probe or its task failed
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Task(#[from] TaskFailure),
}

/// Unrecoverable errors: the run is aborted and the process exits
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("can't run exadata mode if os is different from linux, current os: [{os}]")]
    ExadataUnsupportedOs { os: String },
    #[error("you must be root to run in exadata mode")]
    ExadataRequiresRoot,
    #[error("can't set user [{user}] for fetchers: {source}")]
    UserSwitch {
        user: String,
        #[source]
        source: FetchError,
    },
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
