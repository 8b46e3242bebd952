//! Facts about the process platform that gate features
//!
//! Detects:
//! - The operating system the agent runs on
//! - Whether the process runs with root privileges

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub is_root: bool,
}

impl Platform {
    /// Detect the current platform
    pub fn detect() -> Self {
        let platform = Self {
            os: std::env::consts::OS.to_string(),
            is_root: Self::running_as_root(),
        };
        debug!("Platform detected: os={}, root={}", platform.os, platform.is_root);
        platform
    }

    pub fn is_linux(&self) -> bool {
        self.os == "linux"
    }

    #[cfg(unix)]
    fn running_as_root() -> bool {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(not(unix))]
    fn running_as_root() -> bool {
        false
    }
}
