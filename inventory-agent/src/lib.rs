//! Inventory Agent - host and Oracle database inventory collection
//!
//! One run probes the host, then every enabled feature, and returns a single
//! `HostReport`:
//! - Oracle databases listed in oratab (open and mounted instances)
//! - Oracle Exadata components and storage cell disks
//! - Clusters and VMs of configured hypervisor managers

pub mod builder;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod license;
pub mod logging;
pub mod model;
pub mod platform;
pub mod routine;

pub use builder::HostReportBuilder;
pub use config::Configuration;
pub use error::{BuildError, ConfigError, FetchError, TaskFailure};
pub use fetcher::{FetchContext, Fetcher, LinuxFetcher};
pub use model::HostReport;
pub use platform::Platform;
