//! Probe interface
//!
//! A `Fetcher` exposes one synchronous operation per collected fact. The OS
//! user a probe runs as travels with every call in a `FetchContext`, so
//! features probing as different users never share mutable state.

mod linux;
pub mod marshal;

pub use linux::LinuxFetcher;

use crate::config::Hypervisor;
use crate::error::FetchError;
use crate::model::{
    ClusterInfo, ClusterMembershipStatus, Filesystem, HardwareAbstractionTechnology, Host, License,
    OracleDatabase, OracleDatabaseAddm, OracleDatabaseBackup, OracleDatabaseFeatureUsageStat,
    OracleDatabasePartitioning, OracleDatabasePatch, OracleDatabasePsu, OracleDatabaseSchema,
    OracleDatabaseSegmentAdvisor, OracleDatabaseTablespace, OracleExadataCellDisk,
    OracleExadataComponent, OratabEntry, VmInfo,
};
use std::collections::HashMap;
use std::fmt;

/// Effective identity probes run as
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchContext {
    user: Option<String>,
}

impl FetchContext {
    /// Probe as the process user
    pub fn current() -> Self {
        Self { user: None }
    }

    pub fn as_user(user: impl Into<String>) -> Self {
        Self { user: Some(user.into()) }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

impl fmt::Display for FetchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user {
            Some(user) => write!(f, "user '{}'", user),
            None => f.write_str("current user"),
        }
    }
}

/// Source of truth for every probed fact
pub trait Fetcher: Send + Sync {
    /// Context for probing as `user`, or as the current user when `None`
    fn context_for(&self, user: Option<&str>) -> Result<FetchContext, FetchError>;

    fn host(&self, ctx: &FetchContext) -> Result<Host, FetchError>;
    fn filesystems(&self, ctx: &FetchContext) -> Result<Vec<Filesystem>, FetchError>;
    fn clusters_membership_status(&self, ctx: &FetchContext) -> Result<ClusterMembershipStatus, FetchError>;

    fn oracle_database_oratab_entries(&self, ctx: &FetchContext) -> Result<Vec<OratabEntry>, FetchError>;
    fn oracle_database_running_databases(&self, ctx: &FetchContext) -> Result<Vec<String>, FetchError>;
    fn oracle_database_db_status(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<String, FetchError>;
    fn oracle_database_mounted_db(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<OracleDatabase, FetchError>;
    fn oracle_database_db_version(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<String, FetchError>;
    fn run_oracle_database_stats(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<(), FetchError>;
    fn oracle_database_open_db(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<OracleDatabase, FetchError>;

    fn oracle_database_tablespaces(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
    ) -> Result<Vec<OracleDatabaseTablespace>, FetchError>;
    fn oracle_database_schemas(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<Vec<OracleDatabaseSchema>, FetchError>;
    fn oracle_database_patches(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        db_version: &str,
    ) -> Result<Vec<OracleDatabasePatch>, FetchError>;
    fn oracle_database_feature_usage_stats(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        db_version: &str,
    ) -> Result<Vec<OracleDatabaseFeatureUsageStat>, FetchError>;
    /// `FetchError::Unsupported` lets the caller compute licenses itself
    fn oracle_database_licenses(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        db_version: &str,
        technology: &HardwareAbstractionTechnology,
    ) -> Result<Vec<License>, FetchError>;
    fn oracle_database_addms(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<Vec<OracleDatabaseAddm>, FetchError>;
    fn oracle_database_segment_advisors(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
    ) -> Result<Vec<OracleDatabaseSegmentAdvisor>, FetchError>;
    fn oracle_database_psus(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        db_version: &str,
    ) -> Result<Vec<OracleDatabasePsu>, FetchError>;
    fn oracle_database_backups(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<Vec<OracleDatabaseBackup>, FetchError>;
    fn oracle_database_partitionings(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
    ) -> Result<Vec<OracleDatabasePartitioning>, FetchError>;

    fn oracle_exadata_components(&self, ctx: &FetchContext) -> Result<Vec<OracleExadataComponent>, FetchError>;
    /// Cell disks grouped by storage server name
    fn oracle_exadata_cell_disks(
        &self,
        ctx: &FetchContext,
    ) -> Result<HashMap<String, Vec<OracleExadataCellDisk>>, FetchError>;

    fn hypervisor_clusters(&self, ctx: &FetchContext, hypervisor: &Hypervisor) -> Result<Vec<ClusterInfo>, FetchError>;
    fn hypervisor_vms(&self, ctx: &FetchContext, hypervisor: &Hypervisor) -> Result<Vec<VmInfo>, FetchError>;
}
