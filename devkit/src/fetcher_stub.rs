/*!
Stub probe layer for running the collection pipeline without a real host

Every probe answers from scripted data, records who asked (probe name,
target, effective user) and can be told to fail or to panic.
*/

use inventory_agent::config::Hypervisor;
use inventory_agent::error::FetchError;
use inventory_agent::fetcher::{FetchContext, Fetcher};
use inventory_agent::model::{
    ClusterInfo, ClusterMembershipStatus, Filesystem, HardwareAbstractionTechnology, Host, License,
    OracleDatabase, OracleDatabaseAddm, OracleDatabaseBackup, OracleDatabaseFeatureUsageStat,
    OracleDatabasePartitioning, OracleDatabasePatch, OracleDatabasePsu, OracleDatabaseSchema,
    OracleDatabaseSegmentAdvisor, OracleDatabaseTablespace, OracleExadataCellDisk,
    OracleExadataComponent, OratabEntry, VmInfo,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Scripted answers for one database instance
#[derive(Debug, Clone, Default)]
pub struct StubDatabase {
    /// Raw status string, as the status probe prints it
    pub status: String,
    pub version: String,
    /// Descriptor plus the sub-collections the probes hand out
    pub record: OracleDatabase,
    /// `None` makes the license probe report `Unsupported`
    pub licenses: Option<Vec<License>>,
}

/// One recorded probe invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCall {
    pub probe: String,
    pub target: Option<String>,
    pub user: Option<String>,
}

#[derive(Default)]
struct StubState {
    host: Host,
    filesystems: Vec<Filesystem>,
    membership: ClusterMembershipStatus,
    oratab: Vec<OratabEntry>,
    running: Vec<String>,
    databases: HashMap<String, StubDatabase>,
    exadata_components: Vec<OracleExadataComponent>,
    cell_disks: HashMap<String, Vec<OracleExadataCellDisk>>,
    hypervisors: HashMap<String, (Vec<ClusterInfo>, Vec<VmInfo>)>,
    failures: HashSet<String>,
    panics: HashSet<String>,
    unknown_users: HashSet<String>,
    calls: Vec<ProbeCall>,
}

enum Injected {
    Fail,
    Panic,
}

/// In-memory `Fetcher`; clones share the same state
#[derive(Clone, Default)]
pub struct StubFetcher {
    state: Arc<Mutex<StubState>>,
}

fn key(probe: &str, target: Option<&str>) -> String {
    match target {
        Some(target) => format!("{}:{}", probe, target),
        None => probe.to_string(),
    }
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_host(self, host: Host) -> Self {
        self.state().host = host;
        self
    }

    pub fn with_filesystems(self, filesystems: Vec<Filesystem>) -> Self {
        self.state().filesystems = filesystems;
        self
    }

    pub fn with_cluster_membership(self, membership: ClusterMembershipStatus) -> Self {
        self.state().membership = membership;
        self
    }

    /// Add a database: listed in oratab under `oracle_home`, probed from `database`
    pub fn with_database(self, name: &str, oracle_home: &str, database: StubDatabase) -> Self {
        {
            let mut state = self.state();
            state.oratab.push(OratabEntry {
                db_name: name.to_string(),
                oracle_home: oracle_home.to_string(),
            });
            state.databases.insert(name.to_string(), database);
        }
        self
    }

    /// Instance names the running-instances probe returns
    pub fn with_running(self, running: &[&str]) -> Self {
        self.state().running = running.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_exadata(
        self,
        components: Vec<OracleExadataComponent>,
        cell_disks: HashMap<String, Vec<OracleExadataCellDisk>>,
    ) -> Self {
        {
            let mut state = self.state();
            state.exadata_components = components;
            state.cell_disks = cell_disks;
        }
        self
    }

    pub fn with_hypervisor(self, endpoint: &str, clusters: Vec<ClusterInfo>, vms: Vec<VmInfo>) -> Self {
        self.state().hypervisors.insert(endpoint.to_string(), (clusters, vms));
        self
    }

    /// Make `probe` fail, for one target (database name, hypervisor endpoint) or all
    pub fn fail(self, probe: &str, target: Option<&str>) -> Self {
        self.state().failures.insert(key(probe, target));
        self
    }

    /// Make `probe` panic, for one target or all
    pub fn panic_on(self, probe: &str, target: Option<&str>) -> Self {
        self.state().panics.insert(key(probe, target));
        self
    }

    /// Make `context_for(user)` fail
    pub fn unknown_user(self, user: &str) -> Self {
        self.state().unknown_users.insert(user.to_string());
        self
    }

    /// Every probe call so far, in call order
    pub fn calls(&self) -> Vec<ProbeCall> {
        self.state().calls.clone()
    }

    /// Calls of one probe
    pub fn calls_to(&self, probe: &str) -> Vec<ProbeCall> {
        self.calls().into_iter().filter(|c| c.probe == probe).collect()
    }

    /// Record the call, then apply any injected failure
    fn enter(&self, probe: &str, target: Option<&str>, ctx: &FetchContext) -> Result<(), FetchError> {
        let injected = {
            let mut state = self.state();
            state.calls.push(ProbeCall {
                probe: probe.to_string(),
                target: target.map(str::to_string),
                user: ctx.user().map(str::to_string),
            });

            let matches = |set: &HashSet<String>| {
                set.contains(probe) || target.map_or(false, |t| set.contains(&key(probe, Some(t))))
            };
            if matches(&state.panics) {
                Some(Injected::Panic)
            } else if matches(&state.failures) {
                Some(Injected::Fail)
            } else {
                None
            }
        };

        match injected {
            Some(Injected::Panic) => panic!("injected panic in probe {}", key(probe, target)),
            Some(Injected::Fail) => Err(FetchError::CommandFailed {
                command: key(probe, target),
                status: "exit status: 1".to_string(),
                stderr: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn database<T>(
        &self,
        probe: &str,
        ctx: &FetchContext,
        entry: &OratabEntry,
        pick: impl FnOnce(&StubDatabase) -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        self.enter(probe, Some(&entry.db_name), ctx)?;
        let state = self.state();
        match state.databases.get(&entry.db_name) {
            Some(database) => pick(database),
            None => Err(FetchError::CommandFailed {
                command: key(probe, Some(&entry.db_name)),
                status: "exit status: 1".to_string(),
                stderr: "ORA-01034: ORACLE not available".to_string(),
            }),
        }
    }

    fn hypervisor<T>(
        &self,
        probe: &str,
        ctx: &FetchContext,
        hypervisor: &Hypervisor,
        pick: impl FnOnce(&(Vec<ClusterInfo>, Vec<VmInfo>)) -> T,
    ) -> Result<T, FetchError> {
        self.enter(probe, Some(&hypervisor.endpoint), ctx)?;
        let state = self.state();
        state
            .hypervisors
            .get(&hypervisor.endpoint)
            .map(pick)
            .ok_or_else(|| FetchError::CommandFailed {
                command: key(probe, Some(&hypervisor.endpoint)),
                status: "exit status: 1".to_string(),
                stderr: "connection refused".to_string(),
            })
    }
}

impl Fetcher for StubFetcher {
    fn context_for(&self, user: Option<&str>) -> Result<FetchContext, FetchError> {
        match user {
            Some(user) if self.state().unknown_users.contains(user) => {
                Err(FetchError::UnknownUser(user.to_string()))
            }
            Some(user) => Ok(FetchContext::as_user(user)),
            None => Ok(FetchContext::current()),
        }
    }

    fn host(&self, ctx: &FetchContext) -> Result<Host, FetchError> {
        self.enter("host", None, ctx)?;
        Ok(self.state().host.clone())
    }

    fn filesystems(&self, ctx: &FetchContext) -> Result<Vec<Filesystem>, FetchError> {
        self.enter("filesystems", None, ctx)?;
        Ok(self.state().filesystems.clone())
    }

    fn clusters_membership_status(&self, ctx: &FetchContext) -> Result<ClusterMembershipStatus, FetchError> {
        self.enter("cluster_membership_status", None, ctx)?;
        Ok(self.state().membership.clone())
    }

    fn oracle_database_oratab_entries(&self, ctx: &FetchContext) -> Result<Vec<OratabEntry>, FetchError> {
        self.enter("oratab", None, ctx)?;
        Ok(self.state().oratab.clone())
    }

    fn oracle_database_running_databases(&self, ctx: &FetchContext) -> Result<Vec<String>, FetchError> {
        self.enter("running_databases", None, ctx)?;
        Ok(self.state().running.clone())
    }

    fn oracle_database_db_status(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<String, FetchError> {
        self.database("dbstatus", ctx, entry, |db| Ok(db.status.clone()))
    }

    fn oracle_database_mounted_db(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<OracleDatabase, FetchError> {
        self.database("dbmounted", ctx, entry, |db| Ok(db.record.clone()))
    }

    fn oracle_database_db_version(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<String, FetchError> {
        self.database("dbversion", ctx, entry, |db| Ok(db.version.clone()))
    }

    fn run_oracle_database_stats(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<(), FetchError> {
        self.database("stats", ctx, entry, |_| Ok(()))
    }

    fn oracle_database_open_db(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<OracleDatabase, FetchError> {
        self.database("db", ctx, entry, |db| Ok(db.record.clone()))
    }

    fn oracle_database_tablespaces(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
    ) -> Result<Vec<OracleDatabaseTablespace>, FetchError> {
        self.database("tablespaces", ctx, entry, |db| Ok(db.record.tablespaces.clone()))
    }

    fn oracle_database_schemas(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<Vec<OracleDatabaseSchema>, FetchError> {
        self.database("schemas", ctx, entry, |db| Ok(db.record.schemas.clone()))
    }

    fn oracle_database_patches(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        _db_version: &str,
    ) -> Result<Vec<OracleDatabasePatch>, FetchError> {
        self.database("patches", ctx, entry, |db| Ok(db.record.patches.clone()))
    }

    fn oracle_database_feature_usage_stats(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        _db_version: &str,
    ) -> Result<Vec<OracleDatabaseFeatureUsageStat>, FetchError> {
        self.database("feature_usage_stats", ctx, entry, |db| {
            Ok(db.record.feature_usage_stats.clone())
        })
    }

    fn oracle_database_licenses(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        _db_version: &str,
        _technology: &HardwareAbstractionTechnology,
    ) -> Result<Vec<License>, FetchError> {
        self.database("licenses", ctx, entry, |db| {
            db.licenses
                .clone()
                .ok_or_else(|| FetchError::Unsupported("no license script".to_string()))
        })
    }

    fn oracle_database_addms(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<Vec<OracleDatabaseAddm>, FetchError> {
        self.database("addms", ctx, entry, |db| Ok(db.record.addms.clone()))
    }

    fn oracle_database_segment_advisors(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
    ) -> Result<Vec<OracleDatabaseSegmentAdvisor>, FetchError> {
        self.database("segment_advisors", ctx, entry, |db| Ok(db.record.segment_advisors.clone()))
    }

    fn oracle_database_psus(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        _db_version: &str,
    ) -> Result<Vec<OracleDatabasePsu>, FetchError> {
        self.database("psus", ctx, entry, |db| Ok(db.record.psus.clone()))
    }

    fn oracle_database_backups(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<Vec<OracleDatabaseBackup>, FetchError> {
        self.database("backups", ctx, entry, |db| Ok(db.record.backups.clone()))
    }

    fn oracle_database_partitionings(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
    ) -> Result<Vec<OracleDatabasePartitioning>, FetchError> {
        self.database("partitionings", ctx, entry, |db| Ok(db.record.partitionings.clone()))
    }

    fn oracle_exadata_components(&self, ctx: &FetchContext) -> Result<Vec<OracleExadataComponent>, FetchError> {
        self.enter("exadata_components", None, ctx)?;
        Ok(self.state().exadata_components.clone())
    }

    fn oracle_exadata_cell_disks(
        &self,
        ctx: &FetchContext,
    ) -> Result<HashMap<String, Vec<OracleExadataCellDisk>>, FetchError> {
        self.enter("exadata_cell_disks", None, ctx)?;
        Ok(self.state().cell_disks.clone())
    }

    fn hypervisor_clusters(&self, ctx: &FetchContext, hypervisor: &Hypervisor) -> Result<Vec<ClusterInfo>, FetchError> {
        self.hypervisor("hypervisor_clusters", ctx, hypervisor, |(clusters, _)| clusters.clone())
    }

    fn hypervisor_vms(&self, ctx: &FetchContext, hypervisor: &Hypervisor) -> Result<Vec<VmInfo>, FetchError> {
        self.hypervisor("hypervisor_vms", ctx, hypervisor, |(_, vms)| vms.clone())
    }
}
