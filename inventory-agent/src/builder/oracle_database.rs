//! Oracle database feature
//!
//! One `DatabaseCollector` run per oratab entry. An instance is probed for
//! its status first:
//! - open (READ WRITE / READ ONLY): descriptor plus every sub-collection,
//!   sub-probes fanned out and joined
//! - mounted: descriptor only, licenses computed from the host topology
//! - anything else: skipped with a warning

use super::probe;
use crate::error::{FetchError, ProbeError};
use crate::fetcher::{FetchContext, Fetcher};
use crate::license::{licenses_for_host, normalize_licenses};
use crate::model::{
    DatabaseStatus, HardwareAbstractionTechnology, Host, License, OracleDatabase, OracleDatabaseAddm,
    OracleDatabaseBackup, OracleDatabaseFeature, OracleDatabaseFeatureUsageStat,
    OracleDatabasePartitioning, OracleDatabasePatch, OracleDatabasePluggableDatabase, OracleDatabasePsu,
    OracleDatabaseSchema, OracleDatabaseSegmentAdvisor, OracleDatabaseTablespace, OratabEntry,
};
use crate::routine::TaskGroup;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Host topology the license rules need
#[derive(Debug, Clone, PartialEq)]
pub struct HostFacts {
    pub technology: HardwareAbstractionTechnology,
    pub cpu_sockets: u32,
    pub cpu_cores: u32,
}

impl From<&Host> for HostFacts {
    fn from(host: &Host) -> Self {
        Self {
            technology: host.hardware_abstraction_technology.clone(),
            cpu_sockets: host.cpu_sockets,
            cpu_cores: host.cpu_cores,
        }
    }
}

impl HostFacts {
    fn licenses(&self, database: &OracleDatabase) -> Vec<License> {
        licenses_for_host(database.edition(), &self.technology, self.cpu_sockets, self.cpu_cores)
    }
}

/// Result of one sub-probe of an open database
enum Collected {
    Pdbs(Vec<OracleDatabasePluggableDatabase>),
    Tablespaces(Vec<OracleDatabaseTablespace>),
    Schemas(Vec<OracleDatabaseSchema>),
    Patches(Vec<OracleDatabasePatch>),
    FeatureUsageStats(Vec<OracleDatabaseFeatureUsageStat>),
    Licenses(Vec<License>),
    Addms(Vec<OracleDatabaseAddm>),
    SegmentAdvisors(Vec<OracleDatabaseSegmentAdvisor>),
    Psus(Vec<OracleDatabasePsu>),
    Backups(Vec<OracleDatabaseBackup>),
    Partitionings(Vec<OracleDatabasePartitioning>),
}

/// Builds the record of a single database instance
#[derive(Clone)]
pub struct DatabaseCollector {
    fetcher: Arc<dyn Fetcher>,
    ctx: FetchContext,
    host: HostFacts,
    parallel: bool,
    force_stats: bool,
}

impl DatabaseCollector {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        ctx: FetchContext,
        host: HostFacts,
        parallel: bool,
        force_stats: bool,
    ) -> Self {
        Self { fetcher, ctx, host, parallel, force_stats }
    }

    /// Probe one oratab entry; `None` when the instance is dropped
    pub async fn collect(&self, entry: OratabEntry) -> Option<OracleDatabase> {
        let status = match self
            .probe_entry("dbstatus", &entry, |f, ctx, e| f.oracle_database_db_status(ctx, e))
            .await
        {
            Ok(status) => DatabaseStatus::from(status),
            Err(e) => {
                warn!(
                    db = %entry.db_name,
                    oracle_home = %entry.oracle_home,
                    "Unable to get database status: {}", e
                );
                return None;
            }
        };

        let database = if status.is_open() {
            self.collect_open(&entry).await
        } else if status.is_mounted() {
            self.collect_mounted(&entry).await
        } else {
            warn!(
                db = %entry.db_name,
                oracle_home = %entry.oracle_home,
                "Unknown database status [{}], skipping", status
            );
            None
        };

        database.map(|mut database| {
            database.status = status;
            database
        })
    }

    async fn collect_mounted(&self, entry: &OratabEntry) -> Option<OracleDatabase> {
        let mut database = match self
            .probe_entry("dbmounted", entry, |f, ctx, e| f.oracle_database_mounted_db(ctx, e))
            .await
        {
            Ok(database) => database,
            Err(e) => {
                warn!(db = %entry.db_name, "Unable to describe mounted database: {}", e);
                return None;
            }
        };

        database.clear_collections();
        database.licenses = self.host.licenses(&database);
        Some(database)
    }

    async fn collect_open(&self, entry: &OratabEntry) -> Option<OracleDatabase> {
        let version = match self
            .probe_entry("dbversion", entry, |f, ctx, e| f.oracle_database_db_version(ctx, e))
            .await
        {
            Ok(version) => version,
            Err(e) => {
                warn!(db = %entry.db_name, "Unable to get database version: {}", e);
                return None;
            }
        };

        if self.force_stats {
            if let Err(e) = self
                .probe_entry("stats", entry, |f, ctx, e| f.run_oracle_database_stats(ctx, e))
                .await
            {
                warn!(db = %entry.db_name, "Statistics refresh failed: {}", e);
            }
        }

        let mut database = match self
            .probe_entry("db", entry, |f, ctx, e| f.oracle_database_open_db(ctx, e))
            .await
        {
            Ok(database) => database,
            Err(e) => {
                warn!(db = %entry.db_name, "Unable to describe open database: {}", e);
                return None;
            }
        };
        database.clear_collections();
        database.licenses = Vec::new();

        let mut group = TaskGroup::new(self.parallel);
        group.spawn("pdbs", async { Ok(Collected::Pdbs(Vec::new())) });
        self.spawn_sub_probe(&mut group, "tablespaces", entry, |f, ctx, e| {
            f.oracle_database_tablespaces(ctx, e).map(Collected::Tablespaces)
        });
        self.spawn_sub_probe(&mut group, "schemas", entry, |f, ctx, e| {
            f.oracle_database_schemas(ctx, e).map(Collected::Schemas)
        });
        let v = version.clone();
        self.spawn_sub_probe(&mut group, "patches", entry, move |f, ctx, e| {
            f.oracle_database_patches(ctx, e, &v).map(Collected::Patches)
        });
        let v = version.clone();
        self.spawn_sub_probe(&mut group, "feature_usage_stats", entry, move |f, ctx, e| {
            f.oracle_database_feature_usage_stats(ctx, e, &v)
                .map(Collected::FeatureUsageStats)
        });
        let v = version.clone();
        let technology = self.host.technology.clone();
        self.spawn_sub_probe(&mut group, "licenses", entry, move |f, ctx, e| {
            f.oracle_database_licenses(ctx, e, &v, &technology)
                .map(Collected::Licenses)
        });
        self.spawn_sub_probe(&mut group, "addms", entry, |f, ctx, e| {
            f.oracle_database_addms(ctx, e).map(Collected::Addms)
        });
        self.spawn_sub_probe(&mut group, "segment_advisors", entry, |f, ctx, e| {
            f.oracle_database_segment_advisors(ctx, e)
                .map(Collected::SegmentAdvisors)
        });
        let v = version;
        self.spawn_sub_probe(&mut group, "psus", entry, move |f, ctx, e| {
            f.oracle_database_psus(ctx, e, &v).map(Collected::Psus)
        });
        self.spawn_sub_probe(&mut group, "backups", entry, |f, ctx, e| {
            f.oracle_database_backups(ctx, e).map(Collected::Backups)
        });
        self.spawn_sub_probe(&mut group, "partitionings", entry, |f, ctx, e| {
            f.oracle_database_partitionings(ctx, e)
                .map(Collected::Partitionings)
        });

        let mut licenses = None;
        for (label, result) in group.join_all_labeled().await {
            match result {
                Ok(Ok(collected)) => match collected {
                    Collected::Pdbs(v) => database.pdbs = v,
                    Collected::Tablespaces(v) => database.tablespaces = v,
                    Collected::Schemas(v) => database.schemas = v,
                    Collected::Patches(v) => database.patches = v,
                    Collected::FeatureUsageStats(v) => database.feature_usage_stats = v,
                    Collected::Licenses(v) => licenses = Some(v),
                    Collected::Addms(v) => database.addms = v,
                    Collected::SegmentAdvisors(v) => database.segment_advisors = v,
                    Collected::Psus(v) => database.psus = v,
                    Collected::Backups(v) => database.backups = v,
                    Collected::Partitionings(v) => database.partitionings = v,
                },
                Ok(Err(FetchError::Unsupported(reason))) => {
                    debug!(db = %entry.db_name, probe = %label, "Not available: {}", reason);
                }
                Ok(Err(e)) => {
                    warn!(db = %entry.db_name, probe = %label, "Sub-probe failed, left empty: {}", e);
                }
                Err(failure) => {
                    error!(db = %entry.db_name, "{}", failure);
                }
            }
        }

        database.licenses = match licenses {
            Some(licenses) => normalize_licenses(&licenses),
            None => self.host.licenses(&database),
        };
        Some(database)
    }

    async fn probe_entry<T, F>(&self, label: &str, entry: &OratabEntry, fetch: F) -> Result<T, ProbeError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Fetcher, &FetchContext, &OratabEntry) -> Result<T, FetchError> + Send + 'static,
    {
        let entry = entry.clone();
        probe(&self.fetcher, &self.ctx, label, move |f, ctx| fetch(f, ctx, &entry)).await
    }

    fn spawn_sub_probe<F>(
        &self,
        group: &mut TaskGroup<Result<Collected, FetchError>>,
        label: &str,
        entry: &OratabEntry,
        fetch: F,
    ) where
        F: FnOnce(&dyn Fetcher, &FetchContext, &OratabEntry) -> Result<Collected, FetchError> + Send + 'static,
    {
        let fetcher = Arc::clone(&self.fetcher);
        let ctx = self.ctx.clone();
        let entry = entry.clone();
        group.spawn_blocking(label, move || fetch(fetcher.as_ref(), &ctx, &entry));
    }
}

/// Builds the whole database sub-report
pub struct OracleDatabaseCollector {
    fetcher: Arc<dyn Fetcher>,
    ctx: FetchContext,
    parallel: bool,
    force_stats: bool,
}

impl OracleDatabaseCollector {
    pub fn new(fetcher: Arc<dyn Fetcher>, ctx: FetchContext, parallel: bool, force_stats: bool) -> Self {
        Self { fetcher, ctx, parallel, force_stats }
    }

    pub async fn collect(&self, host: &Host) -> OracleDatabaseFeature {
        let entries = probe(&self.fetcher, &self.ctx, "oratab", |f, ctx| {
            f.oracle_database_oratab_entries(ctx)
        })
        .await
        .unwrap_or_else(|e| {
            error!("Unable to read oratab entries: {}", e);
            Vec::new()
        });

        let running = probe(&self.fetcher, &self.ctx, "running_databases", |f, ctx| {
            f.oracle_database_running_databases(ctx)
        })
        .await
        .unwrap_or_else(|e| {
            warn!("Unable to list running databases: {}", e);
            Vec::new()
        });

        let unlisted = unlisted_running_databases(&entries, &running);
        if !unlisted.is_empty() {
            warn!("Running databases missing from oratab: {:?}", unlisted);
        }

        OracleDatabaseFeature {
            unlisted_running_databases: unlisted,
            databases: self.collect_databases(&entries, HostFacts::from(host)).await,
        }
    }

    async fn collect_databases(&self, entries: &[OratabEntry], host: HostFacts) -> Vec<OracleDatabase> {
        let collector = DatabaseCollector::new(
            Arc::clone(&self.fetcher),
            self.ctx.clone(),
            host,
            self.parallel,
            self.force_stats,
        );

        let mut group = TaskGroup::new(self.parallel);
        for entry in entries {
            debug!("Oratab entry: [{}] [{}]", entry.db_name, entry.oracle_home);
            let collector = collector.clone();
            let entry = entry.clone();
            group.spawn(entry.db_name.clone(), async move { collector.collect(entry).await });
        }

        group
            .join_all()
            .await
            .into_iter()
            .filter_map(|result| match result {
                Ok(database) => database,
                Err(failure) => {
                    error!("{}", failure);
                    None
                }
            })
            .collect()
    }
}

/// Running instance names not listed in oratab, in probe order, without duplicates
pub fn unlisted_running_databases(entries: &[OratabEntry], running: &[String]) -> Vec<String> {
    let listed: HashSet<&str> = entries.iter().map(|e| e.db_name.as_str()).collect();
    let mut seen = HashSet::new();

    running
        .iter()
        .filter(|name| !listed.contains(name.as_str()))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}
