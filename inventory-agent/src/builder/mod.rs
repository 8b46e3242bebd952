//! Report orchestration
//!
//! `HostReportBuilder::run` drives one collection:
//! 1. Base host facts, filesystems and cluster membership (always, as the
//!    current user, each defaulting on failure)
//! 2. Enabled features in a fixed order: database, exadata, virtualization,
//!    each with its own probing user
//!
//! Only a failed user switch or unmet exadata preconditions abort the run.

mod exadata;
mod oracle_database;
mod virtualization;

pub use exadata::ExadataCollector;
pub use oracle_database::{unlisted_running_databases, DatabaseCollector, HostFacts, OracleDatabaseCollector};
pub use virtualization::VirtualizationCollector;

use crate::config::Configuration;
use crate::error::{BuildError, FetchError, ProbeError};
use crate::fetcher::{FetchContext, Fetcher};
use crate::model::HostReport;
use crate::platform::Platform;
use crate::routine::run_blocking;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Run one probe on the blocking pool
pub(crate) async fn probe<T, F>(
    fetcher: &Arc<dyn Fetcher>,
    ctx: &FetchContext,
    label: &str,
    fetch: F,
) -> Result<T, ProbeError>
where
    T: Send + 'static,
    F: FnOnce(&dyn Fetcher, &FetchContext) -> Result<T, FetchError> + Send + 'static,
{
    let fetcher = Arc::clone(fetcher);
    let ctx = ctx.clone();
    run_blocking(label, move || fetch(fetcher.as_ref(), &ctx))
        .await?
        .map_err(ProbeError::from)
}

pub struct HostReportBuilder {
    fetcher: Arc<dyn Fetcher>,
    config: Configuration,
    platform: Platform,
}

impl HostReportBuilder {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: Configuration, platform: Platform) -> Self {
        Self { fetcher, config, platform }
    }

    /// Collect every enabled feature into a single report
    pub async fn run(&self) -> Result<HostReport, BuildError> {
        let mut report = HostReport::new(env!("CARGO_PKG_VERSION"));
        report.location = self.config.location.clone();
        report.environment = self.config.environment.clone();
        report.tags = self.config.tags.clone();
        report.period = self.config.period;

        self.collect_base(&mut report).await;

        let features = &self.config.features;

        if features.oracle_database.enabled {
            let feature = &features.oracle_database;
            debug!("Oracle database mode enabled (user='{}')", feature.fetcher_user);
            let ctx = self.switch_user(&feature.fetcher_user)?;

            let collector = OracleDatabaseCollector::new(
                Arc::clone(&self.fetcher),
                ctx,
                self.config.parallelize_requests,
                feature.force_stats,
            );
            report.features.oracle_mut().database = Some(collector.collect(&report.info).await);
        }

        if features.oracle_exadata.enabled {
            let feature = &features.oracle_exadata;
            debug!("Oracle exadata mode enabled (user='{}')", feature.fetcher_user);
            let ctx = self.switch_user(&feature.fetcher_user)?;
            self.check_exadata_preconditions()?;

            let collector = ExadataCollector::new(Arc::clone(&self.fetcher), ctx);
            report.features.oracle_mut().exadata = Some(collector.collect().await);
        }

        if features.virtualization.enabled {
            let feature = &features.virtualization;
            debug!("Virtualization mode enabled (user='{}')", feature.fetcher_user);
            let ctx = self.switch_user(&feature.fetcher_user)?;

            let collector = VirtualizationCollector::new(
                Arc::clone(&self.fetcher),
                ctx,
                self.config.parallelize_requests,
            );
            report.clusters = Some(collector.collect(&feature.hypervisors).await);
        }

        info!("Report built for host {}", report.hostname);
        Ok(report)
    }

    async fn collect_base(&self, report: &mut HostReport) {
        let ctx = FetchContext::current();

        report.info = probe(&self.fetcher, &ctx, "host", |f, ctx| f.host(ctx))
            .await
            .unwrap_or_else(|e| {
                error!("Unable to get host info: {}", e);
                Default::default()
            });

        report.filesystems = probe(&self.fetcher, &ctx, "filesystems", |f, ctx| f.filesystems(ctx))
            .await
            .unwrap_or_else(|e| {
                error!("Unable to get filesystems: {}", e);
                Vec::new()
            });

        report.cluster_membership_status =
            probe(&self.fetcher, &ctx, "cluster_membership_status", |f, ctx| {
                f.clusters_membership_status(ctx)
            })
            .await
            .unwrap_or_else(|e| {
                warn!("Unable to get cluster membership status: {}", e);
                Default::default()
            });

        report.hostname = match self.config.hostname_override() {
            Some(hostname) => hostname.to_string(),
            None => report.info.hostname.clone(),
        };
    }

    /// Context for a feature's probes
    ///
    /// Outside Linux the requested user is ignored and probes run as the
    /// current user.
    fn switch_user(&self, user: &str) -> Result<FetchContext, BuildError> {
        let user = user.trim();

        if !self.platform.is_linux() {
            if !user.is_empty() {
                error!(
                    "Can't set user [{}] for fetchers on {}, probing as the current user",
                    user, self.platform.os
                );
            }
            return Ok(FetchContext::current());
        }

        let requested = Some(user).filter(|u| !u.is_empty());
        self.fetcher.context_for(requested).map_err(|source| BuildError::UserSwitch {
            user: requested.unwrap_or("<current>").to_string(),
            source,
        })
    }

    fn check_exadata_preconditions(&self) -> Result<(), BuildError> {
        if !self.platform.is_linux() {
            return Err(BuildError::ExadataUnsupportedOs {
                os: self.platform.os.clone(),
            });
        }
        if !self.platform.is_root {
            return Err(BuildError::ExadataRequiresRoot);
        }
        Ok(())
    }
}
