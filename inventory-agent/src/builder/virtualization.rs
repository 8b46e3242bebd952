//! Virtualization feature
//!
//! Each configured hypervisor manager is asked for its clusters and VMs in
//! its own task. A manager that can't be reached still shows up in the
//! report, as a cluster entry carrying the error message.

use crate::config::Hypervisor;
use crate::error::FetchError;
use crate::fetcher::{FetchContext, Fetcher};
use crate::model::{ClusterInfo, VmInfo};
use crate::routine::TaskGroup;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct VirtualizationCollector {
    fetcher: Arc<dyn Fetcher>,
    ctx: FetchContext,
    parallel: bool,
}

impl VirtualizationCollector {
    pub fn new(fetcher: Arc<dyn Fetcher>, ctx: FetchContext, parallel: bool) -> Self {
        Self { fetcher, ctx, parallel }
    }

    /// Clusters of every hypervisor, in configuration order
    pub async fn collect(&self, hypervisors: &[Hypervisor]) -> Vec<ClusterInfo> {
        let mut group = TaskGroup::new(self.parallel);

        for hypervisor in hypervisors {
            let fetcher = Arc::clone(&self.fetcher);
            let ctx = self.ctx.clone();
            let hv = hypervisor.clone();
            group.spawn_blocking(hypervisor.endpoint.clone(), move || {
                let clusters = fetcher.hypervisor_clusters(&ctx, &hv)?;
                let vms = fetcher.hypervisor_vms(&ctx, &hv)?;
                Ok::<_, FetchError>(attach_vms(clusters, vms, hv.hypervisor_type.as_str()))
            });
        }

        let mut clusters = Vec::new();
        for (hypervisor, result) in hypervisors.iter().zip(group.join_all().await) {
            let message = match result {
                Ok(Ok(found)) => {
                    debug!("Hypervisor {} reported {} clusters", hypervisor.endpoint, found.len());
                    clusters.extend(found);
                    continue;
                }
                Ok(Err(e)) => {
                    warn!("Unable to query hypervisor {}: {}", hypervisor.endpoint, e);
                    e.to_string()
                }
                Err(failure) => {
                    error!("{}", failure);
                    failure.to_string()
                }
            };
            clusters.push(ClusterInfo {
                fetch_error_message: Some(message),
                cluster_type: hypervisor.hypervisor_type.as_str().to_string(),
                name: hypervisor.endpoint.clone(),
                ..Default::default()
            });
        }
        clusters
    }
}

/// Put every VM under the cluster it names
///
/// VMs naming an unknown cluster are grouped under a new cluster entry of
/// that name.
fn attach_vms(mut clusters: Vec<ClusterInfo>, vms: Vec<VmInfo>, cluster_type: &str) -> Vec<ClusterInfo> {
    for vm in vms {
        match clusters.iter_mut().find(|c| c.name == vm.cluster_name) {
            Some(cluster) => cluster.vms.push(vm),
            None => clusters.push(ClusterInfo {
                cluster_type: cluster_type.to_string(),
                name: vm.cluster_name.clone(),
                vms: vec![vm],
                ..Default::default()
            }),
        }
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(cluster: &str, name: &str) -> VmInfo {
        VmInfo {
            cluster_name: cluster.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_attach_vms_by_cluster_name() {
        let clusters = vec![
            ClusterInfo { name: "prod".to_string(), cluster_type: "vmware".to_string(), ..Default::default() },
            ClusterInfo { name: "test".to_string(), cluster_type: "vmware".to_string(), ..Default::default() },
        ];
        let vms = vec![vm("prod", "db01"), vm("test", "app01"), vm("prod", "db02"), vm("lab", "x01")];

        let clusters = attach_vms(clusters, vms, "vmware");
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].vms.len(), 2);
        assert_eq!(clusters[1].vms[0].name, "app01");
        assert_eq!(clusters[2].name, "lab");
        assert_eq!(clusters[2].cluster_type, "vmware");
    }
}
