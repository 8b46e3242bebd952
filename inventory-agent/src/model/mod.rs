//! Report data model
//!
//! `HostReport` is the root document produced by one collection run:
//! - host identity, filesystems and cluster membership (always collected)
//! - per-feature sub-reports, absent when the feature is disabled
//!
//! Every sequence serializes as `[]` when nothing was collected.

mod exadata;
mod host;
mod oracle;
mod virtualization;

pub use exadata::{OracleExadataCellDisk, OracleExadataComponent, OracleExadataFeature};
pub use host::{ClusterMembershipStatus, Filesystem, HardwareAbstractionTechnology, Host};
pub use oracle::{
    DatabaseStatus, Edition, License, OracleDatabase, OracleDatabaseAddm, OracleDatabaseBackup,
    OracleDatabaseFeature, OracleDatabaseFeatureUsageStat, OracleDatabasePartitioning,
    OracleDatabasePatch, OracleDatabasePluggableDatabase, OracleDatabasePsu, OracleDatabaseSchema,
    OracleDatabaseSegmentAdvisor, OracleDatabaseService, OracleDatabaseTablespace, OratabEntry,
};
pub use virtualization::{ClusterInfo, VmInfo};

use serde::{Deserialize, Serialize};

/// Version of the report layout
pub const SCHEMA_VERSION: u32 = 1;

/// Everything collected about one host during one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostReport {
    pub hostname: String,
    pub location: String,
    pub environment: String,
    pub tags: Vec<String>,
    pub agent_version: String,
    pub schema_version: u32,
    pub period: u32,
    pub info: Host,
    pub cluster_membership_status: ClusterMembershipStatus,
    pub features: Features,
    pub filesystems: Vec<Filesystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<Vec<ClusterInfo>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle: Option<OracleFeature>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<OracleDatabaseFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exadata: Option<OracleExadataFeature>,
}

impl Features {
    /// Oracle section, created on first use
    pub fn oracle_mut(&mut self) -> &mut OracleFeature {
        self.oracle.get_or_insert_with(OracleFeature::default)
    }
}

impl HostReport {
    pub fn new(agent_version: impl Into<String>) -> Self {
        Self {
            hostname: String::new(),
            location: String::new(),
            environment: String::new(),
            tags: Vec::new(),
            agent_version: agent_version.into(),
            schema_version: SCHEMA_VERSION,
            period: 0,
            info: Host::default(),
            cluster_membership_status: ClusterMembershipStatus::default(),
            features: Features::default(),
            filesystems: Vec::new(),
            clusters: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_features_are_omitted() {
        let report = HostReport::new("1.0.0");
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("clusters").is_none());
        assert_eq!(json["features"], serde_json::json!({}));
        assert_eq!(json["filesystems"], serde_json::json!([]));
        assert_eq!(json["tags"], serde_json::json!([]));
        assert_eq!(json["schemaVersion"], 1);
    }

    #[test]
    fn test_oracle_mut_keeps_existing_section() {
        let mut features = Features::default();
        features.oracle_mut().exadata = Some(OracleExadataFeature::default());
        features.oracle_mut().database = Some(OracleDatabaseFeature::default());

        let oracle = features.oracle.unwrap();
        assert!(oracle.exadata.is_some());
        assert!(oracle.database.is_some());
    }
}
