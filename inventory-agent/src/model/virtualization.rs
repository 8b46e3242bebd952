use serde::{Deserialize, Serialize};

/// A cluster (or standalone hypervisor) reported by a hypervisor manager
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_error_message: Option<String>,
    #[serde(rename = "type")]
    pub cluster_type: String,
    pub name: String,
    pub cpu: i64,
    pub sockets: i64,
    pub vms: Vec<VmInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmInfo {
    pub cluster_name: String,
    pub name: String,
    pub hostname: String,
    pub physical_host: String,
    #[serde(rename = "cappedCPU")]
    pub capped_cpu: bool,
    pub virtualization_node: String,
}
