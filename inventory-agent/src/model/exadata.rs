use serde::{Deserialize, Serialize};

/// Oracle/Exadata sub-report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleExadataFeature {
    pub components: Vec<OracleExadataComponent>,
}

/// One server of the Exadata rack (database node, storage cell, switch)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleExadataComponent {
    pub hostname: String,
    pub server_type: String,
    pub model: String,
    pub sw_version: String,
    pub sw_release_date: String,
    #[serde(rename = "runningCPUCount")]
    pub running_cpu_count: i64,
    #[serde(rename = "totalCPUCount")]
    pub total_cpu_count: i64,
    pub memory: i64,
    pub status: String,
    pub running_power_supply: i64,
    pub total_power_supply: i64,
    pub power_status: String,
    pub running_fan_count: i64,
    pub total_fan_count: i64,
    pub fan_status: String,
    pub temp_actual: f64,
    pub temp_status: String,
    pub cellsrv_service_status: String,
    pub ms_service_status: String,
    pub rs_service_status: String,
    pub flashcache_mode: String,
    /// Only storage servers carry cell disks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_disks: Option<Vec<OracleExadataCellDisk>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleExadataCellDisk {
    pub name: String,
    pub status: String,
    pub err_count: i64,
    pub used_perc: i64,
}
