use serde::{Deserialize, Serialize};
use std::fmt;

/// Host identity and hardware topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Host {
    pub hostname: String,
    pub cpu_model: String,
    pub cpu_frequency: String,
    pub cpu_sockets: u32,
    pub cpu_cores: u32,
    pub cpu_threads: u32,
    pub threads_per_core: u32,
    pub cores_per_socket: u32,
    pub hardware_abstraction: String,
    pub hardware_abstraction_technology: HardwareAbstractionTechnology,
    pub kernel: String,
    pub kernel_version: String,
    pub os: String,
    pub os_version: String,
    /// GiB
    pub memory_total: f64,
    /// GiB
    pub swap_total: f64,
}

/// One mounted filesystem
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filesystem {
    pub filesystem: String,
    #[serde(rename = "type")]
    pub fs_type: String,
    pub mount_point: String,
    /// Bytes
    pub size: u64,
    pub used_space: u64,
    pub available_space: u64,
}

/// Which cluster software the host is a member of
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMembershipStatus {
    pub oracle_clusterware: bool,
    pub veritas_cluster_server: bool,
    pub sun_cluster: bool,
    pub hacmp: bool,
}

/// Virtualization layer the host runs on
///
/// Values outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HardwareAbstractionTechnology {
    Ovm,
    Vmware,
    VmOther,
    Physical,
    Other(String),
}

impl HardwareAbstractionTechnology {
    pub fn as_str(&self) -> &str {
        match self {
            HardwareAbstractionTechnology::Ovm => "OVM",
            HardwareAbstractionTechnology::Vmware => "VMWARE",
            HardwareAbstractionTechnology::VmOther => "VM-OTHER",
            HardwareAbstractionTechnology::Physical => "PHYSICAL",
            HardwareAbstractionTechnology::Other(value) => value,
        }
    }

    pub fn is_virtualized(&self) -> bool {
        matches!(
            self,
            HardwareAbstractionTechnology::Ovm
                | HardwareAbstractionTechnology::Vmware
                | HardwareAbstractionTechnology::VmOther
        )
    }
}

impl Default for HardwareAbstractionTechnology {
    fn default() -> Self {
        HardwareAbstractionTechnology::Other(String::new())
    }
}

impl From<String> for HardwareAbstractionTechnology {
    fn from(value: String) -> Self {
        match value.trim().to_uppercase().as_str() {
            "OVM" => HardwareAbstractionTechnology::Ovm,
            "VMWARE" => HardwareAbstractionTechnology::Vmware,
            "VM-OTHER" | "VMOTHER" => HardwareAbstractionTechnology::VmOther,
            "PHYSICAL" | "PH" => HardwareAbstractionTechnology::Physical,
            _ => HardwareAbstractionTechnology::Other(value),
        }
    }
}

impl From<&str> for HardwareAbstractionTechnology {
    fn from(value: &str) -> Self {
        HardwareAbstractionTechnology::from(value.to_string())
    }
}

impl From<HardwareAbstractionTechnology> for String {
    fn from(value: HardwareAbstractionTechnology) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for HardwareAbstractionTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
