use serde::{Deserialize, Serialize};
use std::fmt;

/// One database instance configured on the host (an oratab line)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OratabEntry {
    pub db_name: String,
    pub oracle_home: String,
}

/// Open mode reported by an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DatabaseStatus {
    ReadWrite,
    ReadOnly,
    Mounted,
    ReadOnlyWithApply,
    Unknown(String),
}

impl DatabaseStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DatabaseStatus::ReadWrite => "READ WRITE",
            DatabaseStatus::ReadOnly => "READ ONLY",
            DatabaseStatus::Mounted => "MOUNTED",
            DatabaseStatus::ReadOnlyWithApply => "READ ONLY WITH APPLY",
            DatabaseStatus::Unknown(value) => value,
        }
    }

    /// Open for queries: every sub-probe can run
    pub fn is_open(&self) -> bool {
        matches!(self, DatabaseStatus::ReadWrite | DatabaseStatus::ReadOnly)
    }

    /// Mounted or applying redo: only the minimal descriptor is available
    pub fn is_mounted(&self) -> bool {
        matches!(self, DatabaseStatus::Mounted | DatabaseStatus::ReadOnlyWithApply)
    }
}

impl Default for DatabaseStatus {
    fn default() -> Self {
        DatabaseStatus::Unknown(String::new())
    }
}

impl From<String> for DatabaseStatus {
    fn from(value: String) -> Self {
        match value.trim() {
            "READ WRITE" => DatabaseStatus::ReadWrite,
            "READ ONLY" => DatabaseStatus::ReadOnly,
            "MOUNTED" => DatabaseStatus::Mounted,
            "READ ONLY WITH APPLY" => DatabaseStatus::ReadOnlyWithApply,
            _ => DatabaseStatus::Unknown(value),
        }
    }
}

impl From<&str> for DatabaseStatus {
    fn from(value: &str) -> Self {
        DatabaseStatus::from(value.to_string())
    }
}

impl From<DatabaseStatus> for String {
    fn from(value: DatabaseStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DatabaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Oracle database edition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edition {
    #[serde(rename = "EXE")]
    Extreme,
    #[serde(rename = "ENT")]
    Enterprise,
    #[serde(rename = "STD")]
    Standard,
}

impl Edition {
    /// Every edition, in license report order
    pub const ALL: [Edition; 3] = [Edition::Extreme, Edition::Enterprise, Edition::Standard];

    /// Derive the edition from a free-text version banner
    pub fn from_version(version: &str) -> Self {
        let version = version.to_uppercase();
        if version.contains("ENTERPRISE") {
            Edition::Enterprise
        } else if version.contains("EXTREME") {
            Edition::Extreme
        } else {
            Edition::Standard
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Edition::Extreme => "EXE",
            Edition::Enterprise => "ENT",
            Edition::Standard => "STD",
        }
    }

    /// Name of the license entry counting this edition
    pub fn license_name(&self) -> &'static str {
        match self {
            Edition::Extreme => "Oracle EXE",
            Edition::Enterprise => "Oracle ENT",
            Edition::Standard => "Oracle STD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    pub count: f64,
}

/// Full inventory of one database instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OracleDatabase {
    pub instance_number: u32,
    pub instance_name: String,
    pub name: String,
    pub unique_name: String,
    pub status: DatabaseStatus,
    #[serde(rename = "dbID")]
    pub db_id: u64,
    pub role: String,
    #[serde(rename = "isCDB")]
    pub is_cdb: bool,
    pub version: String,
    pub platform: String,
    pub archivelog: bool,
    pub charset: String,
    pub n_charset: String,
    pub block_size: u32,
    pub cpu_count: u32,
    pub sga_target: f64,
    pub pga_target: f64,
    pub memory_target: f64,
    pub sga_max_size: f64,
    pub segments_size: f64,
    pub datafile_size: f64,
    pub allocable: f64,
    pub elapsed: Option<f64>,
    pub db_time: Option<f64>,
    #[serde(rename = "dailyCPUUsage")]
    pub daily_cpu_usage: Option<f64>,
    pub work: Option<f64>,
    pub asm: bool,
    pub dataguard: bool,
    pub patches: Vec<OracleDatabasePatch>,
    pub tablespaces: Vec<OracleDatabaseTablespace>,
    pub schemas: Vec<OracleDatabaseSchema>,
    pub licenses: Vec<License>,
    pub addms: Vec<OracleDatabaseAddm>,
    pub segment_advisors: Vec<OracleDatabaseSegmentAdvisor>,
    pub psus: Vec<OracleDatabasePsu>,
    pub backups: Vec<OracleDatabaseBackup>,
    pub feature_usage_stats: Vec<OracleDatabaseFeatureUsageStat>,
    pub pdbs: Vec<OracleDatabasePluggableDatabase>,
    pub services: Vec<OracleDatabaseService>,
    pub partitionings: Vec<OracleDatabasePartitioning>,
}

impl OracleDatabase {
    pub fn edition(&self) -> Edition {
        Edition::from_version(&self.version)
    }

    /// Reset every sub-collection except licenses
    pub fn clear_collections(&mut self) {
        self.patches = Vec::new();
        self.tablespaces = Vec::new();
        self.schemas = Vec::new();
        self.addms = Vec::new();
        self.segment_advisors = Vec::new();
        self.psus = Vec::new();
        self.backups = Vec::new();
        self.feature_usage_stats = Vec::new();
        self.pdbs = Vec::new();
        self.services = Vec::new();
        self.partitionings = Vec::new();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseTablespace {
    pub name: String,
    pub max_size: f64,
    pub total: f64,
    pub used: f64,
    pub used_perc: f64,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseSchema {
    pub user: String,
    pub total: f64,
    pub tables: f64,
    pub indexes: f64,
    pub lob: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabasePatch {
    pub version: String,
    #[serde(rename = "patchID")]
    pub patch_id: i64,
    pub action: String,
    pub description: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseFeatureUsageStat {
    pub product: String,
    pub feature: String,
    pub detected_usages: i64,
    pub currently_used: bool,
    pub first_usage_date: String,
    pub last_usage_date: String,
    pub extra_feature_info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseAddm {
    pub finding: String,
    pub recommendation: String,
    pub action: String,
    pub benefit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseSegmentAdvisor {
    pub segment_owner: String,
    pub segment_name: String,
    pub segment_type: String,
    pub partition_name: String,
    pub reclaimable: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabasePsu {
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseBackup {
    pub backup_type: String,
    pub hour: String,
    pub week_days: Vec<String>,
    pub avg_bck_size: f64,
    pub retention: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabasePluggableDatabase {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseService {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabasePartitioning {
    pub owner: String,
    pub segment_name: String,
    pub partition_name: String,
    pub segment_type: String,
    pub mb: f64,
}

/// Oracle/Database sub-report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleDatabaseFeature {
    pub unlisted_running_databases: Vec<String>,
    pub databases: Vec<OracleDatabase>,
}
