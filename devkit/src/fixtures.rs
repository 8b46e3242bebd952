/*!
Realistic probe data for tests
*/

use crate::fetcher_stub::StubDatabase;
use inventory_agent::config::{Hypervisor, HypervisorType};
use inventory_agent::model::{
    ClusterInfo, Filesystem, HardwareAbstractionTechnology, Host, License, OracleDatabase,
    OracleDatabaseAddm, OracleDatabaseBackup, OracleDatabaseFeatureUsageStat, OracleDatabasePartitioning,
    OracleDatabasePatch, OracleDatabasePsu, OracleDatabaseSchema, OracleDatabaseSegmentAdvisor,
    OracleDatabaseTablespace, OracleExadataCellDisk, OracleExadataComponent, VmInfo,
};
use std::collections::HashMap;

pub const ENTERPRISE_VERSION: &str = "Oracle Database 19c Enterprise Edition Release 19.0.0.0.0 - Production";
pub const STANDARD_VERSION: &str = "Oracle Database 19c Standard Edition 2 Release 19.0.0.0.0 - Production";

/// Bare-metal host: 2 sockets, 16 cores
pub fn physical_host(hostname: &str) -> Host {
    Host {
        hostname: hostname.to_string(),
        cpu_model: "Intel(R) Xeon(R) Gold 6230 CPU @ 2.10GHz".to_string(),
        cpu_frequency: "2.10GHz".to_string(),
        cpu_sockets: 2,
        cpu_cores: 16,
        cpu_threads: 32,
        threads_per_core: 2,
        cores_per_socket: 8,
        hardware_abstraction: "PH".to_string(),
        hardware_abstraction_technology: HardwareAbstractionTechnology::Physical,
        kernel: "Linux".to_string(),
        kernel_version: "5.4.17-2136.307.3.1.el8uek.x86_64".to_string(),
        os: "Oracle Linux Server".to_string(),
        os_version: "8.6".to_string(),
        memory_total: 251.0,
        swap_total: 16.0,
    }
}

/// Host with a given virtualization technology: 1 socket, 8 cores
pub fn virtual_host(hostname: &str, technology: HardwareAbstractionTechnology) -> Host {
    Host {
        hostname: hostname.to_string(),
        cpu_model: "Intel(R) Xeon(R) CPU E5-2690 v4 @ 2.60GHz".to_string(),
        cpu_frequency: "2.60GHz".to_string(),
        cpu_sockets: 1,
        cpu_cores: 8,
        cpu_threads: 8,
        threads_per_core: 1,
        cores_per_socket: 8,
        hardware_abstraction: "VIRT".to_string(),
        hardware_abstraction_technology: technology,
        kernel: "Linux".to_string(),
        kernel_version: "4.18.0-372.9.1.el8.x86_64".to_string(),
        os: "Red Hat Enterprise Linux".to_string(),
        os_version: "8.6".to_string(),
        memory_total: 64.0,
        swap_total: 8.0,
    }
}

pub fn filesystems() -> Vec<Filesystem> {
    vec![
        Filesystem {
            filesystem: "/dev/mapper/ol-root".to_string(),
            fs_type: "xfs".to_string(),
            mount_point: "/".to_string(),
            size: 53_660_876_800,
            used_space: 12_884_901_888,
            available_space: 40_775_974_912,
        },
        Filesystem {
            filesystem: "/dev/sdb1".to_string(),
            fs_type: "xfs".to_string(),
            mount_point: "/u01".to_string(),
            size: 214_643_507_200,
            used_space: 96_636_764_160,
            available_space: 118_006_743_040,
        },
    ]
}

fn descriptor(name: &str, version: &str) -> OracleDatabase {
    OracleDatabase {
        instance_number: 1,
        instance_name: name.to_string(),
        name: name.to_string(),
        unique_name: name.to_string(),
        db_id: 1_234_567_890,
        role: "PRIMARY".to_string(),
        is_cdb: false,
        version: version.to_string(),
        platform: "Linux x86 64-bit".to_string(),
        archivelog: true,
        charset: "AL32UTF8".to_string(),
        n_charset: "AL16UTF16".to_string(),
        block_size: 8192,
        cpu_count: 16,
        sga_target: 24.0,
        pga_target: 8.0,
        memory_target: 0.0,
        sga_max_size: 24.0,
        segments_size: 410.5,
        datafile_size: 512.0,
        allocable: 128.0,
        elapsed: Some(43_200.0),
        db_time: Some(1_820.4),
        daily_cpu_usage: Some(0.8),
        work: Some(0.1),
        asm: false,
        dataguard: false,
        ..Default::default()
    }
}

/// Open database with one entry in every sub-collection
///
/// The license probe is not installed, so licenses come from the host.
pub fn open_database(name: &str, version: &str) -> StubDatabase {
    let mut record = descriptor(name, version);
    record.tablespaces = vec![OracleDatabaseTablespace {
        name: "USERS".to_string(),
        max_size: 32_767.98,
        total: 1_024.0,
        used: 512.0,
        used_perc: 50.0,
        status: "ONLINE".to_string(),
    }];
    record.schemas = vec![OracleDatabaseSchema {
        user: "APP".to_string(),
        total: 300.0,
        tables: 200.0,
        indexes: 90.0,
        lob: 10.0,
    }];
    record.patches = vec![OracleDatabasePatch {
        version: "19.0.0.0".to_string(),
        patch_id: 33_515_361,
        action: "APPLY".to_string(),
        description: "Database Release Update : 19.14.0.0.220118".to_string(),
        date: "2022-03-01".to_string(),
    }];
    record.feature_usage_stats = vec![OracleDatabaseFeatureUsageStat {
        product: "Partitioning".to_string(),
        feature: "Partitioning (user)".to_string(),
        detected_usages: 12,
        currently_used: true,
        first_usage_date: "2021-06-01".to_string(),
        last_usage_date: "2022-03-01".to_string(),
        extra_feature_info: String::new(),
    }];
    record.addms = vec![OracleDatabaseAddm {
        finding: "SQL statements consuming significant database time were found.".to_string(),
        recommendation: "SQL Tuning".to_string(),
        action: "Run SQL Tuning Advisor on the SELECT statement with SQL_ID \"7h35uxf5uhmm1\".".to_string(),
        benefit: 83.3,
    }];
    record.segment_advisors = vec![OracleDatabaseSegmentAdvisor {
        segment_owner: "APP".to_string(),
        segment_name: "ORDERS".to_string(),
        segment_type: "TABLE".to_string(),
        partition_name: String::new(),
        reclaimable: 1.5,
        recommendation: "Enable row movement of the table APP.ORDERS and perform shrink".to_string(),
    }];
    record.psus = vec![OracleDatabasePsu {
        date: "2022-01-18".to_string(),
        description: "Database Release Update : 19.14.0.0.220118 (33515361)".to_string(),
    }];
    record.backups = vec![OracleDatabaseBackup {
        backup_type: "FULL".to_string(),
        hour: "01:00".to_string(),
        week_days: vec!["Sunday".to_string()],
        avg_bck_size: 120.0,
        retention: "7 DAYS".to_string(),
    }];
    record.partitionings = vec![OracleDatabasePartitioning {
        owner: "APP".to_string(),
        segment_name: "ORDERS".to_string(),
        partition_name: "ORDERS_2022".to_string(),
        segment_type: "TABLE PARTITION".to_string(),
        mb: 64.0,
    }];

    StubDatabase {
        status: "READ WRITE".to_string(),
        version: version.to_string(),
        record,
        licenses: None,
    }
}

/// Open database whose license probe answers `licenses`
pub fn open_database_with_licenses(name: &str, version: &str, licenses: Vec<License>) -> StubDatabase {
    StubDatabase {
        licenses: Some(licenses),
        ..open_database(name, version)
    }
}

/// Mounted standby; the descriptor probe still returns sub-collection data
/// the collector must discard
pub fn mounted_database(name: &str, version: &str) -> StubDatabase {
    let mut database = open_database(name, version);
    database.status = "MOUNTED".to_string();
    database.record.role = "PHYSICAL STANDBY".to_string();
    database
}

/// Open database reporting an arbitrary instance status
pub fn database_with_status(name: &str, status: &str) -> StubDatabase {
    StubDatabase {
        status: status.to_string(),
        ..open_database(name, ENTERPRISE_VERSION)
    }
}

pub fn license(name: &str, count: f64) -> License {
    License { name: name.to_string(), count }
}

/// One database node and two storage cells
pub fn exadata_components() -> Vec<OracleExadataComponent> {
    let component = |hostname: &str, server_type: &str| OracleExadataComponent {
        hostname: hostname.to_string(),
        server_type: server_type.to_string(),
        model: "X8-2".to_string(),
        sw_version: "19.2.10.0.0".to_string(),
        sw_release_date: "2020-01-10".to_string(),
        running_cpu_count: 48,
        total_cpu_count: 48,
        memory: 384,
        status: "online".to_string(),
        running_power_supply: 2,
        total_power_supply: 2,
        power_status: "normal".to_string(),
        running_fan_count: 8,
        total_fan_count: 8,
        fan_status: "normal".to_string(),
        temp_actual: 24.0,
        temp_status: "normal".to_string(),
        cellsrv_service_status: if server_type == "StorageServer" { "running" } else { "-" }.to_string(),
        ms_service_status: "running".to_string(),
        rs_service_status: "running".to_string(),
        flashcache_mode: if server_type == "StorageServer" { "WriteBack" } else { "-" }.to_string(),
        cell_disks: None,
    };
    vec![
        component("exadb01", "DBServer"),
        component("exacel01", "StorageServer"),
        component("exacel02", "StorageServer"),
    ]
}

/// Cell disks for the storage cells of `exadata_components`
pub fn exadata_cell_disks() -> HashMap<String, Vec<OracleExadataCellDisk>> {
    let disk = |cell: &str, index: u32| OracleExadataCellDisk {
        name: format!("CD_{:02}_{}", index, cell),
        status: "normal".to_string(),
        err_count: 0,
        used_perc: 37,
    };
    let mut disks = HashMap::new();
    disks.insert("exacel01".to_string(), (0..3).map(|i| disk("exacel01", i)).collect());
    disks.insert("exacel02".to_string(), (0..2).map(|i| disk("exacel02", i)).collect());
    disks
}

pub fn hypervisor(hypervisor_type: HypervisorType, endpoint: &str) -> Hypervisor {
    Hypervisor {
        hypervisor_type,
        endpoint: endpoint.to_string(),
        username: "inventory".to_string(),
        password: "secret".to_string(),
        ovm_user_key: String::new(),
        ovm_control: String::new(),
    }
}

pub fn cluster(name: &str, cluster_type: &str) -> ClusterInfo {
    ClusterInfo {
        fetch_error_message: None,
        cluster_type: cluster_type.to_string(),
        name: name.to_string(),
        cpu: 64,
        sockets: 4,
        vms: Vec::new(),
    }
}

pub fn vm(cluster_name: &str, name: &str) -> VmInfo {
    VmInfo {
        cluster_name: cluster_name.to_string(),
        name: name.to_string(),
        hostname: format!("{}.example.com", name),
        physical_host: "esx01.example.com".to_string(),
        capped_cpu: false,
        virtualization_node: "esx01".to_string(),
    }
}
