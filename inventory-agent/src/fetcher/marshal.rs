//! Parsers for probe script output
//!
//! Scripts print one record per line with fields separated by `|||`.
//! Lines with an unexpected field count are skipped; numeric fields that do
//! not parse become 0.

use crate::error::FetchError;
use crate::model::{
    ClusterInfo, ClusterMembershipStatus, DatabaseStatus, License, OracleDatabase, OracleDatabaseAddm,
    OracleDatabaseBackup, OracleDatabaseFeatureUsageStat, OracleDatabasePartitioning,
    OracleDatabasePatch, OracleDatabasePsu, OracleDatabaseSchema, OracleDatabaseSegmentAdvisor,
    OracleDatabaseTablespace, OracleExadataCellDisk, OracleExadataComponent, OratabEntry, VmInfo,
};
use std::collections::HashMap;

pub const SEPARATOR: &str = "|||";

/// Split every line carrying exactly `fields` fields
fn records(output: &[u8], fields: usize) -> Vec<Vec<String>> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| line.split(SEPARATOR).map(|field| field.trim().to_string()).collect::<Vec<_>>())
        .filter(|splitted| splitted.len() == fields)
        .collect()
}

pub fn trim_parse_f64(value: &str) -> f64 {
    value.trim().parse().unwrap_or(0.0)
}

pub fn trim_parse_i64(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

pub fn trim_parse_u32(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

/// `None` for empty or N/A values
pub fn trim_parse_optional_f64(value: &str) -> Option<f64> {
    match value.trim() {
        "" | "N/A" => None,
        other => other.parse().ok(),
    }
}

pub fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_uppercase().as_str(), "Y" | "YES" | "TRUE" | "1")
}

/// Whole output as one trimmed value (status, version banner)
pub fn single_value(output: &[u8]) -> String {
    String::from_utf8_lossy(output).trim().to_string()
}

/// Parse an oratab file: `SID:ORACLE_HOME:<Y|N>`
///
/// Comments, blank lines and ASM/wildcard entries are ignored.
pub fn oratab(content: &str) -> Vec<OratabEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split(':');
            let db_name = fields.next()?.trim();
            let oracle_home = fields.next()?.trim();
            if db_name.is_empty() || db_name.starts_with('+') || db_name.starts_with('*') {
                return None;
            }
            Some(OratabEntry {
                db_name: db_name.to_string(),
                oracle_home: oracle_home.to_string(),
            })
        })
        .collect()
}

/// One instance name per line
pub fn running_databases(output: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(output)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn clusters_membership_status(output: &[u8]) -> ClusterMembershipStatus {
    records(output, 4)
        .into_iter()
        .next()
        .map(|r| ClusterMembershipStatus {
            oracle_clusterware: parse_bool(&r[0]),
            veritas_cluster_server: parse_bool(&r[1]),
            sun_cluster: parse_bool(&r[2]),
            hacmp: parse_bool(&r[3]),
        })
        .unwrap_or_default()
}

const DATABASE_FIELDS: usize = 28;

/// Database descriptor; sub-collections are left empty
pub fn database(command: &str, output: &[u8]) -> Result<OracleDatabase, FetchError> {
    let r = records(output, DATABASE_FIELDS).into_iter().next().ok_or_else(|| FetchError::Parse {
        command: command.to_string(),
        message: format!("no line with {} fields", DATABASE_FIELDS),
    })?;

    Ok(OracleDatabase {
        instance_number: trim_parse_u32(&r[0]),
        instance_name: r[1].clone(),
        name: r[2].clone(),
        unique_name: r[3].clone(),
        status: DatabaseStatus::from(r[4].clone()),
        db_id: r[5].parse().unwrap_or(0),
        role: r[6].clone(),
        is_cdb: parse_bool(&r[7]),
        version: r[8].clone(),
        platform: r[9].clone(),
        archivelog: parse_bool(&r[10]),
        charset: r[11].clone(),
        n_charset: r[12].clone(),
        block_size: trim_parse_u32(&r[13]),
        cpu_count: trim_parse_u32(&r[14]),
        sga_target: trim_parse_f64(&r[15]),
        pga_target: trim_parse_f64(&r[16]),
        memory_target: trim_parse_f64(&r[17]),
        sga_max_size: trim_parse_f64(&r[18]),
        segments_size: trim_parse_f64(&r[19]),
        datafile_size: trim_parse_f64(&r[20]),
        allocable: trim_parse_f64(&r[21]),
        elapsed: trim_parse_optional_f64(&r[22]),
        db_time: trim_parse_optional_f64(&r[23]),
        daily_cpu_usage: trim_parse_optional_f64(&r[24]),
        work: trim_parse_optional_f64(&r[25]),
        asm: parse_bool(&r[26]),
        dataguard: parse_bool(&r[27]),
        ..OracleDatabase::default()
    })
}

pub fn tablespaces(output: &[u8]) -> Vec<OracleDatabaseTablespace> {
    records(output, 6)
        .into_iter()
        .map(|r| OracleDatabaseTablespace {
            name: r[0].clone(),
            max_size: trim_parse_f64(&r[1]),
            total: trim_parse_f64(&r[2]),
            used: trim_parse_f64(&r[3]),
            used_perc: trim_parse_f64(&r[4]),
            status: r[5].clone(),
        })
        .collect()
}

pub fn schemas(output: &[u8]) -> Vec<OracleDatabaseSchema> {
    records(output, 5)
        .into_iter()
        .map(|r| OracleDatabaseSchema {
            user: r[0].clone(),
            total: trim_parse_f64(&r[1]),
            tables: trim_parse_f64(&r[2]),
            indexes: trim_parse_f64(&r[3]),
            lob: trim_parse_f64(&r[4]),
        })
        .collect()
}

pub fn patches(output: &[u8]) -> Vec<OracleDatabasePatch> {
    records(output, 5)
        .into_iter()
        .map(|r| OracleDatabasePatch {
            version: r[0].clone(),
            patch_id: trim_parse_i64(&r[1]),
            action: r[2].clone(),
            description: r[3].clone(),
            date: r[4].clone(),
        })
        .collect()
}

pub fn feature_usage_stats(output: &[u8]) -> Vec<OracleDatabaseFeatureUsageStat> {
    records(output, 7)
        .into_iter()
        .map(|r| OracleDatabaseFeatureUsageStat {
            product: r[0].clone(),
            feature: r[1].clone(),
            detected_usages: trim_parse_i64(&r[2]),
            currently_used: parse_bool(&r[3]),
            first_usage_date: r[4].clone(),
            last_usage_date: r[5].clone(),
            extra_feature_info: r[6].clone(),
        })
        .collect()
}

pub fn licenses(output: &[u8]) -> Vec<License> {
    records(output, 2)
        .into_iter()
        .map(|r| License {
            name: r[0].clone(),
            count: trim_parse_f64(&r[1]),
        })
        .collect()
}

pub fn addms(output: &[u8]) -> Vec<OracleDatabaseAddm> {
    records(output, 4)
        .into_iter()
        .map(|r| OracleDatabaseAddm {
            finding: r[0].clone(),
            recommendation: r[1].clone(),
            action: r[2].clone(),
            benefit: trim_parse_f64(&r[3]),
        })
        .collect()
}

pub fn segment_advisors(output: &[u8]) -> Vec<OracleDatabaseSegmentAdvisor> {
    records(output, 6)
        .into_iter()
        .map(|r| OracleDatabaseSegmentAdvisor {
            segment_owner: r[0].clone(),
            segment_name: r[1].clone(),
            segment_type: r[2].clone(),
            partition_name: r[3].clone(),
            reclaimable: trim_parse_f64(&r[4]),
            recommendation: r[5].clone(),
        })
        .collect()
}

pub fn psus(output: &[u8]) -> Vec<OracleDatabasePsu> {
    records(output, 2)
        .into_iter()
        .map(|r| OracleDatabasePsu {
            date: r[0].clone(),
            description: r[1].clone(),
        })
        .collect()
}

pub fn backups(output: &[u8]) -> Vec<OracleDatabaseBackup> {
    records(output, 5)
        .into_iter()
        .map(|r| OracleDatabaseBackup {
            backup_type: r[0].clone(),
            hour: r[1].clone(),
            week_days: r[2]
                .split(',')
                .map(str::trim)
                .filter(|day| !day.is_empty())
                .map(str::to_string)
                .collect(),
            avg_bck_size: trim_parse_f64(&r[3]),
            retention: r[4].clone(),
        })
        .collect()
}

pub fn partitionings(output: &[u8]) -> Vec<OracleDatabasePartitioning> {
    records(output, 5)
        .into_iter()
        .map(|r| OracleDatabasePartitioning {
            owner: r[0].clone(),
            segment_name: r[1].clone(),
            partition_name: r[2].clone(),
            segment_type: r[3].clone(),
            mb: trim_parse_f64(&r[4]),
        })
        .collect()
}

pub fn exadata_components(output: &[u8]) -> Vec<OracleExadataComponent> {
    records(output, 21)
        .into_iter()
        .map(|r| OracleExadataComponent {
            hostname: r[0].clone(),
            server_type: r[1].clone(),
            model: r[2].clone(),
            sw_version: r[3].clone(),
            sw_release_date: r[4].clone(),
            running_cpu_count: trim_parse_i64(&r[5]),
            total_cpu_count: trim_parse_i64(&r[6]),
            memory: trim_parse_i64(&r[7]),
            status: r[8].clone(),
            running_power_supply: trim_parse_i64(&r[9]),
            total_power_supply: trim_parse_i64(&r[10]),
            power_status: r[11].clone(),
            running_fan_count: trim_parse_i64(&r[12]),
            total_fan_count: trim_parse_i64(&r[13]),
            fan_status: r[14].clone(),
            temp_actual: trim_parse_f64(&r[15]),
            temp_status: r[16].clone(),
            cellsrv_service_status: r[17].clone(),
            ms_service_status: r[18].clone(),
            rs_service_status: r[19].clone(),
            flashcache_mode: r[20].clone(),
            cell_disks: None,
        })
        .collect()
}

/// Cell disks grouped by the storage server in the first field
pub fn exadata_cell_disks(output: &[u8]) -> HashMap<String, Vec<OracleExadataCellDisk>> {
    let mut cell_disks: HashMap<String, Vec<OracleExadataCellDisk>> = HashMap::new();

    for r in records(output, 5) {
        cell_disks.entry(r[0].clone()).or_default().push(OracleExadataCellDisk {
            name: r[1].clone(),
            status: r[2].clone(),
            err_count: trim_parse_i64(&r[3]),
            used_perc: trim_parse_i64(&r[4]),
        });
    }

    cell_disks
}

pub fn clusters(output: &[u8]) -> Vec<ClusterInfo> {
    records(output, 4)
        .into_iter()
        .map(|r| ClusterInfo {
            fetch_error_message: None,
            cluster_type: r[0].clone(),
            name: r[1].clone(),
            cpu: trim_parse_i64(&r[2]),
            sockets: trim_parse_i64(&r[3]),
            vms: Vec::new(),
        })
        .collect()
}

pub fn vms(output: &[u8]) -> Vec<VmInfo> {
    records(output, 6)
        .into_iter()
        .map(|r| VmInfo {
            cluster_name: r[0].clone(),
            name: r[1].clone(),
            hostname: r[2].clone(),
            physical_host: r[3].clone(),
            capped_cpu: parse_bool(&r[4]),
            virtualization_node: r[5].clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oratab_parsing() {
        let content = "\
# comment line
ORCL:/u01/app/oracle/product/19.0.0/dbhome_1:Y

+ASM:/u01/app/grid:N
*:/u01/app/oracle:N
TEST:/u01/app/oracle/product/12.2.0/dbhome_1:N
";
        let entries = oratab(content);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].db_name, "ORCL");
        assert_eq!(entries[0].oracle_home, "/u01/app/oracle/product/19.0.0/dbhome_1");
        assert_eq!(entries[1].db_name, "TEST");
    }

    #[test]
    fn test_skips_lines_with_wrong_field_count() {
        let output = b"SYSTEM|||32767|||800|||750|||2.28|||ONLINE\nbroken|||line\nUSERS ||| 100 ||| 5 ||| 1 ||| 1 ||| ONLINE\n";
        let parsed = tablespaces(output);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].name, "USERS");
        assert_eq!(parsed[1].total, 5.0);
    }

    #[test]
    fn test_partitionings_parsing() {
        let output = b"SALES|||ORDERS|||P2024|||TABLE PARTITION|||12.5\n";
        let parsed = partitionings(output);
        assert_eq!(parsed[0].owner, "SALES");
        assert_eq!(parsed[0].segment_type, "TABLE PARTITION");
        assert_eq!(parsed[0].mb, 12.5);
    }

    #[test]
    fn test_cell_disks_grouped_by_storage_server() {
        let output = b"cell01|||CD_00|||normal|||0|||45\ncell02|||CD_00|||normal|||2|||10\ncell01|||CD_01|||normal|||x|||50\n";
        let parsed = exadata_cell_disks(output);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["cell01"].len(), 2);
        assert_eq!(parsed["cell01"][1].err_count, 0);
        assert_eq!(parsed["cell02"][0].err_count, 2);
    }

    #[test]
    fn test_database_descriptor() {
        let line = [
            "1", "ORCL", "ORCL", "ORCL_SITE1", "READ WRITE", "1234567890", "PRIMARY", "N",
            "Oracle Database 19c Enterprise Edition", "Linux x86 64-bit", "Y", "AL32UTF8",
            "AL16UTF16", "8192", "4", "2", "1", "0", "2", "10.5", "20", "9.5", "N/A", "", "1.2",
            "3", "Y", "N",
        ]
        .join(SEPARATOR);

        let db = database("db", line.as_bytes()).unwrap();
        assert_eq!(db.name, "ORCL");
        assert_eq!(db.status, DatabaseStatus::ReadWrite);
        assert_eq!(db.db_id, 1234567890);
        assert!(db.archivelog);
        assert_eq!(db.elapsed, None);
        assert_eq!(db.db_time, None);
        assert_eq!(db.daily_cpu_usage, Some(1.2));
        assert!(db.asm && !db.dataguard);
        assert!(db.tablespaces.is_empty());
    }

    #[test]
    fn test_database_descriptor_missing() {
        assert!(matches!(database("db", b"ORA-01034: ORACLE not available"), Err(FetchError::Parse { .. })));
    }

    #[test]
    fn test_backups_week_days() {
        let parsed = backups(b"Archivelog|||01:00|||Monday, Tuesday,|||12.4|||7 days\n");
        assert_eq!(parsed[0].week_days, vec!["Monday", "Tuesday"]);
    }
}
