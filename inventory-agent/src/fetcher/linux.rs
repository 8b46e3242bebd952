//! Linux probe implementation
//!
//! - Host identity and filesystems come from `sysinfo`
//! - The oratab is read from the configured path
//! - Every other fact is printed by a script in the fetchers directory,
//!   run as the context user through `su` and parsed by `marshal`

use super::{marshal, FetchContext, Fetcher};
use crate::config::{Configuration, Hypervisor};
use crate::error::FetchError;
use crate::model::{
    ClusterInfo, ClusterMembershipStatus, Filesystem, HardwareAbstractionTechnology, Host, License,
    OracleDatabase, OracleDatabaseAddm, OracleDatabaseBackup, OracleDatabaseFeatureUsageStat,
    OracleDatabasePartitioning, OracleDatabasePatch, OracleDatabasePsu, OracleDatabaseSchema,
    OracleDatabaseSegmentAdvisor, OracleDatabaseTablespace, OracleExadataCellDisk,
    OracleExadataComponent, OratabEntry, VmInfo,
};
use process_control::{ChildExt, Control};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};
use tracing::debug;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const HYPERVISOR_PASSWORD_ENV: &str = "INVENTORY_HYPERVISOR_PASSWORD";

pub struct LinuxFetcher {
    fetchers_dir: PathBuf,
    oratab: PathBuf,
    awr: u32,
    timeout: Option<Duration>,
}

impl LinuxFetcher {
    pub fn new(config: &Configuration) -> Self {
        let timeout = match config.probe_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            fetchers_dir: config.fetchers_dir.clone(),
            oratab: PathBuf::from(&config.features.oracle_database.oratab),
            awr: config.features.oracle_database.awr,
            timeout,
        }
    }

    /// Run a fetcher script and return its stdout
    fn execute(&self, ctx: &FetchContext, name: &str, args: &[&str]) -> Result<Vec<u8>, FetchError> {
        self.execute_with_env(ctx, name, args, &[])
    }

    fn execute_with_env(
        &self,
        ctx: &FetchContext,
        name: &str,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<Vec<u8>, FetchError> {
        let script = self.fetchers_dir.join(name);
        if !script.exists() {
            return Err(FetchError::Unsupported(format!("{} is not installed", script.display())));
        }

        let mut command = match ctx.user() {
            Some(user) => {
                let mut words = vec![script.to_string_lossy().into_owned()];
                words.extend(args.iter().map(|arg| arg.to_string()));
                let command_line = shell_words::join(&words);
                let mut command = Command::new("su");
                command.args([user, "-s", "/bin/sh", "-c", command_line.as_str()]);
                command
            }
            None => {
                let mut command = Command::new(&script);
                command.args(args);
                command
            }
        };
        command
            .envs(envs.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Executing fetcher {} {:?} as {}", name, args, ctx);

        let control = command.spawn()?.controlled_with_output();
        let control = match self.timeout {
            Some(limit) => control.time_limit(limit).terminate_for_timeout(),
            None => control,
        };

        let output = control.wait()?.ok_or_else(|| FetchError::Timeout {
            command: name.to_string(),
            secs: self.timeout.map(|limit| limit.as_secs()).unwrap_or_default(),
        })?;

        if !output.status.success() {
            return Err(FetchError::CommandFailed {
                command: name.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }

    fn execute_for_entry(
        &self,
        ctx: &FetchContext,
        name: &str,
        entry: &OratabEntry,
        extra: &[&str],
    ) -> Result<Vec<u8>, FetchError> {
        let mut args = vec![entry.db_name.as_str()];
        args.extend_from_slice(extra);
        args.push(entry.oracle_home.as_str());
        self.execute(ctx, name, &args)
    }

    fn execute_for_hypervisor(
        &self,
        ctx: &FetchContext,
        kind: &str,
        hypervisor: &Hypervisor,
    ) -> Result<Vec<u8>, FetchError> {
        let name = format!("virtualization/{}_{}", hypervisor.hypervisor_type.as_str(), kind);
        let args = [
            hypervisor.endpoint.as_str(),
            hypervisor.username.as_str(),
            hypervisor.ovm_user_key.as_str(),
            hypervisor.ovm_control.as_str(),
        ];
        self.execute_with_env(ctx, &name, &args, &[(HYPERVISOR_PASSWORD_ENV, hypervisor.password.as_str())])
    }
}

/// Classify the DMI vendor/product strings
pub(crate) fn classify_hardware(vendor: &str, product: &str) -> HardwareAbstractionTechnology {
    let signature = format!("{} {}", vendor, product).to_uppercase();

    if signature.contains("VMWARE") {
        HardwareAbstractionTechnology::Vmware
    } else if signature.contains("OVM") || signature.contains("XEN") {
        HardwareAbstractionTechnology::Ovm
    } else if ["KVM", "QEMU", "VIRTUALBOX", "HYPER-V", "VIRTUAL MACHINE", "BOCHS"]
        .iter()
        .any(|marker| signature.contains(marker))
    {
        HardwareAbstractionTechnology::VmOther
    } else {
        HardwareAbstractionTechnology::Physical
    }
}

/// Number of distinct `physical id` values in /proc/cpuinfo (at least 1)
pub(crate) fn count_sockets(cpuinfo: &str) -> u32 {
    let sockets: HashSet<&str> = cpuinfo
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, _)| key.trim() == "physical id")
        .map(|(_, value)| value.trim())
        .collect();
    sockets.len().max(1) as u32
}

#[cfg(unix)]
fn lookup_user(user: &str) -> Result<FetchContext, FetchError> {
    match nix::unistd::User::from_name(user) {
        Ok(Some(_)) => Ok(FetchContext::as_user(user)),
        Ok(None) => Err(FetchError::UnknownUser(user.to_string())),
        Err(errno) => Err(FetchError::Io(errno.into())),
    }
}

#[cfg(not(unix))]
fn lookup_user(user: &str) -> Result<FetchContext, FetchError> {
    Err(FetchError::Unsupported(format!("switching to user {}", user)))
}

fn read_dmi(field: &str) -> String {
    std::fs::read_to_string(format!("/sys/class/dmi/id/{}", field))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

impl Fetcher for LinuxFetcher {
    fn context_for(&self, user: Option<&str>) -> Result<FetchContext, FetchError> {
        let Some(user) = user.map(str::trim).filter(|user| !user.is_empty()) else {
            return Ok(FetchContext::current());
        };

        lookup_user(user)
    }

    fn host(&self, _ctx: &FetchContext) -> Result<Host, FetchError> {
        let mut sys = System::new();
        sys.refresh_specifics(
            RefreshKind::new()
                .with_memory(MemoryRefreshKind::new().with_ram().with_swap())
                .with_cpu(CpuRefreshKind::everything()),
        );

        let hostname = System::host_name()
            .or_else(|| hostname::get().ok().map(|name| name.to_string_lossy().into_owned()))
            .unwrap_or_default();

        let cpus = sys.cpus();
        let cpu_threads = cpus.len() as u32;
        let cpu_cores = sys.physical_core_count().unwrap_or(cpus.len()) as u32;
        let cpu_sockets = std::fs::read_to_string("/proc/cpuinfo")
            .map(|cpuinfo| count_sockets(&cpuinfo))
            .unwrap_or(1);
        let (cpu_model, cpu_frequency) = cpus
            .first()
            .map(|cpu| (cpu.brand().to_string(), format!("{}MHz", cpu.frequency())))
            .unwrap_or_default();

        let technology = classify_hardware(&read_dmi("sys_vendor"), &read_dmi("product_name"));
        let hardware_abstraction = if technology.is_virtualized() { "VIRT" } else { "PH" };

        Ok(Host {
            hostname,
            cpu_model,
            cpu_frequency,
            cpu_sockets,
            cpu_cores,
            cpu_threads,
            threads_per_core: cpu_threads / cpu_cores.max(1),
            cores_per_socket: cpu_cores / cpu_sockets.max(1),
            hardware_abstraction: hardware_abstraction.to_string(),
            hardware_abstraction_technology: technology,
            kernel: System::name().unwrap_or_default(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            os: System::distribution_id(),
            os_version: System::os_version().unwrap_or_default(),
            memory_total: sys.total_memory() as f64 / GIB,
            swap_total: sys.total_swap() as f64 / GIB,
        })
    }

    fn filesystems(&self, _ctx: &FetchContext) -> Result<Vec<Filesystem>, FetchError> {
        let disks = Disks::new_with_refreshed_list();

        Ok(disks
            .list()
            .iter()
            .map(|disk| Filesystem {
                filesystem: disk.name().to_string_lossy().into_owned(),
                fs_type: disk.file_system().to_string_lossy().into_owned(),
                mount_point: disk.mount_point().display().to_string(),
                size: disk.total_space(),
                used_space: disk.total_space().saturating_sub(disk.available_space()),
                available_space: disk.available_space(),
            })
            .collect())
    }

    fn clusters_membership_status(&self, ctx: &FetchContext) -> Result<ClusterMembershipStatus, FetchError> {
        let output = self.execute(ctx, "cluster_membership_status", &[])?;
        Ok(marshal::clusters_membership_status(&output))
    }

    fn oracle_database_oratab_entries(&self, _ctx: &FetchContext) -> Result<Vec<OratabEntry>, FetchError> {
        let content = std::fs::read_to_string(&self.oratab)?;
        Ok(marshal::oratab(&content))
    }

    fn oracle_database_running_databases(&self, ctx: &FetchContext) -> Result<Vec<String>, FetchError> {
        let output = self.execute(ctx, "oracle_running_databases", &[])?;
        Ok(marshal::running_databases(&output))
    }

    fn oracle_database_db_status(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<String, FetchError> {
        let output = self.execute_for_entry(ctx, "dbstatus", entry, &[])?;
        Ok(marshal::single_value(&output))
    }

    fn oracle_database_mounted_db(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<OracleDatabase, FetchError> {
        let output = self.execute_for_entry(ctx, "dbmounted", entry, &[])?;
        marshal::database("dbmounted", &output)
    }

    fn oracle_database_db_version(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<String, FetchError> {
        let output = self.execute_for_entry(ctx, "dbversion", entry, &[])?;
        Ok(marshal::single_value(&output))
    }

    fn run_oracle_database_stats(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<(), FetchError> {
        self.execute_for_entry(ctx, "stats", entry, &[]).map(|_| ())
    }

    fn oracle_database_open_db(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<OracleDatabase, FetchError> {
        let awr = self.awr.to_string();
        let output = self.execute_for_entry(ctx, "db", entry, &[&awr])?;
        marshal::database("db", &output)
    }

    fn oracle_database_tablespaces(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
    ) -> Result<Vec<OracleDatabaseTablespace>, FetchError> {
        let output = self.execute_for_entry(ctx, "tablespace", entry, &[])?;
        Ok(marshal::tablespaces(&output))
    }

    fn oracle_database_schemas(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<Vec<OracleDatabaseSchema>, FetchError> {
        let output = self.execute_for_entry(ctx, "schema", entry, &[])?;
        Ok(marshal::schemas(&output))
    }

    fn oracle_database_patches(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        db_version: &str,
    ) -> Result<Vec<OracleDatabasePatch>, FetchError> {
        let output = self.execute_for_entry(ctx, "patch", entry, &[db_version])?;
        Ok(marshal::patches(&output))
    }

    fn oracle_database_feature_usage_stats(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        db_version: &str,
    ) -> Result<Vec<OracleDatabaseFeatureUsageStat>, FetchError> {
        let output = self.execute_for_entry(ctx, "opt", entry, &[db_version])?;
        Ok(marshal::feature_usage_stats(&output))
    }

    fn oracle_database_licenses(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        db_version: &str,
        technology: &HardwareAbstractionTechnology,
    ) -> Result<Vec<License>, FetchError> {
        let output = self.execute_for_entry(ctx, "license", entry, &[db_version, technology.as_str()])?;
        Ok(marshal::licenses(&output))
    }

    fn oracle_database_addms(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<Vec<OracleDatabaseAddm>, FetchError> {
        let output = self.execute_for_entry(ctx, "addm", entry, &[])?;
        Ok(marshal::addms(&output))
    }

    fn oracle_database_segment_advisors(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
    ) -> Result<Vec<OracleDatabaseSegmentAdvisor>, FetchError> {
        let output = self.execute_for_entry(ctx, "segmentadvisor", entry, &[])?;
        Ok(marshal::segment_advisors(&output))
    }

    fn oracle_database_psus(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
        db_version: &str,
    ) -> Result<Vec<OracleDatabasePsu>, FetchError> {
        let output = self.execute_for_entry(ctx, "psu", entry, &[db_version])?;
        Ok(marshal::psus(&output))
    }

    fn oracle_database_backups(&self, ctx: &FetchContext, entry: &OratabEntry) -> Result<Vec<OracleDatabaseBackup>, FetchError> {
        let output = self.execute_for_entry(ctx, "backup_schedule", entry, &[])?;
        Ok(marshal::backups(&output))
    }

    fn oracle_database_partitionings(
        &self,
        ctx: &FetchContext,
        entry: &OratabEntry,
    ) -> Result<Vec<OracleDatabasePartitioning>, FetchError> {
        let output = self.execute_for_entry(ctx, "partitioning", entry, &[])?;
        Ok(marshal::partitionings(&output))
    }

    fn oracle_exadata_components(&self, ctx: &FetchContext) -> Result<Vec<OracleExadataComponent>, FetchError> {
        let output = self.execute(ctx, "exadata/info", &[])?;
        Ok(marshal::exadata_components(&output))
    }

    fn oracle_exadata_cell_disks(
        &self,
        ctx: &FetchContext,
    ) -> Result<HashMap<String, Vec<OracleExadataCellDisk>>, FetchError> {
        let output = self.execute(ctx, "exadata/storage-status", &[])?;
        Ok(marshal::exadata_cell_disks(&output))
    }

    fn hypervisor_clusters(&self, ctx: &FetchContext, hypervisor: &Hypervisor) -> Result<Vec<ClusterInfo>, FetchError> {
        let output = self.execute_for_hypervisor(ctx, "clusters", hypervisor)?;
        Ok(marshal::clusters(&output))
    }

    fn hypervisor_vms(&self, ctx: &FetchContext, hypervisor: &Hypervisor) -> Result<Vec<VmInfo>, FetchError> {
        let output = self.execute_for_hypervisor(ctx, "vms", hypervisor)?;
        Ok(marshal::vms(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher_in(dir: &std::path::Path) -> LinuxFetcher {
        let mut config = Configuration::default();
        config.fetchers_dir = dir.to_path_buf();
        config.probe_timeout_secs = 2;
        LinuxFetcher::new(&config)
    }

    #[test]
    fn test_classify_hardware() {
        assert_eq!(classify_hardware("VMware, Inc.", "VMware Virtual Platform"), HardwareAbstractionTechnology::Vmware);
        assert_eq!(classify_hardware("Xen", "HVM domU"), HardwareAbstractionTechnology::Ovm);
        assert_eq!(classify_hardware("QEMU", "Standard PC (Q35 + ICH9, 2009)"), HardwareAbstractionTechnology::VmOther);
        assert_eq!(classify_hardware("Dell Inc.", "PowerEdge R740"), HardwareAbstractionTechnology::Physical);
    }

    #[test]
    fn test_count_sockets() {
        let cpuinfo = "processor\t: 0\nphysical id\t: 0\nprocessor\t: 1\nphysical id\t: 1\nprocessor\t: 2\nphysical id\t: 0\n";
        assert_eq!(count_sockets(cpuinfo), 2);
        assert_eq!(count_sockets("processor\t: 0\n"), 1);
    }

    #[test]
    fn test_current_user_context() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_in(dir.path());
        assert_eq!(fetcher.context_for(None).unwrap(), FetchContext::current());
        assert_eq!(fetcher.context_for(Some("  ")).unwrap(), FetchContext::current());
    }

    #[cfg(unix)]
    #[test]
    fn test_unknown_user_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_in(dir.path());
        let result = fetcher.context_for(Some("no-such-user-for-inventory"));
        assert!(matches!(result, Err(FetchError::UnknownUser(_))));
    }

    #[test]
    fn test_missing_script_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_in(dir.path());
        let entry = OratabEntry { db_name: "ORCL".into(), oracle_home: "/u01".into() };
        let result = fetcher.oracle_database_licenses(
            &FetchContext::current(),
            &entry,
            "19.0.0",
            &HardwareAbstractionTechnology::Physical,
        );
        assert!(matches!(result, Err(FetchError::Unsupported(_))));
    }

    #[test]
    fn test_oratab_from_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let oratab = dir.path().join("oratab");
        std::fs::write(&oratab, "ORCL:/u01/app/oracle:Y\n").unwrap();

        let mut config = Configuration::default();
        config.features.oracle_database.oratab = oratab.to_string_lossy().into_owned();
        let fetcher = LinuxFetcher::new(&config);

        let entries = fetcher.oracle_database_oratab_entries(&FetchContext::current()).unwrap();
        assert_eq!(entries, vec![OratabEntry { db_name: "ORCL".into(), oracle_home: "/u01/app/oracle".into() }]);
    }

    #[cfg(unix)]
    #[test]
    fn test_script_output_and_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let write_script = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        };
        write_script("oracle_running_databases", "echo ORCL; echo TEST");
        write_script("dbstatus", "echo 'ORA-12560' >&2; exit 3");

        let fetcher = fetcher_in(dir.path());
        let ctx = FetchContext::current();
        assert_eq!(fetcher.oracle_database_running_databases(&ctx).unwrap(), vec!["ORCL", "TEST"]);

        let entry = OratabEntry { db_name: "ORCL".into(), oracle_home: "/u01".into() };
        match fetcher.oracle_database_db_status(&ctx, &entry) {
            Err(FetchError::CommandFailed { command, stderr, .. }) => {
                assert_eq!(command, "dbstatus");
                assert_eq!(stderr, "ORA-12560");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
