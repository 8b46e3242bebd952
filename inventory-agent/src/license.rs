//! Oracle license rules
//!
//! Pure computation of per-edition license counts from the database edition,
//! the host virtualization technology and its CPU topology.

use crate::model::{Edition, HardwareAbstractionTechnology, License};

/// Core factor for a database edition on a given host
///
/// Returns -1 for virtualization technologies the rules do not cover.
pub fn core_factor(
    edition: Edition,
    technology: &HardwareAbstractionTechnology,
    cpu_sockets: u32,
) -> f64 {
    if technology.is_virtualized() {
        match edition {
            Edition::Extreme | Edition::Enterprise => 0.5,
            Edition::Standard => 0.0,
        }
    } else if *technology == HardwareAbstractionTechnology::Physical {
        match edition {
            Edition::Extreme | Edition::Enterprise => 0.5,
            Edition::Standard => f64::from(cpu_sockets),
        }
    } else {
        -1.0
    }
}

/// One entry per edition; only `edition` gets a non-zero count
///
/// A negative core factor is propagated as is.
pub fn compute_licenses(edition: Edition, core_factor: f64, cpu_cores: u32) -> Vec<License> {
    let num_licenses = core_factor * f64::from(cpu_cores);

    Edition::ALL
        .iter()
        .map(|candidate| License {
            name: candidate.license_name().to_string(),
            count: if *candidate == edition { num_licenses } else { 0.0 },
        })
        .collect()
}

/// Licenses of a database that could not be asked for them
pub fn licenses_for_host(
    edition: Edition,
    technology: &HardwareAbstractionTechnology,
    cpu_sockets: u32,
    cpu_cores: u32,
) -> Vec<License> {
    let factor = core_factor(edition, technology, cpu_sockets);
    if factor < 0.0 {
        tracing::warn!(
            technology = %technology,
            edition = edition.code(),
            "No core factor for this hardware abstraction technology, license count will be negative"
        );
    }
    compute_licenses(edition, factor, cpu_cores)
}

/// Reduce any license list to exactly one entry per edition
///
/// Edition entries are matched by name, case-insensitively; missing editions
/// count 0 and entries for anything else are dropped.
pub fn normalize_licenses(licenses: &[License]) -> Vec<License> {
    Edition::ALL
        .iter()
        .map(|edition| {
            let name = edition.license_name();
            let count = licenses
                .iter()
                .find(|license| license.name.trim().eq_ignore_ascii_case(name))
                .map(|license| license.count)
                .unwrap_or(0.0);
            License { name: name.to_string(), count }
        })
        .collect()
}
