//! Oracle Exadata feature: components, with storage cells carrying their disks

use super::probe;
use crate::fetcher::{FetchContext, Fetcher};
use crate::model::{OracleExadataCellDisk, OracleExadataComponent, OracleExadataFeature};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};

pub struct ExadataCollector {
    fetcher: Arc<dyn Fetcher>,
    ctx: FetchContext,
}

impl ExadataCollector {
    pub fn new(fetcher: Arc<dyn Fetcher>, ctx: FetchContext) -> Self {
        Self { fetcher, ctx }
    }

    pub async fn collect(&self) -> OracleExadataFeature {
        let components = match probe(&self.fetcher, &self.ctx, "exadata_components", |f, ctx| {
            f.oracle_exadata_components(ctx)
        })
        .await
        {
            Ok(components) => components,
            Err(e) => {
                error!("Unable to get exadata components: {}", e);
                return OracleExadataFeature::default();
            }
        };

        let cell_disks = probe(&self.fetcher, &self.ctx, "exadata_cell_disks", |f, ctx| {
            f.oracle_exadata_cell_disks(ctx)
        })
        .await
        .unwrap_or_else(|e| {
            warn!("Unable to get exadata cell disks: {}", e);
            HashMap::new()
        });

        OracleExadataFeature {
            components: attach_cell_disks(components, cell_disks),
        }
    }
}

/// Give each component the disks listed under its hostname
fn attach_cell_disks(
    mut components: Vec<OracleExadataComponent>,
    mut cell_disks: HashMap<String, Vec<OracleExadataCellDisk>>,
) -> Vec<OracleExadataComponent> {
    for component in &mut components {
        if let Some(disks) = cell_disks.remove(&component.hostname) {
            component.cell_disks = Some(disks);
        }
    }
    for hostname in cell_disks.keys() {
        warn!("Cell disks reported for unknown exadata component {}", hostname);
    }
    components
}
