/*!
Test harness for the collection pipeline

Wires a `Configuration`, a `StubFetcher` and a `Platform` into a
`HostReportBuilder`, runs it and offers assertions on the report JSON
(dot-separated paths, numeric segments index arrays).
*/

use crate::fetcher_stub::StubFetcher;
use anyhow::Result;
use inventory_agent::config::Configuration;
use inventory_agent::error::BuildError;
use inventory_agent::fetcher::Fetcher;
use inventory_agent::model::HostReport;
use inventory_agent::platform::Platform;
use inventory_agent::HostReportBuilder;
use serde_json::Value;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub struct TestHarness {
    pub config: Configuration,
    pub fetcher: StubFetcher,
    pub platform: Platform,
}

impl TestHarness {
    /// Linux, root, default configuration, empty stub
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
            .with_test_writer()
            .try_init();

        Self {
            config: Configuration::default(),
            fetcher: StubFetcher::new(),
            platform: Platform {
                os: "linux".to_string(),
                is_root: true,
            },
        }
    }

    pub fn with_fetcher(mut self, fetcher: StubFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_config(mut self, configure: impl FnOnce(&mut Configuration)) -> Self {
        configure(&mut self.config);
        self
    }

    pub fn with_platform(mut self, os: &str, is_root: bool) -> Self {
        self.platform = Platform {
            os: os.to_string(),
            is_root,
        };
        self
    }

    /// One collection run against the stub
    pub async fn run(&self) -> Result<HostReport, BuildError> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(self.fetcher.clone());
        HostReportBuilder::new(fetcher, self.config.clone(), self.platform.clone())
            .run()
            .await
    }

    /// One collection run, serialized as the agent would emit it
    pub async fn run_json(&self) -> Result<Value> {
        let report = self.run().await?;
        Ok(serde_json::to_value(&report)?)
    }

    pub fn field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
        path.split('.').try_fold(value, |current, part| match current {
            Value::Object(obj) => obj.get(part),
            Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    pub fn assert_field_equals(value: &Value, path: &str, expected: &Value) -> Result<()> {
        match Self::field(value, path) {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => anyhow::bail!(
                "Field '{}' mismatch: expected {}, got {}",
                path,
                expected,
                actual
            ),
            None => anyhow::bail!("Field '{}' not found", path),
        }
    }

    pub fn assert_field_absent(value: &Value, path: &str) -> Result<()> {
        match Self::field(value, path) {
            Some(actual) => anyhow::bail!("Field '{}' should be absent, got {}", path, actual),
            None => Ok(()),
        }
    }

    /// Length of the array at `path`
    pub fn array_len(value: &Value, path: &str) -> Result<usize> {
        match Self::field(value, path) {
            Some(Value::Array(items)) => Ok(items.len()),
            Some(other) => anyhow::bail!("Field '{}' is not an array: {}", path, other),
            None => anyhow::bail!("Field '{}' not found", path),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
