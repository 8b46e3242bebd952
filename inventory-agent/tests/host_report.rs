use inventory_agent::config::HypervisorType;
use inventory_agent::error::BuildError;
use inventory_devkit::fixtures::{self, ENTERPRISE_VERSION, STANDARD_VERSION};
use inventory_devkit::{StubFetcher, TestHarness};
use serde_json::json;

fn full_stub() -> StubFetcher {
    StubFetcher::new()
        .with_host(fixtures::physical_host("db01.example.com"))
        .with_filesystems(fixtures::filesystems())
        .with_database("A", "/u01/app/oracle/a", fixtures::open_database("A", ENTERPRISE_VERSION))
        .with_database("STBY", "/u01/app/oracle/stby", fixtures::mounted_database("STBY", STANDARD_VERSION))
        .with_database("B", "/u01/app/oracle/b", fixtures::open_database("B", STANDARD_VERSION))
        .with_running(&["A", "B", "TEST"])
        .with_exadata(fixtures::exadata_components(), fixtures::exadata_cell_disks())
        .with_hypervisor(
            "vcenter.example.com",
            vec![fixtures::cluster("prod", "vmware"), fixtures::cluster("test", "vmware")],
            vec![
                fixtures::vm("prod", "db01"),
                fixtures::vm("test", "app01"),
                fixtures::vm("prod", "db02"),
            ],
        )
}

fn enable_all(harness: TestHarness) -> TestHarness {
    harness.with_config(|config| {
        config.features.oracle_database.enabled = true;
        config.features.oracle_exadata.enabled = true;
        config.features.virtualization.enabled = true;
        config.features.virtualization.hypervisors = vec![
            fixtures::hypervisor(HypervisorType::Vmware, "vcenter.example.com"),
            fixtures::hypervisor(HypervisorType::Ovm, "ovm.example.com"),
        ];
    })
}

#[tokio::test]
async fn test_disabled_features_are_absent() {
    let harness = TestHarness::new().with_fetcher(full_stub());
    let stub = harness.fetcher.clone();
    let report = harness.run_json().await.unwrap();

    TestHarness::assert_field_absent(&report, "features.oracle").unwrap();
    TestHarness::assert_field_absent(&report, "clusters").unwrap();
    TestHarness::assert_field_equals(&report, "hostname", &json!("db01.example.com")).unwrap();
    TestHarness::assert_field_equals(&report, "schemaVersion", &json!(1)).unwrap();
    TestHarness::assert_field_equals(&report, "tags", &json!([])).unwrap();
    assert!(stub.calls_to("oratab").is_empty());
    assert!(stub.calls_to("exadata_components").is_empty());
    assert!(stub.calls_to("hypervisor_clusters").is_empty());
}

#[tokio::test]
async fn test_report_metadata_from_configuration() {
    let harness = TestHarness::new().with_fetcher(full_stub()).with_config(|config| {
        config.hostname = "reported-name".to_string();
        config.location = "Italy".to_string();
        config.environment = "PROD".to_string();
        config.tags = vec!["erp".to_string(), "datacenter-1".to_string()];
        config.period = 12;
    });
    let report = harness.run().await.unwrap();

    assert_eq!(report.hostname, "reported-name");
    assert_eq!(report.info.hostname, "db01.example.com");
    assert_eq!(report.location, "Italy");
    assert_eq!(report.environment, "PROD");
    assert_eq!(report.tags, vec!["erp".to_string(), "datacenter-1".to_string()]);
    assert_eq!(report.period, 12);
    assert_eq!(report.agent_version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_base_probe_failures_default() {
    let fetcher = full_stub().fail("host", None).fail("filesystems", None);
    let report = TestHarness::new().with_fetcher(fetcher).run_json().await.unwrap();

    TestHarness::assert_field_equals(&report, "hostname", &json!("")).unwrap();
    TestHarness::assert_field_equals(&report, "filesystems", &json!([])).unwrap();
    TestHarness::assert_field_equals(&report, "clusterMembershipStatus.oracleClusterware", &json!(false))
        .unwrap();
}

#[tokio::test]
async fn test_all_features_enabled() {
    let report = enable_all(TestHarness::new().with_fetcher(full_stub()))
        .run_json()
        .await
        .unwrap();

    // oratab order: A, STBY, B
    assert_eq!(TestHarness::array_len(&report, "features.oracle.database.databases").unwrap(), 3);
    TestHarness::assert_field_equals(&report, "features.oracle.database.databases.1.name", &json!("STBY"))
        .unwrap();
    TestHarness::assert_field_equals(
        &report,
        "features.oracle.database.unlistedRunningDatabases",
        &json!(["TEST"]),
    )
    .unwrap();

    assert_eq!(TestHarness::array_len(&report, "features.oracle.exadata.components").unwrap(), 3);
    TestHarness::assert_field_absent(&report, "features.oracle.exadata.components.0.cellDisks").unwrap();
    assert_eq!(
        TestHarness::array_len(&report, "features.oracle.exadata.components.1.cellDisks").unwrap(),
        3
    );
    assert_eq!(
        TestHarness::array_len(&report, "features.oracle.exadata.components.2.cellDisks").unwrap(),
        2
    );

    // vcenter: two clusters; ovm has no stub data and reports an error entry
    assert_eq!(TestHarness::array_len(&report, "clusters").unwrap(), 3);
    assert_eq!(TestHarness::array_len(&report, "clusters.0.vms").unwrap(), 2);
    assert_eq!(TestHarness::array_len(&report, "clusters.1.vms").unwrap(), 1);
    TestHarness::assert_field_absent(&report, "clusters.0.fetchErrorMessage").unwrap();
    TestHarness::assert_field_equals(&report, "clusters.2.name", &json!("ovm.example.com")).unwrap();
    TestHarness::assert_field_equals(&report, "clusters.2.type", &json!("ovm")).unwrap();
    assert!(TestHarness::field(&report, "clusters.2.fetchErrorMessage").is_some());
}

#[tokio::test]
async fn test_sequential_and_concurrent_reports_are_identical() {
    let concurrent = enable_all(TestHarness::new().with_fetcher(full_stub()))
        .run()
        .await
        .unwrap();
    let sequential = enable_all(TestHarness::new().with_fetcher(full_stub()))
        .with_config(|config| config.parallelize_requests = false)
        .run()
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&concurrent).unwrap(),
        serde_json::to_string(&sequential).unwrap()
    );
}

#[tokio::test]
async fn test_each_feature_probes_as_its_own_user() {
    let harness = enable_all(TestHarness::new().with_fetcher(full_stub())).with_config(|config| {
        config.features.oracle_database.fetcher_user = "oracle".to_string();
        config.features.oracle_exadata.fetcher_user = String::new();
        config.features.virtualization.fetcher_user = "vmreader".to_string();
    });
    let stub = harness.fetcher.clone();
    harness.run().await.unwrap();

    let users = |probe: &str| -> Vec<Option<String>> {
        stub.calls_to(probe).into_iter().map(|c| c.user).collect()
    };
    assert_eq!(users("host"), vec![None]);
    assert_eq!(users("cluster_membership_status"), vec![None]);
    assert!(users("dbstatus").iter().all(|u| u.as_deref() == Some("oracle")));
    assert!(users("tablespaces").iter().all(|u| u.as_deref() == Some("oracle")));
    assert_eq!(users("exadata_components"), vec![None]);
    assert!(users("hypervisor_clusters").iter().all(|u| u.as_deref() == Some("vmreader")));
    assert_eq!(users("dbstatus").len(), 3);
}

#[tokio::test]
async fn test_exadata_requires_root() {
    let result = TestHarness::new()
        .with_fetcher(full_stub())
        .with_platform("linux", false)
        .with_config(|config| config.features.oracle_exadata.enabled = true)
        .run()
        .await;
    assert!(matches!(result, Err(BuildError::ExadataRequiresRoot)));
}

#[tokio::test]
async fn test_exadata_requires_linux() {
    let result = TestHarness::new()
        .with_fetcher(full_stub())
        .with_platform("windows", true)
        .with_config(|config| config.features.oracle_exadata.enabled = true)
        .run()
        .await;
    match result {
        Err(BuildError::ExadataUnsupportedOs { os }) => assert_eq!(os, "windows"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_fetcher_user_is_fatal() {
    let result = TestHarness::new()
        .with_fetcher(full_stub().unknown_user("ghost"))
        .with_config(|config| {
            config.features.oracle_database.enabled = true;
            config.features.oracle_database.fetcher_user = "ghost".to_string();
        })
        .run()
        .await;
    match result {
        Err(BuildError::UserSwitch { user, .. }) => assert_eq!(user, "ghost"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetcher_user_ignored_outside_linux() {
    let harness = TestHarness::new()
        .with_fetcher(full_stub().unknown_user("ghost"))
        .with_platform("windows", false)
        .with_config(|config| {
            config.features.oracle_database.enabled = true;
            config.features.oracle_database.fetcher_user = "ghost".to_string();
        });
    let stub = harness.fetcher.clone();
    let report = harness.run().await.unwrap();

    assert!(report.features.oracle.is_some());
    assert!(stub.calls_to("dbstatus").iter().all(|c| c.user.is_none()));
}

#[tokio::test]
async fn test_exadata_probe_failure_keeps_report() {
    let harness = TestHarness::new()
        .with_fetcher(full_stub().fail("exadata_cell_disks", None))
        .with_config(|config| config.features.oracle_exadata.enabled = true);
    let report = harness.run_json().await.unwrap();

    assert_eq!(TestHarness::array_len(&report, "features.oracle.exadata.components").unwrap(), 3);
    TestHarness::assert_field_absent(&report, "features.oracle.exadata.components.1.cellDisks").unwrap();
    TestHarness::assert_field_absent(&report, "features.oracle.database").unwrap();
}

#[tokio::test]
async fn test_hypervisor_password_never_reaches_report() {
    let report = enable_all(TestHarness::new().with_fetcher(full_stub()))
        .run_json()
        .await
        .unwrap();
    assert!(!report.to_string().contains("secret"));
}
