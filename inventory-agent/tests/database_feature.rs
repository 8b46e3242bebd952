use inventory_agent::model::{DatabaseStatus, HardwareAbstractionTechnology, HostReport, OracleDatabase};
use inventory_devkit::fixtures::{self, ENTERPRISE_VERSION, STANDARD_VERSION};
use inventory_devkit::{StubFetcher, TestHarness};
use serde_json::json;

fn harness(fetcher: StubFetcher) -> TestHarness {
    TestHarness::new()
        .with_fetcher(fetcher)
        .with_config(|config| config.features.oracle_database.enabled = true)
}

fn physical_stub() -> StubFetcher {
    StubFetcher::new()
        .with_host(fixtures::physical_host("db01"))
        .with_filesystems(fixtures::filesystems())
}

fn databases(report: HostReport) -> Vec<OracleDatabase> {
    report
        .features
        .oracle
        .and_then(|oracle| oracle.database)
        .map(|feature| feature.databases)
        .unwrap_or_default()
}

fn license_counts(database: &OracleDatabase) -> Vec<(String, f64)> {
    database.licenses.iter().map(|l| (l.name.clone(), l.count)).collect()
}

fn counts(exe: f64, ent: f64, std: f64) -> Vec<(String, f64)> {
    vec![
        ("Oracle EXE".to_string(), exe),
        ("Oracle ENT".to_string(), ent),
        ("Oracle STD".to_string(), std),
    ]
}

#[tokio::test]
async fn test_unlisted_running_databases() {
    let fetcher = physical_stub()
        .with_database("A", "/u01/app/oracle/a", fixtures::open_database("A", ENTERPRISE_VERSION))
        .with_database("B", "/u01/app/oracle/b", fixtures::open_database("B", ENTERPRISE_VERSION))
        .with_running(&["B", "C"]);
    let harness = harness(fetcher);

    let first = harness.run().await.unwrap();
    let database = first.features.oracle.as_ref().unwrap().database.as_ref().unwrap();
    assert_eq!(database.unlisted_running_databases, vec!["C".to_string()]);
    let names: Vec<&str> = database.databases.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);

    let second = harness.run().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_open_database_collects_everything() {
    let fetcher = physical_stub().with_database(
        "ORCL",
        "/u01/app/oracle/product/19.0.0/dbhome_1",
        fixtures::open_database("ORCL", ENTERPRISE_VERSION),
    );
    let report = harness(fetcher).run_json().await.unwrap();

    let db = "features.oracle.database.databases.0";
    TestHarness::assert_field_equals(&report, &format!("{db}.status"), &json!("READ WRITE")).unwrap();
    for collection in [
        "tablespaces",
        "schemas",
        "patches",
        "featureUsageStats",
        "addms",
        "segmentAdvisors",
        "psus",
        "backups",
        "partitionings",
    ] {
        assert_eq!(
            TestHarness::array_len(&report, &format!("{db}.{collection}")).unwrap(),
            1,
            "{collection}"
        );
    }
    assert_eq!(TestHarness::array_len(&report, &format!("{db}.pdbs")).unwrap(), 0);
    assert_eq!(TestHarness::array_len(&report, &format!("{db}.services")).unwrap(), 0);
    assert_eq!(TestHarness::array_len(&report, &format!("{db}.licenses")).unwrap(), 3);
}

#[tokio::test]
async fn test_mounted_database_has_only_licenses() {
    let fetcher = physical_stub().with_database(
        "STBY",
        "/u01/app/oracle/stby",
        fixtures::mounted_database("STBY", STANDARD_VERSION),
    );
    let stub = fetcher.clone();
    let report = harness(fetcher).run().await.unwrap();

    let databases = databases(report);
    assert_eq!(databases.len(), 1);
    let database = &databases[0];
    assert_eq!(database.status, DatabaseStatus::Mounted);
    assert_eq!(database.role, "PHYSICAL STANDBY");
    assert!(database.tablespaces.is_empty());
    assert!(database.schemas.is_empty());
    assert!(database.patches.is_empty());
    assert!(database.backups.is_empty());
    assert!(database.partitionings.is_empty());
    // Standard edition on a physical host: sockets * cores
    assert_eq!(license_counts(database), counts(0.0, 0.0, 32.0));

    assert!(stub.calls_to("tablespaces").is_empty());
    assert!(stub.calls_to("dbversion").is_empty());
}

#[tokio::test]
async fn test_read_only_database_is_collected_as_open() {
    let fetcher = physical_stub().with_database(
        "RO",
        "/u01/app/oracle/ro",
        fixtures::database_with_status("RO", "READ ONLY"),
    );
    let stub = fetcher.clone();
    let report = harness(fetcher).run().await.unwrap();

    let databases = databases(report);
    assert_eq!(databases.len(), 1);
    assert_eq!(databases[0].status, DatabaseStatus::ReadOnly);
    assert_eq!(databases[0].tablespaces.len(), 1);
    assert_eq!(databases[0].partitionings.len(), 1);
    assert_eq!(stub.calls_to("db").len(), 1);
    assert!(stub.calls_to("dbmounted").is_empty());
}

#[tokio::test]
async fn test_read_only_with_apply_is_collected_as_mounted() {
    let fetcher = physical_stub().with_database(
        "ADG",
        "/u01/app/oracle/adg",
        fixtures::database_with_status("ADG", "READ ONLY WITH APPLY"),
    );
    let stub = fetcher.clone();
    let report = harness(fetcher).run().await.unwrap();

    let databases = databases(report);
    assert_eq!(databases.len(), 1);
    let database = &databases[0];
    assert_eq!(database.status, DatabaseStatus::ReadOnlyWithApply);
    assert!(database.tablespaces.is_empty());
    assert!(database.schemas.is_empty());
    // Enterprise on a physical host: 0.5 * 16 cores
    assert_eq!(license_counts(database), counts(0.0, 8.0, 0.0));
    assert_eq!(stub.calls_to("dbmounted").len(), 1);
    assert!(stub.calls_to("tablespaces").is_empty());
}

#[tokio::test]
async fn test_unknown_status_drops_only_that_instance() {
    let fetcher = physical_stub()
        .with_database("FOO", "/u01/app/oracle/foo", fixtures::database_with_status("FOO", "FOO"))
        .with_database("ORCL", "/u01/app/oracle/orcl", fixtures::open_database("ORCL", ENTERPRISE_VERSION));
    let report = harness(fetcher).run().await.unwrap();

    let databases = databases(report);
    assert_eq!(databases.len(), 1);
    assert_eq!(databases[0].name, "ORCL");
}

#[tokio::test]
async fn test_status_probe_failure_drops_instance() {
    let fetcher = physical_stub()
        .with_database("A", "/u01/app/oracle/a", fixtures::open_database("A", ENTERPRISE_VERSION))
        .with_database("B", "/u01/app/oracle/b", fixtures::open_database("B", ENTERPRISE_VERSION))
        .fail("dbstatus", Some("A"));
    let report = harness(fetcher).run().await.unwrap();

    let databases = databases(report);
    let names: Vec<&str> = databases.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["B"]);
}

#[tokio::test]
async fn test_sub_probe_failure_leaves_only_its_field_empty() {
    for parallel in [true, false] {
        let fetcher = physical_stub()
            .with_database("A", "/u01/app/oracle/a", fixtures::open_database("A", ENTERPRISE_VERSION))
            .with_database("B", "/u01/app/oracle/b", fixtures::open_database("B", ENTERPRISE_VERSION))
            .fail("tablespaces", Some("A"))
            .panic_on("schemas", Some("A"));
        let report = harness(fetcher)
            .with_config(|config| config.parallelize_requests = parallel)
            .run()
            .await
            .unwrap();

        let databases = databases(report);
        assert_eq!(databases.len(), 2);
        assert!(databases[0].tablespaces.is_empty());
        assert!(databases[0].schemas.is_empty());
        assert_eq!(databases[0].patches.len(), 1);
        assert_eq!(databases[0].licenses.len(), 3);
        assert_eq!(databases[1].tablespaces.len(), 1);
        assert_eq!(databases[1].schemas.len(), 1);
    }
}

#[tokio::test]
async fn test_licenses_fall_back_to_rules() {
    let fetcher = physical_stub().with_database(
        "ORCL",
        "/u01/app/oracle/orcl",
        fixtures::open_database("ORCL", ENTERPRISE_VERSION),
    );
    let report = harness(fetcher).run().await.unwrap();

    let databases = databases(report);
    let database = &databases[0];
    // Enterprise on a physical host: 0.5 * 16 cores
    assert_eq!(license_counts(database), counts(0.0, 8.0, 0.0));
}

#[tokio::test]
async fn test_probed_licenses_are_normalized() {
    let probed = vec![
        fixtures::license("Oracle Diagnostics Pack", 1.0),
        fixtures::license("oracle ent", 4.0),
    ];
    let fetcher = physical_stub().with_database(
        "ORCL",
        "/u01/app/oracle/orcl",
        fixtures::open_database_with_licenses("ORCL", ENTERPRISE_VERSION, probed),
    );
    let report = harness(fetcher).run().await.unwrap();

    let databases = databases(report);
    let database = &databases[0];
    assert_eq!(license_counts(database), counts(0.0, 4.0, 0.0));
}

#[tokio::test]
async fn test_failing_license_probe_falls_back_to_rules() {
    let fetcher = StubFetcher::new()
        .with_host(fixtures::virtual_host("vm01", HardwareAbstractionTechnology::Vmware))
        .with_database(
            "ORCL",
            "/u01/app/oracle/orcl",
            fixtures::open_database_with_licenses("ORCL", ENTERPRISE_VERSION, vec![fixtures::license("Oracle ENT", 99.0)]),
        )
        .fail("licenses", Some("ORCL"));
    let report = harness(fetcher).run().await.unwrap();

    let databases = databases(report);
    let database = &databases[0];
    assert_eq!(license_counts(database), counts(0.0, 4.0, 0.0));
}

#[tokio::test]
async fn test_unknown_virtualization_gives_negative_licenses() {
    let fetcher = StubFetcher::new()
        .with_host(fixtures::virtual_host(
            "lpar01",
            HardwareAbstractionTechnology::Other("LPAR".to_string()),
        ))
        .with_database(
            "ORCL",
            "/u01/app/oracle/orcl",
            fixtures::open_database("ORCL", ENTERPRISE_VERSION),
        );
    let report = harness(fetcher).run().await.unwrap();

    let databases = databases(report);
    let database = &databases[0];
    assert_eq!(license_counts(database), counts(0.0, -8.0, 0.0));
}

#[tokio::test]
async fn test_force_stats_runs_before_describing() {
    let fetcher = physical_stub()
        .with_database("A", "/u01/app/oracle/a", fixtures::open_database("A", ENTERPRISE_VERSION))
        .with_database("STBY", "/u01/app/oracle/stby", fixtures::mounted_database("STBY", ENTERPRISE_VERSION));
    let stub = fetcher.clone();
    harness(fetcher)
        .with_config(|config| config.features.oracle_database.force_stats = true)
        .run()
        .await
        .unwrap();

    let stats = stub.calls_to("stats");
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].target.as_deref(), Some("A"));

    let calls: Vec<String> = stub
        .calls()
        .into_iter()
        .filter(|c| c.target.as_deref() == Some("A"))
        .map(|c| c.probe)
        .collect();
    let position = |probe: &str| calls.iter().position(|c| c == probe).unwrap();
    assert!(position("dbversion") < position("stats"));
    assert!(position("stats") < position("db"));
}

#[tokio::test]
async fn test_stats_not_forced_by_default() {
    let fetcher = physical_stub().with_database(
        "A",
        "/u01/app/oracle/a",
        fixtures::open_database("A", ENTERPRISE_VERSION),
    );
    let stub = fetcher.clone();
    harness(fetcher).run().await.unwrap();
    assert!(stub.calls_to("stats").is_empty());
}

#[tokio::test]
async fn test_empty_oratab() {
    let fetcher = physical_stub().with_running(&["ORPHAN"]);
    let report = harness(fetcher).run_json().await.unwrap();

    TestHarness::assert_field_equals(&report, "features.oracle.database.databases", &json!([])).unwrap();
    TestHarness::assert_field_equals(
        &report,
        "features.oracle.database.unlistedRunningDatabases",
        &json!(["ORPHAN"]),
    )
    .unwrap();
}
