//! Bootstrap Tests

use wireup_container::{ContainerOptions, ReportFormat};
use wireup_domain::ErrorKind;
use wireup_infrastructure::bootstrap::{container_from_config, init};
use wireup_infrastructure::config::{ConfigBuilder, ConfigLoader};

#[test]
fn test_container_from_config_applies_options() {
    let config = ConfigBuilder::new()
        .with_container(ContainerOptions {
            debug: true,
            report_format: ReportFormat::Json,
        })
        .build();

    let container = container_from_config(&config);
    assert!(container.options().debug);

    container.run(|| {}).unwrap();
    let report = container.last_report().unwrap();
    assert_eq!(report.nodes.len(), 1);
    assert_eq!(report.plan.len(), 1);
}

#[test]
fn test_init_loads_config_and_installs_logging() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config_path = temp_dir.path().join("wireup.toml");
    std::fs::write(
        &config_path,
        "[container]\ndebug = true\n\n[logging]\nlevel = \"warn\"\n",
    )
    .unwrap();
    let loader = ConfigLoader::new()
        .with_config_path(&config_path)
        .with_env_prefix("WIREUP_BOOTSTRAP_TEST");

    let (config, container) = init(&loader).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert!(container.options().debug);
    container.run(|| {}).unwrap();
    assert!(container.last_report().is_some());

    // The global subscriber is already installed
    let err = init(&loader).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
