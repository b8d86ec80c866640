//! Configuration files and the loader settings they drive

use crate::common::*;
use causeway::metamodel::config::CONFIG_FILE_NAME;
use tempfile::TempDir;

#[test]
fn test_default_file_is_written_once_and_parses() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    MetamodelConfig::write_default_if_missing(&path).unwrap();
    let config = MetamodelConfig::from_file(&path).unwrap();
    assert_eq!(config, MetamodelConfig::default());

    // existing files are left alone
    std::fs::write(&path, "[introspector]\nmode = \"full\"\n").unwrap();
    MetamodelConfig::write_default_if_missing(&path).unwrap();
    let config = MetamodelConfig::from_file(&path).unwrap();
    assert!(config.is_full_introspect());
}

#[test]
fn test_written_config_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    let mut config = MetamodelConfig::default();
    config.introspector.parallelize = true;
    config.introspector.mode = IntrospectionMode::Full;
    config.validator.queue_capacity = 8;
    config.lifecycle.dispose_timeout_ms = 250;
    config.write_to_file(&path).unwrap();

    let read = MetamodelConfig::from_file(&path).unwrap();
    assert_eq!(read, config);
    assert_eq!(read.dispose_timeout().as_millis(), 250);
}

#[test]
fn test_bad_files_are_config_errors() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.toml");
    assert!(matches!(
        MetamodelConfig::from_file(&missing),
        Err(MetamodelError::Config(_))
    ));

    let garbage = dir.path().join("garbage.toml");
    std::fs::write(&garbage, "introspector = 7").unwrap();
    assert!(matches!(
        MetamodelConfig::from_file(&garbage),
        Err(MetamodelError::Config(_))
    ));

    let zero = dir.path().join("zero.toml");
    std::fs::write(&zero, "[validator]\nqueue_capacity = 0\n").unwrap();
    let err = MetamodelConfig::from_file(&zero).unwrap_err();
    assert!(err.to_string().contains("queue_capacity"));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let mut config = MetamodelConfig::default();
    config.validator.queue_capacity = 0;
    let result = Model::new().builder().config(config).open();
    assert!(matches!(result, Err(MetamodelError::Config(_))));
}

#[test]
fn test_full_mode_introspects_everything_at_bootstrap() {
    let mut config = MetamodelConfig::default();
    config.introspector.mode = IntrospectionMode::Full;
    let loader = Model::new().builder().config(config).build().unwrap();

    let specs = loader.snapshot_specifications();
    assert!(!specs.is_empty());
    for spec in specs {
        assert_eq!(
            spec.introspection_state(),
            IntrospectionState::FullyIntrospected,
            "{} not fully introspected",
            spec.class().name()
        );
    }
}

#[test]
fn test_parallel_bootstrap_matches_sequential() {
    fn names(config: MetamodelConfig) -> Vec<String> {
        let loader = Model::new().builder().config(config).build().unwrap();
        let mut names: Vec<String> = loader
            .snapshot_specifications()
            .iter()
            .map(|s| s.logical_type_name().to_string())
            .collect();
        names.sort();
        names
    }

    let sequential = names(MetamodelConfig::default());
    let mut parallel = MetamodelConfig::default();
    parallel.introspector.parallelize = true;
    parallel.validator.parallelize = true;
    assert_eq!(names(parallel), sequential);
}
