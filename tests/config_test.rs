//! Integration tests for configuration loading

use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tourguide_core::domain::TourGuideError;
use tourguide_core::infra::Config;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[rewards]
proximity_buffer_miles = 25.0
visibility_range_miles = 150.0

[tracker]
poll_interval_secs = 30

[pool]
min_workers = 8
workers_per_core = 2

[retry]
max_attempts = 5
initial_backoff_ms = 20

[seed]
internal_user_count = 12
visits_per_user = 4

[metrics]
interval_secs = 15

[[attractions]]
name = "Disneyland"
city = "Anaheim"
state = "CA"
latitude = 33.817595
longitude = -117.922008

[[attractions]]
name = "Legend Valley"
latitude = 39.937778
longitude = -82.40667
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.proximity_buffer_miles(), 25.0);
    assert_eq!(config.visibility_range_miles(), 150.0);
    assert_eq!(config.poll_interval(), Duration::from_secs(30));
    assert_eq!(config.min_workers(), 8);
    assert_eq!(config.workers_per_core(), 2);
    assert_eq!(config.retry_policy().max_attempts(), 5);
    assert_eq!(config.internal_user_count(), 12);
    assert_eq!(config.visits_per_user(), 4);
    assert_eq!(config.metrics_interval_secs(), 15);

    let attractions = config.attractions();
    assert_eq!(attractions.len(), 2);
    assert_eq!(attractions[0].city, "Anaheim");
    assert_eq!(attractions[1].name, "Legend Valley");
    assert_eq!(attractions[1].state, "");
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.config_file(), "default");
    assert_eq!(config.proximity_buffer_miles(), 10.0);
    assert_eq!(config.poll_interval(), Duration::from_secs(300));
    assert!(config.validate().is_ok());
}

#[test]
fn test_malformed_toml_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[rewards\nproximity_buffer_miles = ").unwrap();
    temp_file.flush().unwrap();

    assert!(Config::from_file(temp_file.path()).is_err());
}

#[test]
fn test_invalid_values_fail_validation() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[rewards]\nproximity_buffer_miles = 10.0\nvisibility_range_miles = 0.0\n")
        .unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();
    assert!(matches!(config.validate(), Err(TourGuideError::Configuration(_))));
}

#[test]
fn test_repo_dev_config_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/dev.toml");
    let config = Config::from_file(path).unwrap();
    assert!(config.validate().is_ok());
    assert!(config.attractions().is_empty());
}

#[test]
fn test_load_honours_config_file_env() {
    // Only test in this binary that touches CONFIG_FILE
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[tracker]\npoll_interval_secs = 42\n").unwrap();
    temp_file.flush().unwrap();
    let path = temp_file.path().display().to_string();

    std::env::set_var("CONFIG_FILE", &path);
    let from_env = Config::load(None);
    let explicit = Config::load(Some("/nonexistent/config.toml"));
    std::env::remove_var("CONFIG_FILE");

    assert_eq!(from_env.config_file(), path);
    assert_eq!(from_env.poll_interval(), Duration::from_secs(42));
    assert_eq!(explicit.config_file(), "default");
}
