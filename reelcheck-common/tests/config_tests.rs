//! Configuration precedence tests

use std::io::Write;

use reelcheck_common::config::{ConfigOverrides, ServerConfig, DEFAULT_PORT};
use serial_test::serial;

fn clear_env() {
    for var in [
        "REELCHECK_HOST",
        "REELCHECK_PORT",
        "REELCHECK_DATABASE",
        "REELCHECK_VISION_ENDPOINT",
        "REELCHECK_VISION_API_KEY",
        "REELCHECK_COMPARATOR_TIMEOUT_MS",
        "REELCHECK_COMPARATOR_FAIL_FAST",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp config file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
#[serial]
fn defaults_apply_without_any_source() {
    clear_env();
    let config = ServerConfig::load(&ConfigOverrides::default()).unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, DEFAULT_PORT);
    assert!(config.comparator.endpoint.is_none());
    assert!(!config.comparator.fail_fast);
}

#[test]
#[serial]
fn toml_file_overrides_defaults() {
    clear_env();
    let file = write_config(
        r#"
        host = "0.0.0.0"
        port = 8080
        database = "/tmp/reelcheck-test.db"

        [comparator]
        endpoint = "https://vision.example.com/compare"
        timeout_ms = 1500
        fail_fast = true
        "#,
    );

    let overrides = ConfigOverrides {
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = ServerConfig::load(&overrides).unwrap();
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert_eq!(config.database_path.to_str().unwrap(), "/tmp/reelcheck-test.db");
    assert_eq!(
        config.comparator.endpoint.as_deref(),
        Some("https://vision.example.com/compare")
    );
    assert_eq!(config.comparator.timeout_ms, 1500);
    assert!(config.comparator.fail_fast);
}

#[test]
#[serial]
fn environment_overrides_toml() {
    clear_env();
    let file = write_config("port = 8080\n");
    std::env::set_var("REELCHECK_PORT", "9000");

    let overrides = ConfigOverrides {
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = ServerConfig::load(&overrides).unwrap();
    assert_eq!(config.port, 9000);

    clear_env();
}

#[test]
#[serial]
fn cli_argument_overrides_environment() {
    clear_env();
    std::env::set_var("REELCHECK_PORT", "9000");

    let overrides = ConfigOverrides {
        port: Some(9100),
        ..Default::default()
    };
    let config = ServerConfig::load(&overrides).unwrap();
    assert_eq!(config.port, 9100);

    clear_env();
}

#[test]
#[serial]
fn invalid_port_env_is_a_config_error() {
    clear_env();
    std::env::set_var("REELCHECK_PORT", "not-a-port");

    let result = ServerConfig::load(&ConfigOverrides::default());
    assert!(result.is_err());

    clear_env();
}
