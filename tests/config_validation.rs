//! Integration tests for configuration validation

#![allow(clippy::expect_used)]

use secure_echo::config::{
    ChannelConfig, ClientConfig, LoggingConfig, ServerConfig, DEFAULT_BUFFER_CAPACITY,
    MAX_BUFFER_CAPACITY,
};
use secure_echo::error::ChannelError;
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = ChannelConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
}

#[test]
fn test_default_buffer_is_32k() {
    assert_eq!(ServerConfig::default().buffer_capacity, 32 * 1024);
    assert_eq!(DEFAULT_BUFFER_CAPACITY, 1 << 15);
}

#[test]
fn test_invalid_server_address() {
    let mut config = ChannelConfig::default();
    config.server.address = "invalid_address".to_string();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Invalid server address")));
}

#[test]
fn test_empty_server_address() {
    let mut config = ChannelConfig::default();
    config.server.address = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_zero_buffer_capacity() {
    let mut config = ChannelConfig::default();
    config.server.buffer_capacity = 0;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Buffer capacity must be greater than 0")));
}

#[test]
fn test_excessive_buffer_capacity() {
    let mut config = ChannelConfig::default();
    config.server.buffer_capacity = MAX_BUFFER_CAPACITY + 1;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Buffer capacity too large")));
}

#[test]
fn test_client_accepts_host_names() {
    let config = ClientConfig {
        address: "echo.example.org:4000".to_string(),
    };
    assert!(config.validate().is_empty());
}

#[test]
fn test_invalid_client_address() {
    let mut config = ChannelConfig::default();
    config.client.address = "no-port-here".to_string();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Invalid client address")));

    config.client.address = "localhost:99999".to_string();
    assert!(!config.validate().is_empty());
}

#[test]
fn test_empty_app_name() {
    let config = LoggingConfig {
        app_name: String::new(),
        ..LoggingConfig::default()
    };
    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Application name cannot be empty")));
}

#[test]
fn test_validate_strict_collects_all_errors() {
    let config = ChannelConfig::default_with_overrides(|c| {
        c.server.address = String::new();
        c.server.buffer_capacity = 0;
    });

    match config.validate_strict() {
        Err(ChannelError::ConfigError(msg)) => {
            assert!(msg.contains("cannot be empty"));
            assert!(msg.contains("Buffer capacity"));
        }
        other => panic!("Expected ConfigError, got {other:?}"),
    }
}

#[test]
fn test_toml_round_trip() {
    let toml = r#"
        [server]
        address = "0.0.0.0:7000"
        buffer_capacity = 4096

        [client]
        address = "localhost:7000"

        [logging]
        app_name = "echo-test"
        log_level = "debug"
        json_format = true
    "#;

    let config = ChannelConfig::from_toml(toml).expect("valid TOML");
    assert_eq!(config.server.address, "0.0.0.0:7000");
    assert_eq!(config.server.buffer_capacity, 4096);
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.logging.json_format);

    let rendered = ChannelConfig::example_config();
    let reparsed = ChannelConfig::from_toml(&rendered).expect("example config parses");
    assert_eq!(reparsed.server.address, ServerConfig::default().address);
}

#[test]
fn test_missing_sections_use_defaults() {
    let toml = r#"
        [server]
        address = "127.0.0.1:1"
        buffer_capacity = 8
    "#;
    let config = ChannelConfig::from_toml(toml).expect("partial config parses");
    assert_eq!(config.client.address, ClientConfig::default().address);
    assert_eq!(config.logging.app_name, "secure-echo");
}

#[test]
fn test_bad_log_level_rejected() {
    let toml = r#"
        [logging]
        app_name = "x"
        log_level = "loud"
        json_format = false
    "#;
    assert!(matches!(
        ChannelConfig::from_toml(toml),
        Err(ChannelError::ConfigError(_))
    ));
}

#[test]
fn test_save_and_load_file() {
    let path = std::env::temp_dir().join(format!("secure-echo-{}.toml", std::process::id()));
    let config = ChannelConfig::default_with_overrides(|c| c.server.buffer_capacity = 512);

    config.save_to_file(&path).expect("config saves");
    let loaded = ChannelConfig::from_file(&path).expect("config loads");
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.server.buffer_capacity, 512);
}

#[test]
fn test_missing_file_is_config_error() {
    let result = ChannelConfig::from_file("/definitely/not/here.toml");
    assert!(matches!(result, Err(ChannelError::ConfigError(_))));
}

const ENV_VARS: [&str; 4] = [
    "SECURE_ECHO_SERVER_ADDRESS",
    "SECURE_ECHO_CLIENT_ADDRESS",
    "SECURE_ECHO_BUFFER_CAPACITY",
    "SECURE_ECHO_LOG_LEVEL",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

// Environment is process-wide, so every override case runs in this one test.
#[test]
fn test_environment_overrides() {
    clear_env();

    std::env::set_var("SECURE_ECHO_SERVER_ADDRESS", "0.0.0.0:7100");
    std::env::set_var("SECURE_ECHO_CLIENT_ADDRESS", "echo.internal:7100");
    std::env::set_var("SECURE_ECHO_BUFFER_CAPACITY", "4096");
    std::env::set_var("SECURE_ECHO_LOG_LEVEL", "warn");

    let config = ChannelConfig::from_env().expect("env overrides apply");
    assert_eq!(config.server.address, "0.0.0.0:7100");
    assert_eq!(config.client.address, "echo.internal:7100");
    assert_eq!(config.server.buffer_capacity, 4096);
    assert_eq!(config.logging.log_level, Level::WARN);

    // Environment wins over values loaded from a file
    let mut from_file = ChannelConfig::from_toml(
        r#"
        [server]
        address = "127.0.0.1:7000"
        buffer_capacity = 512
    "#,
    )
    .expect("valid TOML");
    from_file.apply_env().expect("env overrides apply");
    assert_eq!(from_file.server.address, "0.0.0.0:7100");
    assert_eq!(from_file.server.buffer_capacity, 4096);

    clear_env();
    std::env::set_var("SECURE_ECHO_BUFFER_CAPACITY", "lots");
    match ChannelConfig::from_env() {
        Err(ChannelError::ConfigError(msg)) => {
            assert!(msg.contains("SECURE_ECHO_BUFFER_CAPACITY"));
        }
        other => panic!("Expected ConfigError, got {other:?}"),
    }

    clear_env();
    std::env::set_var("SECURE_ECHO_LOG_LEVEL", "loud");
    match ChannelConfig::from_env() {
        Err(ChannelError::ConfigError(msg)) => {
            assert!(msg.contains("SECURE_ECHO_LOG_LEVEL"));
        }
        other => panic!("Expected ConfigError, got {other:?}"),
    }

    clear_env();
    let config = ChannelConfig::from_env().expect("no overrides");
    assert_eq!(config.server.address, ServerConfig::default().address);
}
