use std::{fs, time::Duration};

use keyward_config::{ConfigLoadError, ConfigLoader, ConfigOverrides};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn toml_file_and_env_file_are_layered() {
    let dir = TempDir::new().unwrap();
    let toml = write(
        &dir,
        "keyward.toml",
        r#"
        [server]
        host = "127.0.0.1"
        port = 9100

        [auth]
        password_pepper = "file-pepper-value"
        token_key = "file-token-key"
        session_lifetime_secs = 900

        [auth.hash]
        memory_kib = 8
        iterations = 1
        parallelism = 1

        [sweeper]
        enabled = true
        interval = "45s"
        "#,
    );
    let env_file = write(
        &dir,
        "keyward.env",
        "KEYWARD_TEST_ONLY_MARKER=1\nAUTH_TOKEN_KEY=env-file-token-key\n",
    );

    let load = ConfigLoader::new()
        .with_config_path(&toml)
        .with_env_file(&env_file)
        .load()
        .unwrap();
    let config = load.config;

    assert_eq!(config.bind_address(), "127.0.0.1:9100");
    assert_eq!(config.auth.password_pepper, "file-pepper-value");
    assert_eq!(config.auth.token_key, "env-file-token-key");
    assert_eq!(config.auth.session_lifetime.as_secs(), 900);
    assert_eq!(config.auth.hash_cost.memory_kib, 8);
    assert!(config.sweeper.enabled);
    assert_eq!(config.sweeper.interval, Duration::from_secs(45));
    assert_eq!(config.metadata.config_path.as_deref(), Some(toml.as_path()));
    assert!(config.metadata.env_file_loaded);
    assert!(load.warnings.is_empty());
}

#[test]
fn cli_overrides_beat_the_file() {
    let dir = TempDir::new().unwrap();
    let toml = write(&dir, "keyward.toml", "[server]\nport = 9100\n");

    let config = ConfigLoader::new()
        .with_config_path(&toml)
        .with_env_file(dir.path().join("missing.env"))
        .with_overrides(ConfigOverrides {
            port: Some(9200),
            session_lifetime_secs: Some(30),
            ..Default::default()
        })
        .load()
        .unwrap()
        .config;

    assert_eq!(config.server.port, 9200);
    assert_eq!(config.auth.session_lifetime.as_secs(), 30);
    assert!(!config.metadata.env_file_loaded);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = ConfigLoader::new()
        .with_config_path(dir.path().join("nope.toml"))
        .with_env_file(dir.path().join("missing.env"))
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
}

#[test]
fn malformed_toml_reports_the_path() {
    let dir = TempDir::new().unwrap();
    let toml = write(&dir, "keyward.toml", "[server\nport = ");

    let err = ConfigLoader::new()
        .with_config_path(&toml)
        .with_env_file(dir.path().join("missing.env"))
        .load()
        .unwrap_err();
    match err {
        ConfigLoadError::Parse { path, .. } => assert_eq!(path, toml),
        other => panic!("unexpected error: {other:?}"),
    }
}
