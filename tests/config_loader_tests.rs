//! Integration tests for layered configuration loading.

use std::fs;

use anyhow::Result;
use rbac::config::{ConfigError, ConfigLoader};
use tempfile::tempdir;

#[test]
fn later_env_layers_override_earlier_ones() -> Result<()> {
    let dir = tempdir()?;

    fs::write(
        dir.path().join(".env"),
        "RBAC_PROFILE=test\nRBAC_OPERATOR_TOKEN=base-secret\nRBAC_LOG_LEVEL=warn\n",
    )?;
    fs::write(dir.path().join(".env.local"), "RBAC_LOG_LEVEL=debug\n")?;
    fs::write(
        dir.path().join(".env.test"),
        "RBAC_DATABASE_URL=sqlite::memory:\n",
    )?;

    let config = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load()?;

    assert_eq!(config.profile, "test");
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.database_url, "sqlite::memory:");
    assert_eq!(config.operator_tokens, vec!["base-secret".to_string()]);
    Ok(())
}

#[test]
fn profile_overlay_wins_over_base_layers() -> Result<()> {
    let dir = tempdir()?;

    fs::write(
        dir.path().join(".env"),
        "RBAC_PROFILE=test\nRBAC_OPERATOR_TOKEN=secret\nRBAC_API_BIND_ADDR=0.0.0.0:8080\n",
    )?;
    fs::write(
        dir.path().join(".env.test"),
        "RBAC_API_BIND_ADDR=127.0.0.1:9090\n",
    )?;
    fs::write(
        dir.path().join(".env.test.local"),
        "RBAC_API_BIND_ADDR=127.0.0.1:9091\n",
    )?;

    let config = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load()?;

    assert_eq!(config.api_bind_addr, "127.0.0.1:9091");
    Ok(())
}

#[test]
fn missing_operator_tokens_fail_validation() {
    let dir = tempdir().expect("tempdir");

    fs::write(dir.path().join(".env"), "RBAC_PROFILE=isolated-test\n").expect("write .env");

    let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
    assert!(matches!(result, Err(ConfigError::MissingOperatorTokens)));
}

#[test]
fn operator_tokens_accept_a_comma_separated_list() -> Result<()> {
    let dir = tempdir()?;

    fs::write(
        dir.path().join(".env"),
        "RBAC_PROFILE=test\nRBAC_OPERATOR_TOKENS=alpha, beta ,gamma\n",
    )?;

    let config = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load()?;

    assert_eq!(
        config.operator_tokens,
        vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()]
    );
    Ok(())
}

#[test]
fn invalid_bind_addr_is_rejected() {
    let dir = tempdir().expect("tempdir");

    fs::write(
        dir.path().join(".env"),
        "RBAC_PROFILE=test\nRBAC_OPERATOR_TOKEN=secret\nRBAC_API_BIND_ADDR=not-an-addr\n",
    )
    .expect("write .env");

    let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
    assert!(matches!(result, Err(ConfigError::InvalidBindAddr { .. })));
}

#[test]
fn unknown_keys_are_ignored_and_defaults_apply() -> Result<()> {
    let dir = tempdir()?;

    fs::write(
        dir.path().join(".env"),
        "RBAC_PROFILE=test\nRBAC_OPERATOR_TOKEN=secret\nRBAC_UNKNOWN_SETTING=whatever\nUNPREFIXED=skipped\n",
    )?;

    let config = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load()?;

    assert_eq!(config.db_max_connections, 10);
    assert_eq!(config.log_format, "json");
    Ok(())
}
