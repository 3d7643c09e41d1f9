use std::path::PathBuf;

use spafcli::config::{Settings, load_env};

fn temp_env_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("spafcli-{}-{}.env", name, std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_load_env_missing_explicit_file_fails() {
    let path = std::env::temp_dir().join("spafcli-does-not-exist.env");

    let err = load_env(Some(path)).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_load_env_reads_explicit_file() {
    let path = temp_env_file("explicit", "SPAFCLI_CONFIG_TEST_VALUE=loaded\n");

    load_env(Some(path.clone())).await.unwrap();

    assert_eq!(std::env::var("SPAFCLI_CONFIG_TEST_VALUE").unwrap(), "loaded");
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_settings_debug_redacts_secret() {
    let settings = Settings::new("client", "super-secret");
    let printed = format!("{:?}", settings);

    assert!(printed.contains("client"));
    assert!(!printed.contains("super-secret"));
}

#[test]
fn test_settings_normalized_clamps_tunables() {
    let mut settings = Settings::new("client", "secret");
    settings.page_size = 500;
    settings.workers = 0;
    settings.max_attempts = 0;
    settings.api_url = "http://localhost/v1/".to_string();

    let settings = settings.normalized();

    assert_eq!(settings.page_size, 50);
    assert_eq!(settings.workers, 1);
    assert_eq!(settings.max_attempts, 1);
    assert_eq!(settings.api_url, "http://localhost/v1");
}
