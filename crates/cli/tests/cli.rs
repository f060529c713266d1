use assert_cmd::Command;
use tempfile::TempDir;

const SETTINGS_NOT_SET: &str = "You need to set your Airtable API Key and Base ID";

fn sharenote(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sharenote").unwrap();
    cmd.arg("--config-dir")
        .arg(config_dir.path())
        .env("SHARENOTE_ENV", "local")
        .env_remove("SHARENOTE__STORE__API_KEY")
        .env_remove("SHARENOTE__STORE__BASE_ID")
        .env_remove("SHARENOTE__STORE__TABLE")
        .env_remove("SHARENOTE__SITE__WEBSITE_URL");
    cmd
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn publish_without_settings_is_rejected() {
    let config_dir = TempDir::new().unwrap();
    let note = config_dir.path().join("Hello.md");
    std::fs::write(&note, "# Hello").unwrap();

    let output = sharenote(&config_dir)
        .arg("publish")
        .arg(&note)
        .arg("--vault")
        .arg(config_dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains(SETTINGS_NOT_SET));
    assert!(output.stdout.is_empty());
}

#[test]
fn remove_without_settings_is_rejected() {
    let config_dir = TempDir::new().unwrap();

    let output = sharenote(&config_dir)
        .args(["remove", "Hello.md"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains(SETTINGS_NOT_SET));
}

#[test]
fn publish_outside_vault_fails_before_any_store_call() {
    let config_dir = TempDir::new().unwrap();
    let vault = TempDir::new().unwrap();
    let note = config_dir.path().join("Hello.md");
    std::fs::write(&note, "# Hello").unwrap();

    let output = sharenote(&config_dir)
        .arg("publish")
        .arg(&note)
        .arg("--vault")
        .arg(vault.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("is not inside the vault"));
}

#[test]
fn config_set_then_show_masks_api_key() {
    let config_dir = TempDir::new().unwrap();

    sharenote(&config_dir)
        .args(["config", "set", "api-key", "keyABCDEF1234"])
        .assert()
        .success();
    sharenote(&config_dir)
        .args(["config", "set", "website_url", "https://notes.example.com"])
        .assert()
        .success();

    let output = sharenote(&config_dir)
        .args(["config", "show"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("api-key = ****1234"));
    assert!(!stdout.contains("keyABCDEF1234"));
    assert!(stdout.contains("website-url = https://notes.example.com"));
    assert!(stdout.contains("base-id = (not set)"));
    assert!(config_dir.path().join("credentials.toml").exists());
}

#[test]
fn config_set_rejects_unknown_key() {
    let config_dir = TempDir::new().unwrap();

    sharenote(&config_dir)
        .args(["config", "set", "password", "hunter2"])
        .assert()
        .failure();
    assert!(!config_dir.path().join("credentials.toml").exists());
}

#[test]
fn slug_prints_derived_slug() {
    let config_dir = TempDir::new().unwrap();

    let output = sharenote(&config_dir)
        .args(["slug", "Daily/2023-01-05.md"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "daily-2023-01-05md");
}
