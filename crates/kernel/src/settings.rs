use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "SHARENOTE_ENV";
const CONFIG_DIR_ENV: &str = "SHARENOTE_CONFIG_DIR";
const ENV_PREFIX: &str = "SHARENOTE";

/// File the `config set` editor persists credentials into.
pub const CREDENTIALS_FILE: &str = "credentials.toml";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, persisted
    /// credentials, environment overlay and `SHARENOTE__*` variables.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let config_dir = config_dir()?;
        Self::load_from(&config_dir, &current_environment())
    }

    /// Like [`Settings::load`], with the configuration directory given.
    pub fn load_in(config_dir: &Path) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        Self::load_from(config_dir, &current_environment())
    }

    /// Load configuration from an explicit directory and environment name.
    pub fn load_from(config_dir: &Path, environment: &str) -> anyhow::Result<Self> {
        let environment: Environment = environment.parse()?;

        let base_path = config_dir.join("base.toml");
        let credentials_path = config_dir.join(CREDENTIALS_FILE);
        let environment_path = config_dir.join(format!("{}.toml", environment_name(&environment)));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(credentials_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = environment;

        tracing::debug!(
            config_dir = %config_dir.display(),
            env = ?settings.environment,
            "settings loaded"
        );

        Ok(settings)
    }
}

fn current_environment() -> String {
    std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string())
}

fn environment_name(environment: &Environment) -> &'static str {
    match environment {
        Environment::Local => "local",
        Environment::Staging => "staging",
        Environment::Production => "production",
    }
}

/// Resolve the configuration directory: `SHARENOTE_CONFIG_DIR`, else
/// `./config`.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) => Ok(PathBuf::from(dir)),
        Err(_) => std::env::current_dir()
            .map(|cwd| cwd.join("config"))
            .with_context(|| "unable to resolve current directory"),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Credentials and location of the backing record table.
#[derive(Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "StoreSettings::default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_id: String,
    #[serde(default)]
    pub table: String,
}

impl StoreSettings {
    fn default_api_url() -> String {
        "https://api.airtable.com/v0".to_string()
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            api_url: Self::default_api_url(),
            api_key: String::new(),
            base_id: String::new(),
            table: String::new(),
        }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("api_url", &self.api_url)
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_id", &self.base_id)
            .field("table", &self.table)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SiteSettings {
    /// Public base URL of the site serving `/notes/{slug}`.
    #[serde(default)]
    pub website_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default = "TelemetrySettings::default_level")]
    pub level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl TelemetrySettings {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Render a secret as `****` plus its last four characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if tail.chars().count() == secret.chars().count() {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}

/// One of the user-editable configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKey {
    ApiKey,
    BaseId,
    Table,
    WebsiteUrl,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 4] = [
        CredentialKey::ApiKey,
        CredentialKey::BaseId,
        CredentialKey::Table,
        CredentialKey::WebsiteUrl,
    ];

    /// Table and key inside `credentials.toml`.
    pub fn path(self) -> (&'static str, &'static str) {
        match self {
            CredentialKey::ApiKey => ("store", "api_key"),
            CredentialKey::BaseId => ("store", "base_id"),
            CredentialKey::Table => ("store", "table"),
            CredentialKey::WebsiteUrl => ("site", "website_url"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CredentialKey::ApiKey => "api-key",
            CredentialKey::BaseId => "base-id",
            CredentialKey::Table => "table",
            CredentialKey::WebsiteUrl => "website-url",
        }
    }

    /// Current value of this key in `settings`.
    pub fn read(self, settings: &Settings) -> &str {
        match self {
            CredentialKey::ApiKey => &settings.store.api_key,
            CredentialKey::BaseId => &settings.store.base_id,
            CredentialKey::Table => &settings.store.table,
            CredentialKey::WebsiteUrl => &settings.site.website_url,
        }
    }
}

impl FromStr for CredentialKey {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        CredentialKey::ALL
            .into_iter()
            .find(|key| key.name() == normalized)
            .ok_or_else(|| {
                anyhow!(
                    "unknown setting '{}'; expected one of api-key, base-id, table, website-url",
                    value
                )
            })
    }
}

/// Persist one credential into `<config_dir>/credentials.toml`, keeping any
/// other values already stored there.
pub fn save_credential(config_dir: &Path, key: CredentialKey, value: &str) -> anyhow::Result<()> {
    let path = config_dir.join(CREDENTIALS_FILE);

    let mut document: toml::Table = match std::fs::read_to_string(&path) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("failed to parse {}", path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let (section, field) = key.path();
    let table = document
        .entry(section)
        .or_insert(toml::Value::Table(toml::Table::new()));
    let table = table
        .as_table_mut()
        .ok_or_else(|| anyhow!("'{}' in {} is not a table", section, path.display()))?;
    table.insert(field.to_string(), toml::Value::String(value.trim().to_string()));

    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("failed to create {}", config_dir.display()))?;
    let rendered = toml::to_string_pretty(&document).context("failed to render credentials")?;
    std::fs::write(&path, rendered).with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(setting = key.name(), path = %path.display(), "setting saved");
    Ok(())
}
