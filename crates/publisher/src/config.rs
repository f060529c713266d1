use sharenote_kernel::settings::{mask_secret, CredentialKey, Settings};
use thiserror::Error;

/// One or more required settings are blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing configuration: {}", missing.join(", "))]
pub struct ConfigError {
    pub missing: Vec<&'static str>,
}

/// Snapshot of the settings a [`crate::Publisher`] needs, taken once when it
/// is built.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PublisherConfig {
    pub api_key: String,
    pub base_id: String,
    pub table: String,
    pub website_url: String,
}

impl PublisherConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            api_key: settings.store.api_key.clone(),
            base_id: settings.store.base_id.clone(),
            table: settings.store.table.clone(),
            website_url: settings.site.website_url.clone(),
        }
    }

    /// Setter invoked by the configuration editor on each field change.
    pub fn set(&mut self, key: CredentialKey, value: &str) {
        let value = value.trim().to_string();
        match key {
            CredentialKey::ApiKey => self.api_key = value,
            CredentialKey::BaseId => self.base_id = value,
            CredentialKey::Table => self.table = value,
            CredentialKey::WebsiteUrl => self.website_url = value,
        }
    }

    pub fn get(&self, key: CredentialKey) -> &str {
        match key {
            CredentialKey::ApiKey => &self.api_key,
            CredentialKey::BaseId => &self.base_id,
            CredentialKey::Table => &self.table,
            CredentialKey::WebsiteUrl => &self.website_url,
        }
    }

    /// Every value must be non-blank before any store call is attempted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<&'static str> = CredentialKey::ALL
            .into_iter()
            .filter(|key| self.get(*key).trim().is_empty())
            .map(CredentialKey::name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { missing })
        }
    }

    /// Public address of a published note.
    pub fn link_for(&self, slug: &str) -> String {
        format!("{}/notes/{}", self.website_url.trim_end_matches('/'), slug)
    }
}

impl std::fmt::Debug for PublisherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_id", &self.base_id)
            .field("table", &self.table)
            .field("website_url", &self.website_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PublisherConfig {
        PublisherConfig {
            api_key: "keyABC".to_string(),
            base_id: "appBase".to_string(),
            table: "Notes".to_string(),
            website_url: "https://notes.example/".to_string(),
        }
    }

    #[test]
    fn complete_config_validates() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn blank_values_are_reported_by_name() {
        let mut config = complete();
        config.set(CredentialKey::ApiKey, "   ");
        config.set(CredentialKey::Table, "");
        let err = config.validate().unwrap_err();
        assert_eq!(err.missing, vec!["api-key", "table"]);
        assert_eq!(err.to_string(), "missing configuration: api-key, table");
    }

    #[test]
    fn links_do_not_double_slashes() {
        assert_eq!(complete().link_for("a-b"), "https://notes.example/notes/a-b");
    }

    #[test]
    fn debug_output_masks_the_key() {
        assert!(!format!("{:?}", complete()).contains("keyABC"));
    }
}
