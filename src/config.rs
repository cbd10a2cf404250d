use std::path::PathBuf;

use thiserror::Error;
use zeroize::Zeroizing;

/// Application-level constants
pub const APP_NAME: &str = "MedVault";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the field-encryption passphrase.
pub const PASSPHRASE_ENV: &str = "MEDVAULT_PASSPHRASE";
/// Environment variable overriding the SQLite database location.
pub const DATABASE_ENV: &str = "MEDVAULT_DATABASE";

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medvault=info,warn"
}

/// Get the application data directory
/// ~/MedVault/ when a home directory is known, else the working directory
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn default_database_path() -> PathBuf {
    app_data_dir().join("vault.db")
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{PASSPHRASE_ENV} is not set")]
    MissingPassphrase,

    #[error("Passphrase must not be empty")]
    EmptyPassphrase,
}

/// Startup settings: the one passphrase and where the database lives.
///
/// Loaded once and handed to [`crate::open_vault`]; the passphrase is
/// zeroed when the config is dropped.
pub struct VaultConfig {
    pub passphrase: Zeroizing<String>,
    pub database_path: PathBuf,
}

impl VaultConfig {
    pub fn new(passphrase: impl Into<String>, database_path: PathBuf) -> Result<Self, ConfigError> {
        let passphrase = Zeroizing::new(passphrase.into());
        if passphrase.is_empty() {
            return Err(ConfigError::EmptyPassphrase);
        }
        Ok(Self {
            passphrase,
            database_path,
        })
    }

    /// Read [`PASSPHRASE_ENV`] and [`DATABASE_ENV`] from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let passphrase = lookup(PASSPHRASE_ENV).ok_or(ConfigError::MissingPassphrase)?;
        let database_path = lookup(DATABASE_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);
        Self::new(passphrase, database_path)
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("passphrase", &"<redacted>")
            .field("database_path", &self.database_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("MedVault"));
    }

    #[test]
    fn default_database_under_app_data() {
        let db = default_database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("vault.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn passphrase_is_required() {
        let result = VaultConfig::from_lookup(lookup(&[(DATABASE_ENV, "/tmp/x.db")]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingPassphrase);
    }

    #[test]
    fn empty_passphrase_rejected() {
        let result = VaultConfig::from_lookup(lookup(&[(PASSPHRASE_ENV, "")]));
        assert_eq!(result.unwrap_err(), ConfigError::EmptyPassphrase);
    }

    #[test]
    fn database_path_defaults_when_unset_or_blank() {
        let config = VaultConfig::from_lookup(lookup(&[(PASSPHRASE_ENV, "pw"), (DATABASE_ENV, "  ")])).unwrap();
        assert_eq!(config.database_path, default_database_path());
    }

    #[test]
    fn database_path_from_env() {
        let config = VaultConfig::from_lookup(lookup(&[
            (PASSPHRASE_ENV, "pw"),
            (DATABASE_ENV, "/var/lib/medvault/records.db"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/medvault/records.db"));
        assert_eq!(config.passphrase.as_str(), "pw");
    }

    #[test]
    fn debug_redacts_passphrase() {
        let config = VaultConfig::new("hunter2", PathBuf::from("vault.db")).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
