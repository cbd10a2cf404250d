pub mod config;
pub mod crypto;
pub mod models;
pub mod db;
pub mod records;
pub mod authorization;

use tracing_subscriber::EnvFilter;

use crate::config::VaultConfig;
use crate::crypto::{FieldCipher, FieldKey};
use crate::db::{DatabaseError, SqliteRecordStore};
use crate::records::RecordService;

/// Install the global fmt subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Open the configured database and build the record service around it.
///
/// The field key is derived here, once; nothing else holds the passphrase.
pub fn open_vault(config: &VaultConfig) -> Result<RecordService<SqliteRecordStore>, DatabaseError> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let store = SqliteRecordStore::open(&config.database_path)?;
    let cipher = FieldCipher::new(FieldKey::derive(&config.passphrase));
    tracing::info!(version = config::APP_VERSION, "{} vault opened", config::APP_NAME);
    Ok(RecordService::new(store, cipher))
}
