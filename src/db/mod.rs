pub mod sqlite;
pub mod repository;
pub mod store;

pub use sqlite::*;
pub use store::*;

use rusqlite::ffi;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Concurrent write conflict: {entity_type} for patient {patient_id} already exists")]
    Conflict { entity_type: String, patient_id: i64 },

    #[error("Store connection lock poisoned")]
    LockPoisoned,

    #[error("Database directory unavailable: {0}")]
    Io(#[from] std::io::Error),
}

impl DatabaseError {
    /// Classify a failed INSERT/UPDATE on a per-patient table.
    ///
    /// A uniqueness hit means another writer got there first; a foreign-key
    /// hit means the patient was never provisioned.
    pub(crate) fn from_write(err: rusqlite::Error, entity_type: &str, patient_id: i64) -> Self {
        match constraint_code(&err) {
            Some(ffi::SQLITE_CONSTRAINT_UNIQUE) | Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
                Self::Conflict {
                    entity_type: entity_type.into(),
                    patient_id,
                }
            }
            Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => Self::ConstraintViolation(format!(
                "{entity_type} references unknown patient {patient_id}"
            )),
            _ => Self::Sqlite(err),
        }
    }
}

fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Some(e.extended_code)
        }
        _ => None,
    }
}
