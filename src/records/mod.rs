//! Record service: plaintext in, encrypted rows out.
//!
//! Every write encrypts field-by-field with the service's [`FieldCipher`]
//! and then upserts by patient id inside one store unit of work: find the
//! existing row for that patient, insert if absent, otherwise replace all
//! fields. Reads return the stored (still encrypted) record; callers
//! decrypt with `decrypt` or per field via [`FieldCipher::decrypt_each`].
//!
//! No operation here retries. A uniqueness conflict from the store comes
//! back as [`RecordError::Conflict`].

mod allergy;
mod general_info;
mod identity;
mod medical_info;

pub use medical_info::CHECKUP_FORMAT;

use chrono::{Duration, NaiveDateTime, Utc};
use thiserror::Error;

use crate::crypto::{CryptoError, FieldCipher};
use crate::db::{DatabaseError, RecordStore, StoreTransaction};
use crate::models::{PatientId, RecordKind};

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Field decryption failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Store error: {0}")]
    Store(DatabaseError),

    #[error("Concurrent write conflict on {entity_type} for patient {patient_id}")]
    Conflict { entity_type: String, patient_id: PatientId },

    #[error("Decrypted {field} is not well formed: {reason}")]
    MalformedField { field: &'static str, reason: String },
}

impl From<DatabaseError> for RecordError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict { entity_type, patient_id } => Self::Conflict {
                entity_type,
                patient_id: PatientId(patient_id),
            },
            other => Self::Store(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertAction {
    Inserted,
    Replaced,
}

impl UpsertAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Replaced => "replaced",
        }
    }
}

/// Identity-keyed upsert/get over the three record kinds.
pub struct RecordService<S: RecordStore> {
    store: S,
    cipher: FieldCipher,
}

impl<S: RecordStore> RecordService<S> {
    pub fn new(store: S, cipher: FieldCipher) -> Self {
        Self { store, cipher }
    }

    pub fn cipher(&self) -> &FieldCipher {
        &self.cipher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn finish_upsert(
        tx: Box<dyn StoreTransaction + '_>,
        kind: RecordKind,
        patient: PatientId,
        action: UpsertAction,
    ) -> Result<bool, RecordError> {
        let rows = tx.commit()?;
        tracing::info!(
            patient_id = %patient,
            kind = kind.as_str(),
            action = action.as_str(),
            rows,
            "Record upserted"
        );
        Ok(rows > 0)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// `updated_at` for a replace: strictly after the stored value even if the
/// wall clock stepped backwards.
fn advance_past(previous: NaiveDateTime, now: NaiveDateTime) -> NaiveDateTime {
    now.max(previous + Duration::microseconds(1))
}
