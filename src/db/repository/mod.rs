//! Repository layer: per-table SQL for identities and the three
//! per-patient record kinds. Every dependent lookup is keyed by patient id.

mod allergy;
mod general_info;
mod identity;
mod medical_info;

use rusqlite::{params, Connection, Row};

use super::DatabaseError;
use crate::crypto::EncryptedField;
use crate::models::{PatientId, RecordKind};

// Re-export all public items from sub-modules
pub use allergy::*;
pub use general_info::*;
pub use identity::*;
pub use medical_info::*;

fn blob(row: &Row<'_>, idx: usize) -> rusqlite::Result<EncryptedField> {
    row.get::<_, Vec<u8>>(idx).map(EncryptedField::from_bytes)
}

fn table_for(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::GeneralInfo => "general_info",
        RecordKind::MedicalInfo => "medical_info",
        RecordKind::Allergy => "allergies",
    }
}

/// Number of rows of `kind` linked to `patient_id` (0 or 1 when the schema holds).
pub fn count_records_for_patient(
    conn: &Connection,
    kind: RecordKind,
    patient_id: PatientId,
) -> Result<i64, DatabaseError> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE patient_id = ?1", table_for(kind));
    let count = conn.query_row(&sql, params![patient_id.get()], |row| row.get(0))?;
    Ok(count)
}
