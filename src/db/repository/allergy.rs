use rusqlite::{params, Connection, OptionalExtension};

use super::blob;
use crate::db::DatabaseError;
use crate::models::*;

const ENTITY: &str = "allergy";

pub fn find_allergy_by_patient(
    conn: &Connection,
    patient_id: PatientId,
) -> Result<Option<AllergyRecord>, DatabaseError> {
    let record = conn
        .query_row(
            "SELECT id, patient_id, encrypted_allergy_name, encrypted_has_allergy
             FROM allergies WHERE patient_id = ?1",
            params![patient_id.get()],
            |row| {
                Ok(AllergyRecord {
                    id: row.get(0)?,
                    patient_id: PatientId(row.get(1)?),
                    fields: EncryptedAllergyInfo {
                        allergy_name: blob(row, 2)?,
                        has_allergy: blob(row, 3)?,
                    },
                })
            },
        )
        .optional()?;
    Ok(record)
}

pub fn insert_allergy(
    conn: &Connection,
    patient_id: PatientId,
    fields: &EncryptedAllergyInfo,
) -> Result<usize, DatabaseError> {
    conn.execute(
        "INSERT INTO allergies (patient_id, encrypted_allergy_name, encrypted_has_allergy)
         VALUES (?1, ?2, ?3)",
        params![
            patient_id.get(),
            fields.allergy_name.as_bytes(),
            fields.has_allergy.as_bytes(),
        ],
    )
    .map_err(|e| DatabaseError::from_write(e, ENTITY, patient_id.get()))
}

pub fn replace_allergy_fields(
    conn: &Connection,
    existing: &AllergyRecord,
    fields: &EncryptedAllergyInfo,
) -> Result<usize, DatabaseError> {
    conn.execute(
        "UPDATE allergies SET encrypted_allergy_name = ?2, encrypted_has_allergy = ?3
         WHERE id = ?1",
        params![
            existing.id,
            fields.allergy_name.as_bytes(),
            fields.has_allergy.as_bytes(),
        ],
    )
    .map_err(|e| DatabaseError::from_write(e, ENTITY, existing.patient_id.get()))
}
