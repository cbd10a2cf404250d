use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::blob;
use crate::db::DatabaseError;
use crate::models::*;

const ENTITY: &str = "medical_info";

pub fn find_medical_info_by_patient(
    conn: &Connection,
    patient_id: PatientId,
) -> Result<Option<MedicalInfoRecord>, DatabaseError> {
    let record = conn
        .query_row(
            "SELECT medication_id, patient_id, encrypted_blood_type, encrypted_medication_name,
             encrypted_dosage, encrypted_last_checkup
             FROM medical_info WHERE patient_id = ?1",
            params![patient_id.get()],
            |row| {
                Ok(MedicalInfoRecord {
                    medication_id: row.get(0)?,
                    patient_id: PatientId(row.get(1)?),
                    fields: EncryptedMedicalInfo {
                        blood_type: blob(row, 2)?,
                        medication_name: blob(row, 3)?,
                        dosage: blob(row, 4)?,
                        last_checkup: blob(row, 5)?,
                    },
                })
            },
        )
        .optional()?;
    Ok(record)
}

/// Insert with a freshly generated `medication_id`.
pub fn insert_medical_info(
    conn: &Connection,
    patient_id: PatientId,
    fields: &EncryptedMedicalInfo,
) -> Result<usize, DatabaseError> {
    conn.execute(
        "INSERT INTO medical_info (medication_id, patient_id, encrypted_blood_type,
         encrypted_medication_name, encrypted_dosage, encrypted_last_checkup)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            Uuid::new_v4().to_string(),
            patient_id.get(),
            fields.blood_type.as_bytes(),
            fields.medication_name.as_bytes(),
            fields.dosage.as_bytes(),
            fields.last_checkup.as_bytes(),
        ],
    )
    .map_err(|e| DatabaseError::from_write(e, ENTITY, patient_id.get()))
}

pub fn replace_medical_info_fields(
    conn: &Connection,
    existing: &MedicalInfoRecord,
    fields: &EncryptedMedicalInfo,
) -> Result<usize, DatabaseError> {
    conn.execute(
        "UPDATE medical_info SET encrypted_blood_type = ?2, encrypted_medication_name = ?3,
         encrypted_dosage = ?4, encrypted_last_checkup = ?5
         WHERE medication_id = ?1",
        params![
            existing.medication_id,
            fields.blood_type.as_bytes(),
            fields.medication_name.as_bytes(),
            fields.dosage.as_bytes(),
            fields.last_checkup.as_bytes(),
        ],
    )
    .map_err(|e| DatabaseError::from_write(e, ENTITY, existing.patient_id.get()))
}
