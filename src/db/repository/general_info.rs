use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::blob;
use crate::db::DatabaseError;
use crate::models::*;

const ENTITY: &str = "general_info";

pub fn find_general_info_by_patient(
    conn: &Connection,
    patient_id: PatientId,
) -> Result<Option<GeneralInfoRecord>, DatabaseError> {
    let record = conn
        .query_row(
            "SELECT id, patient_id, encrypted_full_name, encrypted_gender, encrypted_date_of_birth,
             encrypted_phone_number, encrypted_city, encrypted_state, encrypted_postal_code,
             encrypted_passport_id, encrypted_emergency_contact, created_at, updated_at
             FROM general_info WHERE patient_id = ?1",
            params![patient_id.get()],
            |row| {
                Ok(GeneralInfoRecord {
                    id: row.get(0)?,
                    patient_id: PatientId(row.get(1)?),
                    fields: EncryptedGeneralInfo {
                        full_name: blob(row, 2)?,
                        gender: blob(row, 3)?,
                        date_of_birth: blob(row, 4)?,
                        phone_number: blob(row, 5)?,
                        city: blob(row, 6)?,
                        state: blob(row, 7)?,
                        postal_code: blob(row, 8)?,
                        passport_id: blob(row, 9)?,
                        emergency_contact: blob(row, 10)?,
                    },
                    created_at: row.get(11)?,
                    updated_at: row.get(12)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

pub fn insert_general_info(
    conn: &Connection,
    patient_id: PatientId,
    fields: &EncryptedGeneralInfo,
    now: NaiveDateTime,
) -> Result<usize, DatabaseError> {
    conn.execute(
        "INSERT INTO general_info (patient_id, encrypted_full_name, encrypted_gender,
         encrypted_date_of_birth, encrypted_phone_number, encrypted_city, encrypted_state,
         encrypted_postal_code, encrypted_passport_id, encrypted_emergency_contact,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            patient_id.get(),
            fields.full_name.as_bytes(),
            fields.gender.as_bytes(),
            fields.date_of_birth.as_bytes(),
            fields.phone_number.as_bytes(),
            fields.city.as_bytes(),
            fields.state.as_bytes(),
            fields.postal_code.as_bytes(),
            fields.passport_id.as_bytes(),
            fields.emergency_contact.as_bytes(),
            now,
        ],
    )
    .map_err(|e| DatabaseError::from_write(e, ENTITY, patient_id.get()))
}

/// Overwrite every encrypted column and `updated_at`; `created_at` and the
/// patient link are left as they are.
pub fn replace_general_info_fields(
    conn: &Connection,
    existing: &GeneralInfoRecord,
    fields: &EncryptedGeneralInfo,
    now: NaiveDateTime,
) -> Result<usize, DatabaseError> {
    conn.execute(
        "UPDATE general_info SET encrypted_full_name = ?2, encrypted_gender = ?3,
         encrypted_date_of_birth = ?4, encrypted_phone_number = ?5, encrypted_city = ?6,
         encrypted_state = ?7, encrypted_postal_code = ?8, encrypted_passport_id = ?9,
         encrypted_emergency_contact = ?10, updated_at = ?11
         WHERE id = ?1",
        params![
            existing.id,
            fields.full_name.as_bytes(),
            fields.gender.as_bytes(),
            fields.date_of_birth.as_bytes(),
            fields.phone_number.as_bytes(),
            fields.city.as_bytes(),
            fields.state.as_bytes(),
            fields.postal_code.as_bytes(),
            fields.passport_id.as_bytes(),
            fields.emergency_contact.as_bytes(),
            now,
        ],
    )
    .map_err(|e| DatabaseError::from_write(e, ENTITY, existing.patient_id.get()))
}
