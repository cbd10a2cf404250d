use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::identity::PatientId;
use crate::crypto::EncryptedField;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalInfo {
    pub blood_type: String,
    pub medication_name: String,
    pub dosage: String,
    pub last_checkup: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMedicalInfo {
    pub blood_type: EncryptedField,
    pub medication_name: EncryptedField,
    pub dosage: EncryptedField,
    /// ISO-8601 text, encrypted like every other field
    pub last_checkup: EncryptedField,
}

impl EncryptedMedicalInfo {
    pub fn encrypted_fields(&self) -> [(&'static str, &EncryptedField); 4] {
        [
            ("blood_type", &self.blood_type),
            ("medication_name", &self.medication_name),
            ("dosage", &self.dosage),
            ("last_checkup", &self.last_checkup),
        ]
    }
}

/// Stored form. `medication_id` is row-local; lookups always go by patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalInfoRecord {
    pub medication_id: String,
    pub patient_id: PatientId,
    pub fields: EncryptedMedicalInfo,
}
