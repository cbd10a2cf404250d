use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::identity::PatientId;
use crate::crypto::EncryptedField;

/// Demographic details as the caller supplies and reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralInfo {
    pub full_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub passport_id: String,
    pub emergency_contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedGeneralInfo {
    pub full_name: EncryptedField,
    pub gender: EncryptedField,
    pub date_of_birth: EncryptedField,
    pub phone_number: EncryptedField,
    pub city: EncryptedField,
    pub state: EncryptedField,
    pub postal_code: EncryptedField,
    pub passport_id: EncryptedField,
    pub emergency_contact: EncryptedField,
}

impl EncryptedGeneralInfo {
    pub fn encrypted_fields(&self) -> [(&'static str, &EncryptedField); 9] {
        [
            ("full_name", &self.full_name),
            ("gender", &self.gender),
            ("date_of_birth", &self.date_of_birth),
            ("phone_number", &self.phone_number),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("passport_id", &self.passport_id),
            ("emergency_contact", &self.emergency_contact),
        ]
    }
}

/// Stored form: one row per patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralInfoRecord {
    pub id: i64,
    pub patient_id: PatientId,
    pub fields: EncryptedGeneralInfo,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
