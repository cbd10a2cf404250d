use serde::{Deserialize, Serialize};

use super::identity::PatientId;
use crate::crypto::EncryptedField;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyInfo {
    pub allergy_name: String,
    pub has_allergy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedAllergyInfo {
    pub allergy_name: EncryptedField,
    /// "true" or "false"
    pub has_allergy: EncryptedField,
}

impl EncryptedAllergyInfo {
    pub fn encrypted_fields(&self) -> [(&'static str, &EncryptedField); 2] {
        [
            ("allergy_name", &self.allergy_name),
            ("has_allergy", &self.has_allergy),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllergyRecord {
    pub id: i64,
    pub patient_id: PatientId,
    pub fields: EncryptedAllergyInfo,
}
