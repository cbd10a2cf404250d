use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::UserType;
use crate::crypto::EncryptedField;

/// Stable integer identifier naming one person across every record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub i64);

impl PatientId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for PatientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account row every dependent record hangs off. Written once at provisioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: PatientId,
    pub encrypted_email: EncryptedField,
    pub user_type: UserType,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
