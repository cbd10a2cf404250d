//! Role-gated access to patient records.
//!
//! Policy table, default deny:
//!
//! | kind         | write           | read   |
//! |--------------|-----------------|--------|
//! | general info | Patient, Admin  | Admin  |
//! | medical info | Patient         | Doctor |
//! | allergy      | Patient         | Doctor |
//!
//! A Patient caller may only write records of its own identity. Denials
//! return before the store is touched. Read paths hand back decrypted
//! projections; raw encrypted records stay on [`RecordService`].

use crate::db::RecordStore;
use crate::models::*;
use crate::records::{RecordError, RecordService};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is asking: an already-authenticated identity and its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: PatientId,
    pub role: UserType,
}

impl Caller {
    pub fn new(id: PatientId, role: UserType) -> Self {
        Self { id, role }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("{role} may not {access} {kind}")]
    Forbidden {
        role: UserType,
        kind: RecordKind,
        access: Access,
    },
    #[error(transparent)]
    Record(#[from] RecordError),
}

// ═══════════════════════════════════════════════════════════
// Policy
// ═══════════════════════════════════════════════════════════

pub fn is_permitted(role: UserType, kind: RecordKind, access: Access) -> bool {
    match (kind, access) {
        (RecordKind::GeneralInfo, Access::Write) => {
            matches!(role, UserType::Patient | UserType::Admin)
        }
        (RecordKind::GeneralInfo, Access::Read) => role == UserType::Admin,
        (RecordKind::MedicalInfo | RecordKind::Allergy, Access::Write) => role == UserType::Patient,
        (RecordKind::MedicalInfo | RecordKind::Allergy, Access::Read) => role == UserType::Doctor,
    }
}

/// Full check for one request: role table, then own-record rule for patient writes.
pub fn check_access(
    caller: &Caller,
    kind: RecordKind,
    access: Access,
    patient: PatientId,
) -> Result<(), AccessError> {
    let own_record_only = caller.role == UserType::Patient && access == Access::Write;
    let allowed = is_permitted(caller.role, kind, access) && (!own_record_only || caller.id == patient);

    if !allowed {
        tracing::warn!(
            caller_id = %caller.id,
            role = caller.role.as_str(),
            kind = kind.as_str(),
            access = access.as_str(),
            patient_id = %patient,
            "Record access denied"
        );
        return Err(AccessError::Forbidden {
            role: caller.role,
            kind,
            access,
        });
    }

    tracing::debug!(
        caller_id = %caller.id,
        kind = kind.as_str(),
        access = access.as_str(),
        patient_id = %patient,
        "Record access granted"
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Desk: caller-facing operations
// ═══════════════════════════════════════════════════════════

/// Caller-facing wrapper: policy check, then plaintext in / plaintext out.
pub struct RecordDesk<'a, S: RecordStore> {
    service: &'a RecordService<S>,
}

impl<'a, S: RecordStore> RecordDesk<'a, S> {
    pub fn new(service: &'a RecordService<S>) -> Self {
        Self { service }
    }

    pub fn write_general_info(
        &self,
        caller: &Caller,
        patient: PatientId,
        info: &GeneralInfo,
    ) -> Result<bool, AccessError> {
        check_access(caller, RecordKind::GeneralInfo, Access::Write, patient)?;
        Ok(self.service.upsert_general_info(patient, info)?)
    }

    pub fn read_general_info(
        &self,
        caller: &Caller,
        patient: PatientId,
    ) -> Result<Option<GeneralInfo>, AccessError> {
        check_access(caller, RecordKind::GeneralInfo, Access::Read, patient)?;
        let record = self.service.get_general_info(patient)?;
        Ok(record
            .map(|r| r.decrypt(self.service.cipher()))
            .transpose()?)
    }

    pub fn write_medical_info(
        &self,
        caller: &Caller,
        patient: PatientId,
        info: &MedicalInfo,
    ) -> Result<bool, AccessError> {
        check_access(caller, RecordKind::MedicalInfo, Access::Write, patient)?;
        Ok(self.service.upsert_medical_info(patient, info)?)
    }

    pub fn read_medical_info(
        &self,
        caller: &Caller,
        patient: PatientId,
    ) -> Result<Option<MedicalInfo>, AccessError> {
        check_access(caller, RecordKind::MedicalInfo, Access::Read, patient)?;
        let record = self.service.get_medical_info(patient)?;
        Ok(record
            .map(|r| r.decrypt(self.service.cipher()))
            .transpose()?)
    }

    pub fn write_allergy(
        &self,
        caller: &Caller,
        patient: PatientId,
        info: &AllergyInfo,
    ) -> Result<bool, AccessError> {
        check_access(caller, RecordKind::Allergy, Access::Write, patient)?;
        Ok(self.service.upsert_allergy(patient, info)?)
    }

    pub fn read_allergy(
        &self,
        caller: &Caller,
        patient: PatientId,
    ) -> Result<Option<AllergyInfo>, AccessError> {
        check_access(caller, RecordKind::Allergy, Access::Read, patient)?;
        let record = self.service.get_allergy(patient)?;
        Ok(record
            .map(|r| r.decrypt(self.service.cipher()))
            .transpose()?)
    }
}
