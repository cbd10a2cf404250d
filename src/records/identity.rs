use super::{now, RecordError, RecordService};
use crate::crypto::{CryptoError, FieldCipher};
use crate::db::RecordStore;
use crate::models::*;

impl Identity {
    pub fn decrypt_email(&self, cipher: &FieldCipher) -> Result<String, CryptoError> {
        cipher.decrypt(&self.encrypted_email)
    }
}

impl<S: RecordStore> RecordService<S> {
    /// Create the identity row that every record kind hangs off.
    ///
    /// Identities are written once; an id that already exists is a
    /// [`RecordError::Conflict`], never an overwrite.
    pub fn provision_identity(
        &self,
        id: PatientId,
        email: &str,
        user_type: UserType,
    ) -> Result<Identity, RecordError> {
        let now = now();
        let identity = Identity {
            id,
            encrypted_email: self.cipher.encrypt(email),
            user_type,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin()?;
        tx.insert_identity(&identity)?;
        tx.commit()?;

        tracing::info!(patient_id = %id, user_type = user_type.as_str(), "Identity provisioned");
        Ok(identity)
    }

    pub fn get_identity(&self, id: PatientId) -> Result<Option<Identity>, RecordError> {
        let tx = self.store.begin_read()?;
        Ok(tx.find_identity(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn provision_and_fetch() {
        let service = service();
        let created = service
            .provision_identity(PatientId(11), "doc@example.org", UserType::Doctor)
            .unwrap();

        let fetched = service.get_identity(PatientId(11)).unwrap().unwrap();
        assert_eq!(fetched.user_type, UserType::Doctor);
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.decrypt_email(service.cipher()).unwrap(), "doc@example.org");
    }

    #[test]
    fn provisioning_twice_is_conflict() {
        let service = service_with_patients(&[11]);
        let result = service.provision_identity(PatientId(11), "other@example.org", UserType::Admin);
        assert!(matches!(
            result,
            Err(RecordError::Conflict { patient_id: PatientId(11), .. })
        ));

        let kept = service.get_identity(PatientId(11)).unwrap().unwrap();
        assert_eq!(kept.user_type, UserType::Patient);
    }

    #[test]
    fn unknown_identity_is_none() {
        let service = service();
        assert!(service.get_identity(PatientId(5)).unwrap().is_none());
    }
}
