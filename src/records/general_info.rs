use super::{advance_past, now, RecordError, RecordService, UpsertAction};
use crate::crypto::FieldCipher;
use crate::db::RecordStore;
use crate::models::*;

impl EncryptedGeneralInfo {
    pub fn encrypt(info: &GeneralInfo, cipher: &FieldCipher) -> Self {
        Self {
            full_name: cipher.encrypt(&info.full_name),
            gender: cipher.encrypt(&info.gender),
            date_of_birth: cipher.encrypt(&info.date_of_birth),
            phone_number: cipher.encrypt(&info.phone_number),
            city: cipher.encrypt(&info.city),
            state: cipher.encrypt(&info.state),
            postal_code: cipher.encrypt(&info.postal_code),
            passport_id: cipher.encrypt(&info.passport_id),
            emergency_contact: cipher.encrypt(&info.emergency_contact),
        }
    }
}

impl GeneralInfoRecord {
    /// Decrypt every field; the first failing field aborts.
    pub fn decrypt(&self, cipher: &FieldCipher) -> Result<GeneralInfo, RecordError> {
        let f = &self.fields;
        Ok(GeneralInfo {
            full_name: cipher.decrypt(&f.full_name)?,
            gender: cipher.decrypt(&f.gender)?,
            date_of_birth: cipher.decrypt(&f.date_of_birth)?,
            phone_number: cipher.decrypt(&f.phone_number)?,
            city: cipher.decrypt(&f.city)?,
            state: cipher.decrypt(&f.state)?,
            postal_code: cipher.decrypt(&f.postal_code)?,
            passport_id: cipher.decrypt(&f.passport_id)?,
            emergency_contact: cipher.decrypt(&f.emergency_contact)?,
        })
    }
}

impl<S: RecordStore> RecordService<S> {
    /// Insert the patient's general info, or replace every field of the
    /// existing row while keeping its `created_at`.
    pub fn upsert_general_info(
        &self,
        patient: PatientId,
        info: &GeneralInfo,
    ) -> Result<bool, RecordError> {
        let fields = EncryptedGeneralInfo::encrypt(info, &self.cipher);
        let now = now();

        let mut tx = self.store.begin()?;
        let action = match tx.find_general_info(patient)? {
            None => {
                tx.insert_general_info(patient, &fields, now)?;
                UpsertAction::Inserted
            }
            Some(existing) => {
                let updated_at = advance_past(existing.updated_at, now);
                tx.replace_general_info(&existing, &fields, updated_at)?;
                UpsertAction::Replaced
            }
        };
        Self::finish_upsert(tx, RecordKind::GeneralInfo, patient, action)
    }

    /// Stored record, still encrypted. `None` when the patient has none.
    pub fn get_general_info(
        &self,
        patient: PatientId,
    ) -> Result<Option<GeneralInfoRecord>, RecordError> {
        let tx = self.store.begin_read()?;
        Ok(tx.find_general_info(patient)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::crypto::EncryptedField;
    use std::time::Duration;

    fn info(name: &str, city: &str) -> GeneralInfo {
        GeneralInfo {
            full_name: name.into(),
            gender: "male".into(),
            date_of_birth: "1975-11-30".into(),
            phone_number: "555-0142".into(),
            city: city.into(),
            state: "OR".into(),
            postal_code: "97201".into(),
            passport_id: "P7654321".into(),
            emergency_contact: "Lee Park 555-0143".into(),
        }
    }

    #[test]
    fn upsert_inserts_when_absent() {
        let service = service_with_patients(&[42]);
        assert!(service.get_general_info(PatientId(42)).unwrap().is_none());

        assert!(service.upsert_general_info(PatientId(42), &info("Jo Park", "Portland")).unwrap());

        let record = service.get_general_info(PatientId(42)).unwrap().unwrap();
        assert_eq!(record.patient_id, PatientId(42));
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(
            service.store().count_records(RecordKind::GeneralInfo, PatientId(42)).unwrap(),
            1
        );
    }

    #[test]
    fn upsert_replaces_existing_row() {
        let service = service_with_patients(&[42]);
        service.upsert_general_info(PatientId(42), &info("Jo Park", "Portland")).unwrap();
        let first = service.get_general_info(PatientId(42)).unwrap().unwrap();

        std::thread::sleep(Duration::from_millis(5));
        let replacement = info("Jo Park-Lee", "Salem");
        assert!(service.upsert_general_info(PatientId(42), &replacement).unwrap());

        let second = service.get_general_info(PatientId(42)).unwrap().unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.decrypt(service.cipher()).unwrap(), replacement);
        assert_eq!(
            service.store().count_records(RecordKind::GeneralInfo, PatientId(42)).unwrap(),
            1
        );
    }

    #[test]
    fn replace_advances_past_stored_timestamp_ahead_of_clock() {
        let service = service_with_patients(&[42]);
        let ahead = super::now() + chrono::Duration::days(365);
        {
            let fields = EncryptedGeneralInfo::encrypt(&info("Jo Park", "Portland"), service.cipher());
            let mut tx = service.store().begin().unwrap();
            tx.insert_general_info(PatientId(42), &fields, ahead).unwrap();
            tx.commit().unwrap();
        }

        service.upsert_general_info(PatientId(42), &info("Jo Park", "Salem")).unwrap();

        let record = service.get_general_info(PatientId(42)).unwrap().unwrap();
        assert_eq!(record.created_at, ahead);
        assert!(record.updated_at > ahead);
    }

    #[test]
    fn reapplying_same_input_keeps_same_values() {
        let service = service_with_patients(&[42]);
        let input = info("Jo Park", "Portland");
        service.upsert_general_info(PatientId(42), &input).unwrap();
        let first = service.get_general_info(PatientId(42)).unwrap().unwrap();

        assert!(service.upsert_general_info(PatientId(42), &input).unwrap());
        let second = service.get_general_info(PatientId(42)).unwrap().unwrap();
        assert_eq!(second.fields, first.fields);
    }

    #[test]
    fn stored_fields_are_not_plaintext() {
        let service = service_with_patients(&[42]);
        service.upsert_general_info(PatientId(42), &info("Jo Park", "Portland")).unwrap();
        let record = service.get_general_info(PatientId(42)).unwrap().unwrap();

        assert_ne!(record.fields.full_name.as_bytes(), b"Jo Park");
        assert_eq!(service.cipher().decrypt(&record.fields.full_name).unwrap(), "Jo Park");
    }

    #[test]
    fn per_field_decrypt_survives_one_bad_field() {
        let service = service_with_patients(&[42]);
        service.upsert_general_info(PatientId(42), &info("Jo Park", "Portland")).unwrap();
        let mut record = service.get_general_info(PatientId(42)).unwrap().unwrap();
        record.fields.passport_id = EncryptedField::from_bytes(vec![0; 7]);

        assert!(matches!(record.decrypt(service.cipher()), Err(RecordError::Crypto(_))));

        let results = service.cipher().decrypt_each(&record.fields.encrypted_fields());
        let ok: Vec<_> = results.iter().filter(|(_, r)| r.is_ok()).map(|(n, _)| *n).collect();
        assert_eq!(ok.len(), 8);
        assert!(!ok.contains(&"passport_id"));
    }

    #[test]
    fn absent_for_other_patient() {
        let service = service_with_patients(&[42, 43]);
        service.upsert_general_info(PatientId(42), &info("Jo Park", "Portland")).unwrap();
        assert!(service.get_general_info(PatientId(43)).unwrap().is_none());
    }
}
