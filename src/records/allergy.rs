use super::{RecordError, RecordService, UpsertAction};
use crate::crypto::FieldCipher;
use crate::db::RecordStore;
use crate::models::*;

fn flag_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn parse_flag(text: &str) -> Result<bool, RecordError> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(RecordError::MalformedField {
            field: "has_allergy",
            reason: format!("expected true or false, got {} characters", other.len()),
        }),
    }
}

impl EncryptedAllergyInfo {
    pub fn encrypt(info: &AllergyInfo, cipher: &FieldCipher) -> Self {
        Self {
            allergy_name: cipher.encrypt(&info.allergy_name),
            has_allergy: cipher.encrypt(flag_text(info.has_allergy)),
        }
    }
}

impl AllergyRecord {
    pub fn decrypt(&self, cipher: &FieldCipher) -> Result<AllergyInfo, RecordError> {
        Ok(AllergyInfo {
            allergy_name: cipher.decrypt(&self.fields.allergy_name)?,
            has_allergy: parse_flag(&cipher.decrypt(&self.fields.has_allergy)?)?,
        })
    }
}

impl<S: RecordStore> RecordService<S> {
    pub fn upsert_allergy(&self, patient: PatientId, info: &AllergyInfo) -> Result<bool, RecordError> {
        let fields = EncryptedAllergyInfo::encrypt(info, &self.cipher);

        let mut tx = self.store.begin()?;
        let action = match tx.find_allergy(patient)? {
            None => {
                tx.insert_allergy(patient, &fields)?;
                UpsertAction::Inserted
            }
            Some(existing) => {
                tx.replace_allergy(&existing, &fields)?;
                UpsertAction::Replaced
            }
        };
        Self::finish_upsert(tx, RecordKind::Allergy, patient, action)
    }

    pub fn get_allergy(&self, patient: PatientId) -> Result<Option<AllergyRecord>, RecordError> {
        let tx = self.store.begin_read()?;
        Ok(tx.find_allergy(patient)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn upsert_insert_then_replace() {
        let service = service_with_patients(&[3]);
        let peanuts = AllergyInfo {
            allergy_name: "Peanuts".into(),
            has_allergy: true,
        };
        assert!(service.upsert_allergy(PatientId(3), &peanuts).unwrap());
        let first = service.get_allergy(PatientId(3)).unwrap().unwrap();
        assert_eq!(first.decrypt(service.cipher()).unwrap(), peanuts);

        let none = AllergyInfo {
            allergy_name: "".into(),
            has_allergy: false,
        };
        assert!(service.upsert_allergy(PatientId(3), &none).unwrap());
        let second = service.get_allergy(PatientId(3)).unwrap().unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.decrypt(service.cipher()).unwrap(), none);
    }

    #[test]
    fn flag_is_stored_as_text() {
        let service = service_with_patients(&[3]);
        service
            .upsert_allergy(PatientId(3), &AllergyInfo {
                allergy_name: "Latex".into(),
                has_allergy: true,
            })
            .unwrap();
        let record = service.get_allergy(PatientId(3)).unwrap().unwrap();
        assert_eq!(service.cipher().decrypt(&record.fields.has_allergy).unwrap(), "true");
    }

    #[test]
    fn equal_flags_produce_equal_ciphertext() {
        let service = service_with_patients(&[3, 4]);
        for id in [3, 4] {
            service
                .upsert_allergy(PatientId(id), &AllergyInfo {
                    allergy_name: format!("Allergen {id}"),
                    has_allergy: true,
                })
                .unwrap();
        }
        let a = service.get_allergy(PatientId(3)).unwrap().unwrap();
        let b = service.get_allergy(PatientId(4)).unwrap().unwrap();
        assert_eq!(a.fields.has_allergy, b.fields.has_allergy);
        assert_ne!(a.fields.allergy_name, b.fields.allergy_name);
    }

    #[test]
    fn unknown_flag_text_is_malformed() {
        assert!(matches!(
            parse_flag("yes"),
            Err(RecordError::MalformedField { field: "has_allergy", .. })
        ));
        assert!(parse_flag("false").is_ok());
    }
}
