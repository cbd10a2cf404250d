use chrono::NaiveDateTime;

use super::{RecordError, RecordService, UpsertAction};
use crate::crypto::FieldCipher;
use crate::db::RecordStore;
use crate::models::*;

/// Text form of `last_checkup` before encryption.
pub const CHECKUP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl EncryptedMedicalInfo {
    pub fn encrypt(info: &MedicalInfo, cipher: &FieldCipher) -> Self {
        Self {
            blood_type: cipher.encrypt(&info.blood_type),
            medication_name: cipher.encrypt(&info.medication_name),
            dosage: cipher.encrypt(&info.dosage),
            last_checkup: cipher.encrypt(&info.last_checkup.format(CHECKUP_FORMAT).to_string()),
        }
    }
}

impl MedicalInfoRecord {
    pub fn decrypt(&self, cipher: &FieldCipher) -> Result<MedicalInfo, RecordError> {
        let f = &self.fields;
        let checkup_text = cipher.decrypt(&f.last_checkup)?;
        let last_checkup = NaiveDateTime::parse_from_str(&checkup_text, CHECKUP_FORMAT)
            .map_err(|e| RecordError::MalformedField {
                field: "last_checkup",
                reason: e.to_string(),
            })?;

        Ok(MedicalInfo {
            blood_type: cipher.decrypt(&f.blood_type)?,
            medication_name: cipher.decrypt(&f.medication_name)?,
            dosage: cipher.decrypt(&f.dosage)?,
            last_checkup,
        })
    }
}

impl<S: RecordStore> RecordService<S> {
    /// One medical row per patient: insert, or replace all four fields
    /// in place (the row's `medication_id` is kept).
    pub fn upsert_medical_info(
        &self,
        patient: PatientId,
        info: &MedicalInfo,
    ) -> Result<bool, RecordError> {
        let fields = EncryptedMedicalInfo::encrypt(info, &self.cipher);

        let mut tx = self.store.begin()?;
        let action = match tx.find_medical_info(patient)? {
            None => {
                tx.insert_medical_info(patient, &fields)?;
                UpsertAction::Inserted
            }
            Some(existing) => {
                tx.replace_medical_info(&existing, &fields)?;
                UpsertAction::Replaced
            }
        };
        Self::finish_upsert(tx, RecordKind::MedicalInfo, patient, action)
    }

    pub fn get_medical_info(
        &self,
        patient: PatientId,
    ) -> Result<Option<MedicalInfoRecord>, RecordError> {
        let tx = self.store.begin_read()?;
        Ok(tx.find_medical_info(patient)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use chrono::NaiveDate;

    fn checkup(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_milli_opt(14, 5, 9, 250)
            .unwrap()
    }

    fn info(medication: &str, day: u32) -> MedicalInfo {
        MedicalInfo {
            blood_type: "AB+".into(),
            medication_name: medication.into(),
            dosage: "500mg twice daily".into(),
            last_checkup: checkup(day),
        }
    }

    #[test]
    fn absent_medical_info_is_none_not_error() {
        let service = service_with_patients(&[1]);
        assert!(service.get_medical_info(PatientId(999)).unwrap().is_none());
        assert!(service.get_medical_info(PatientId(1)).unwrap().is_none());
    }

    #[test]
    fn upsert_then_decrypt_round_trip() {
        let service = service_with_patients(&[7]);
        let input = info("Metformin", 3);
        assert!(service.upsert_medical_info(PatientId(7), &input).unwrap());

        let record = service.get_medical_info(PatientId(7)).unwrap().unwrap();
        assert_eq!(record.decrypt(service.cipher()).unwrap(), input);
    }

    #[test]
    fn replace_keeps_single_row_and_medication_id() {
        let service = service_with_patients(&[7]);
        service.upsert_medical_info(PatientId(7), &info("Metformin", 3)).unwrap();
        let first = service.get_medical_info(PatientId(7)).unwrap().unwrap();

        let replacement = info("Insulin glargine", 20);
        assert!(service.upsert_medical_info(PatientId(7), &replacement).unwrap());

        let second = service.get_medical_info(PatientId(7)).unwrap().unwrap();
        assert_eq!(second.medication_id, first.medication_id);
        assert_eq!(second.decrypt(service.cipher()).unwrap(), replacement);
        assert_eq!(
            service.store().count_records(RecordKind::MedicalInfo, PatientId(7)).unwrap(),
            1
        );
    }

    #[test]
    fn whole_second_checkup_round_trips() {
        let cipher = FieldCipher::from_passphrase(TEST_PASSPHRASE);
        let at = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap();
        let record = MedicalInfoRecord {
            medication_id: "m-1".into(),
            patient_id: PatientId(1),
            fields: EncryptedMedicalInfo::encrypt(
                &MedicalInfo {
                    blood_type: "O-".into(),
                    medication_name: "None".into(),
                    dosage: "".into(),
                    last_checkup: at,
                },
                &cipher,
            ),
        };
        assert_eq!(cipher.decrypt(&record.fields.last_checkup).unwrap(), "2023-01-02T03:04:05");
        assert_eq!(record.decrypt(&cipher).unwrap().last_checkup, at);
    }

    #[test]
    fn unparseable_checkup_is_malformed_field() {
        let cipher = FieldCipher::from_passphrase(TEST_PASSPHRASE);
        let mut fields = EncryptedMedicalInfo::encrypt(&info("Metformin", 3), &cipher);
        fields.last_checkup = cipher.encrypt("last Tuesday");
        let record = MedicalInfoRecord {
            medication_id: "m-1".into(),
            patient_id: PatientId(1),
            fields,
        };
        assert!(matches!(
            record.decrypt(&cipher),
            Err(RecordError::MalformedField { field: "last_checkup", .. })
        ));
    }
}
