//! Record store: the narrow persistence contract the record service uses.
//!
//! A unit of work is opened with [`RecordStore::begin`] (writes) or
//! [`RecordStore::begin_read`] (lookups), queried and written through
//! [`StoreTransaction`], and closed with `commit()`, which reports how many
//! rows were affected. Dropping an uncommitted transaction rolls it back.
//!
//! The SQLite implementation serializes writers twice over: the single
//! connection sits behind a `Mutex`, and every write unit of work starts
//! with `BEGIN IMMEDIATE` so other processes on the same file wait on the
//! write lock. Read units of work use a deferred `BEGIN` and only take a
//! shared lock, so they proceed while another connection holds the
//! reserved write lock. The `UNIQUE (patient_id)` constraints are the last line: a
//! duplicate insert surfaces as [`DatabaseError::Conflict`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use rusqlite::Connection;

use super::repository;
use super::sqlite::{open_database, open_memory_database};
use super::DatabaseError;
use crate::models::*;

pub trait RecordStore: Send + Sync {
    /// Unit of work that will write; holds the store's write lock from the start.
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, DatabaseError>;

    /// Unit of work for lookups only.
    fn begin_read(&self) -> Result<Box<dyn StoreTransaction + '_>, DatabaseError>;
}

pub trait StoreTransaction {
    fn find_identity(&self, id: PatientId) -> Result<Option<Identity>, DatabaseError>;
    fn insert_identity(&mut self, identity: &Identity) -> Result<(), DatabaseError>;

    fn find_general_info(&self, patient: PatientId) -> Result<Option<GeneralInfoRecord>, DatabaseError>;
    fn insert_general_info(
        &mut self,
        patient: PatientId,
        fields: &EncryptedGeneralInfo,
        now: NaiveDateTime,
    ) -> Result<(), DatabaseError>;
    fn replace_general_info(
        &mut self,
        existing: &GeneralInfoRecord,
        fields: &EncryptedGeneralInfo,
        now: NaiveDateTime,
    ) -> Result<(), DatabaseError>;

    fn find_medical_info(&self, patient: PatientId) -> Result<Option<MedicalInfoRecord>, DatabaseError>;
    fn insert_medical_info(
        &mut self,
        patient: PatientId,
        fields: &EncryptedMedicalInfo,
    ) -> Result<(), DatabaseError>;
    fn replace_medical_info(
        &mut self,
        existing: &MedicalInfoRecord,
        fields: &EncryptedMedicalInfo,
    ) -> Result<(), DatabaseError>;

    fn find_allergy(&self, patient: PatientId) -> Result<Option<AllergyRecord>, DatabaseError>;
    fn insert_allergy(
        &mut self,
        patient: PatientId,
        fields: &EncryptedAllergyInfo,
    ) -> Result<(), DatabaseError>;
    fn replace_allergy(
        &mut self,
        existing: &AllergyRecord,
        fields: &EncryptedAllergyInfo,
    ) -> Result<(), DatabaseError>;

    /// Make the unit of work durable; returns rows affected by its writes.
    fn commit(self: Box<Self>) -> Result<usize, DatabaseError>;
}

/// SQLite-backed store owning one connection.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Wrap a connection that has already been migrated
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::new(open_memory_database()?))
    }

    pub fn count_records(&self, kind: RecordKind, patient: PatientId) -> Result<i64, DatabaseError> {
        let conn = self.lock()?;
        repository::count_records_for_patient(&conn, kind, patient)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    fn start(&self, begin_sql: &str) -> Result<Box<dyn StoreTransaction + '_>, DatabaseError> {
        let conn = self.lock()?;
        conn.execute_batch(begin_sql)?;
        Ok(Box::new(SqliteTransaction {
            conn,
            changes: 0,
            finished: false,
        }))
    }
}

impl RecordStore for SqliteRecordStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, DatabaseError> {
        self.start("BEGIN IMMEDIATE")
    }

    fn begin_read(&self) -> Result<Box<dyn StoreTransaction + '_>, DatabaseError> {
        self.start("BEGIN DEFERRED")
    }
}

struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    changes: usize,
    finished: bool,
}

impl StoreTransaction for SqliteTransaction<'_> {
    fn find_identity(&self, id: PatientId) -> Result<Option<Identity>, DatabaseError> {
        repository::get_identity(&self.conn, id)
    }

    fn insert_identity(&mut self, identity: &Identity) -> Result<(), DatabaseError> {
        self.changes += repository::insert_identity(&self.conn, identity)?;
        Ok(())
    }

    fn find_general_info(&self, patient: PatientId) -> Result<Option<GeneralInfoRecord>, DatabaseError> {
        repository::find_general_info_by_patient(&self.conn, patient)
    }

    fn insert_general_info(
        &mut self,
        patient: PatientId,
        fields: &EncryptedGeneralInfo,
        now: NaiveDateTime,
    ) -> Result<(), DatabaseError> {
        self.changes += repository::insert_general_info(&self.conn, patient, fields, now)?;
        Ok(())
    }

    fn replace_general_info(
        &mut self,
        existing: &GeneralInfoRecord,
        fields: &EncryptedGeneralInfo,
        now: NaiveDateTime,
    ) -> Result<(), DatabaseError> {
        self.changes += repository::replace_general_info_fields(&self.conn, existing, fields, now)?;
        Ok(())
    }

    fn find_medical_info(&self, patient: PatientId) -> Result<Option<MedicalInfoRecord>, DatabaseError> {
        repository::find_medical_info_by_patient(&self.conn, patient)
    }

    fn insert_medical_info(
        &mut self,
        patient: PatientId,
        fields: &EncryptedMedicalInfo,
    ) -> Result<(), DatabaseError> {
        self.changes += repository::insert_medical_info(&self.conn, patient, fields)?;
        Ok(())
    }

    fn replace_medical_info(
        &mut self,
        existing: &MedicalInfoRecord,
        fields: &EncryptedMedicalInfo,
    ) -> Result<(), DatabaseError> {
        self.changes += repository::replace_medical_info_fields(&self.conn, existing, fields)?;
        Ok(())
    }

    fn find_allergy(&self, patient: PatientId) -> Result<Option<AllergyRecord>, DatabaseError> {
        repository::find_allergy_by_patient(&self.conn, patient)
    }

    fn insert_allergy(
        &mut self,
        patient: PatientId,
        fields: &EncryptedAllergyInfo,
    ) -> Result<(), DatabaseError> {
        self.changes += repository::insert_allergy(&self.conn, patient, fields)?;
        Ok(())
    }

    fn replace_allergy(
        &mut self,
        existing: &AllergyRecord,
        fields: &EncryptedAllergyInfo,
    ) -> Result<(), DatabaseError> {
        self.changes += repository::replace_allergy_fields(&self.conn, existing, fields)?;
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<usize, DatabaseError> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(self.changes)
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            tracing::warn!(error = %e, "Store rollback failed");
        }
    }
}
