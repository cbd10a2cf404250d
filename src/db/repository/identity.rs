use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::blob;
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_identity(conn: &Connection, identity: &Identity) -> Result<usize, DatabaseError> {
    conn.execute(
        "INSERT INTO identities (uuid, encrypted_email, user_type, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            identity.id.get(),
            identity.encrypted_email.as_bytes(),
            identity.user_type.as_str(),
            identity.created_at,
            identity.updated_at,
        ],
    )
    .map_err(|e| DatabaseError::from_write(e, "identity", identity.id.get()))
}

pub fn get_identity(conn: &Connection, id: PatientId) -> Result<Option<Identity>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT uuid, encrypted_email, user_type, created_at, updated_at
             FROM identities WHERE uuid = ?1",
            params![id.get()],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    blob(row, 1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, NaiveDateTime>(3)?,
                    row.get::<_, NaiveDateTime>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((uuid, encrypted_email, user_type, created_at, updated_at)) = row else {
        return Ok(None);
    };

    Ok(Some(Identity {
        id: PatientId(uuid),
        encrypted_email,
        user_type: UserType::from_str(&user_type)?,
        created_at,
        updated_at,
    }))
}
