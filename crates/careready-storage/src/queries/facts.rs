// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotent ingestion of client/caregiver/appointment facts.
//!
//! Every external entity is keyed by its source id; re-ingesting the same
//! payload updates mutable fields instead of duplicating rows. Readiness
//! columns on the appointment are never touched here.

use careready_core::types::IngestionPayload;
use careready_core::CarereadyError;
use rusqlite::params;

use crate::database::Database;

/// Upsert the full fact set of one ingestion payload in a single transaction.
///
/// Client and caregiver are upserted by source id (name and phone refresh on
/// conflict); the appointment is upserted by source id, updating only
/// `start_time` and `caregiver_id`. The appointment's readiness columns keep
/// their defaults on insert and are left alone on conflict.
///
/// Returns the internal appointment id.
pub async fn upsert_appointment(
    db: &Database,
    payload: &IngestionPayload,
) -> Result<String, CarereadyError> {
    let payload = payload.clone();
    // Candidate ids; ignored when the source id already exists.
    let client_id = uuid::Uuid::new_v4().to_string();
    let caregiver_id = uuid::Uuid::new_v4().to_string();
    let appointment_id = uuid::Uuid::new_v4().to_string();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let client_id: String = tx.query_row(
                "INSERT INTO clients (id, source_id, name, phone, address)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(source_id) DO UPDATE SET
                     name = excluded.name,
                     phone = excluded.phone,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 RETURNING id",
                params![
                    client_id,
                    payload.client.source_id,
                    payload.client.name,
                    payload.client.phone,
                    payload.client.address,
                ],
                |row| row.get(0),
            )?;

            let caregiver_id: String = tx.query_row(
                "INSERT INTO caregivers (id, source_id, name, phone, email)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(source_id) DO UPDATE SET
                     name = excluded.name,
                     phone = excluded.phone,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 RETURNING id",
                params![
                    caregiver_id,
                    payload.caregiver.source_id,
                    payload.caregiver.name,
                    payload.caregiver.phone,
                    payload.caregiver.email,
                ],
                |row| row.get(0),
            )?;

            let appointment_id: String = tx.query_row(
                "INSERT INTO appointments
                     (id, source_id, client_id, caregiver_id,
                      start_time, end_time, service_type, location)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(source_id) DO UPDATE SET
                     start_time = excluded.start_time,
                     caregiver_id = excluded.caregiver_id,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 RETURNING id",
                params![
                    appointment_id,
                    payload.source_appointment_id,
                    client_id,
                    caregiver_id,
                    payload.start_time,
                    payload.end_time,
                    payload.service_type,
                    payload.location,
                ],
                |row| row.get(0),
            )?;

            tx.commit()?;
            Ok(appointment_id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Caregiver contact details resolved through an appointment.
#[derive(Debug, Clone)]
pub struct CaregiverContact {
    pub caregiver_id: String,
    pub name: String,
    pub phone: String,
}

/// Resolve the assigned caregiver's contact details for an appointment.
///
/// Returns `None` for unknown appointment ids.
pub async fn caregiver_contact_for_appointment(
    db: &Database,
    appointment_id: &str,
) -> Result<Option<CaregiverContact>, CarereadyError> {
    let appointment_id = appointment_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT c.id, c.name, c.phone
                 FROM appointments a
                 JOIN caregivers c ON c.id = a.caregiver_id
                 WHERE a.id = ?1",
                params![appointment_id],
                |row| {
                    Ok(CaregiverContact {
                        caregiver_id: row.get(0)?,
                        name: row.get(1)?,
                        phone: row.get(2)?,
                    })
                },
            );
            match result {
                Ok(contact) => Ok(Some(contact)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up the internal caregiver id assigned to an appointment.
///
/// Returns `None` for unknown appointment ids.
pub async fn caregiver_for_appointment(
    db: &Database,
    appointment_id: &str,
) -> Result<Option<String>, CarereadyError> {
    let appointment_id = appointment_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT caregiver_id FROM appointments WHERE id = ?1",
                params![appointment_id],
                |row| row.get(0),
            );
            match result {
                Ok(id) => Ok(Some(id)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
