// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Readiness checklist operations.
//!
//! One row per (appointment, check type), enforced by a uniqueness
//! constraint. Rows are created lazily on first evaluation and never
//! deleted; updates are last-writer-wins on the timestamp.

use careready_core::types::{
    ChecklistEntry, CheckStatus, CheckType, ReadinessState, ReadinessStatus,
};
use careready_core::CarereadyError;
use rusqlite::params;

use crate::database::Database;
use crate::queries::column_enum;

/// Insert the default checklist rows with status PENDING, ignoring conflicts.
///
/// Safe to call on every evaluation trigger. Errors with
/// `UnknownAppointment` when the appointment does not exist.
pub async fn ensure_checklist_exists(
    db: &Database,
    appointment_id: &str,
) -> Result<(), CarereadyError> {
    let id = appointment_id.to_string();
    let exists = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let found: Option<i64> = match tx.query_row(
                "SELECT 1 FROM appointments WHERE id = ?1",
                params![id],
                |row| row.get(0),
            ) {
                Ok(v) => Some(v),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(e.into()),
            };
            if found.is_none() {
                tx.commit()?;
                return Ok(false);
            }
            for check in CheckType::DEFAULT_SET {
                tx.execute(
                    "INSERT INTO readiness_checks (appointment_id, check_type, status)
                     VALUES (?1, ?2, 'PENDING')
                     ON CONFLICT (appointment_id, check_type) DO NOTHING",
                    params![id, check.to_string()],
                )?;
            }
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if !exists {
        return Err(CarereadyError::UnknownAppointment(
            appointment_id.to_string(),
        ));
    }
    Ok(())
}

/// Read the aggregate status plus the full checklist snapshot.
///
/// Errors with `UnknownAppointment` when the appointment does not exist.
pub async fn get_readiness_state(
    db: &Database,
    appointment_id: &str,
) -> Result<ReadinessState, CarereadyError> {
    let id = appointment_id.to_string();
    let state = db
        .connection()
        .call(move |conn| {
            let header = conn.query_row(
                "SELECT readiness_status, risk_score FROM appointments WHERE id = ?1",
                params![id],
                |row| {
                    let status: String = row.get(0)?;
                    let risk: i64 = row.get(1)?;
                    Ok((status, risk))
                },
            );

            let (status, risk_score) = match header {
                Ok(pair) => pair,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let mut stmt = conn.prepare(
                "SELECT check_type, status FROM readiness_checks
                 WHERE appointment_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![id], |row| {
                let check_type: String = row.get(0)?;
                let check_status: String = row.get(1)?;
                Ok(ChecklistEntry {
                    check_type: column_enum(0, check_type)?,
                    status: column_enum(1, check_status)?,
                })
            })?;

            let mut checks = Vec::new();
            for row in rows {
                checks.push(row?);
            }

            let status: ReadinessStatus = column_enum(0, status)?;
            Ok(Some(ReadinessState {
                appointment_id: id.clone(),
                status,
                risk_score,
                checks,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    state.ok_or_else(|| CarereadyError::UnknownAppointment(appointment_id.to_string()))
}

/// Update a single named check; last-writer-wins on the timestamp.
///
/// Errors with `UnknownAppointment` when no matching row exists.
pub async fn update_check_status(
    db: &Database,
    appointment_id: &str,
    check_type: CheckType,
    status: CheckStatus,
) -> Result<(), CarereadyError> {
    let id = appointment_id.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE readiness_checks
                 SET status = ?3, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE appointment_id = ?1 AND check_type = ?2",
                params![id, check_type.to_string(), status.to_string()],
            )?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if updated == 0 {
        return Err(CarereadyError::UnknownAppointment(
            appointment_id.to_string(),
        ));
    }
    Ok(())
}

/// Persist the computed aggregate back onto the appointment row.
pub async fn update_readiness_status(
    db: &Database,
    appointment_id: &str,
    status: ReadinessStatus,
    risk_score: i64,
) -> Result<(), CarereadyError> {
    let appointment_id = appointment_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE appointments
                 SET readiness_status = ?2, risk_score = ?3,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![appointment_id, status.to_string(), risk_score],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
