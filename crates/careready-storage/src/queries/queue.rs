// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable message queue backed by the `queue` table.
//!
//! Delivery is at-least-once. A dequeue claims one row by marking it
//! `processing` with a visibility deadline; a consumer that never acks
//! loses the claim when the deadline passes and the row becomes
//! dequeueable again. Rows that exhaust `max_attempts` land in `failed`
//! and stay there for operator inspection.

use std::time::Duration;

use careready_core::types::QueueEntry;
use careready_core::CarereadyError;
use rusqlite::params;
use rusqlite::OptionalExtension;

use crate::database::Database;

/// Append a payload to the named queue.
pub async fn enqueue(
    db: &Database,
    queue_name: &str,
    payload: &str,
    max_attempts: i32,
) -> Result<i64, CarereadyError> {
    let queue_name = queue_name.to_string();
    let payload = payload.to_string();
    db.connection()
        .call(move |conn| {
            let id = conn.query_row(
                "INSERT INTO queue (queue_name, payload, max_attempts)
                 VALUES (?1, ?2, ?3)
                 RETURNING id",
                params![queue_name, payload, max_attempts],
                |row| row.get::<_, i64>(0),
            )?;
            Ok(id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim the oldest deliverable entry, if any.
///
/// Deliverable means `pending`, or `processing` with an expired
/// visibility deadline. The claim bumps the attempt counter and sets a
/// fresh deadline of `visibility_timeout` from now.
pub async fn dequeue(
    db: &Database,
    queue_name: &str,
    visibility_timeout: Duration,
) -> Result<Option<QueueEntry>, CarereadyError> {
    let queue_name = queue_name.to_string();
    let modifier = format!("+{} seconds", visibility_timeout.as_secs());
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let entry = tx
                .query_row(
                    "UPDATE queue
                     SET status = 'processing',
                         attempts = attempts + 1,
                         locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?2),
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = (
                         SELECT id FROM queue
                         WHERE queue_name = ?1
                           AND (status = 'pending'
                                OR (status = 'processing'
                                    AND locked_until <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now')))
                         ORDER BY id ASC
                         LIMIT 1
                     )
                     RETURNING id, queue_name, payload, status, attempts, max_attempts,
                               created_at, updated_at, locked_until",
                    params![queue_name, modifier],
                    |row| {
                        Ok(QueueEntry {
                            id: row.get(0)?,
                            queue_name: row.get(1)?,
                            payload: row.get(2)?,
                            status: row.get(3)?,
                            attempts: row.get(4)?,
                            max_attempts: row.get(5)?,
                            created_at: row.get(6)?,
                            updated_at: row.get(7)?,
                            locked_until: row.get(8)?,
                        })
                    },
                )
                .optional()?;
            tx.commit()?;
            Ok(entry)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a claimed entry as successfully handled.
pub async fn ack(db: &Database, entry_id: i64) -> Result<(), CarereadyError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue
                 SET status = 'completed', locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![entry_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a handling failure.
///
/// Entries with attempts remaining go back to `pending` for redelivery;
/// exhausted entries become terminal `failed`.
pub async fn fail(db: &Database, entry_id: i64) -> Result<(), CarereadyError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE queue
                 SET status = CASE
                         WHEN attempts >= max_attempts THEN 'failed'
                         ELSE 'pending'
                     END,
                     locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![entry_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
