// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation history per appointment.

use careready_core::types::{ChatMessage, SenderType};
use careready_core::CarereadyError;
use rusqlite::params;

use crate::database::Database;
use crate::queries::column_enum;

/// Append a message to an appointment's conversation.
pub async fn insert_message(
    db: &Database,
    appointment_id: &str,
    sender_id: &str,
    sender_type: SenderType,
    content: &str,
    is_agent: bool,
) -> Result<i64, CarereadyError> {
    let appointment_id = appointment_id.to_string();
    let sender_id = sender_id.to_string();
    let content = content.to_string();
    db.connection()
        .call(move |conn| {
            let id = conn.query_row(
                "INSERT INTO messages (appointment_id, sender_id, sender_type, content, is_agent)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id",
                params![
                    appointment_id,
                    sender_id,
                    sender_type.to_string(),
                    content,
                    is_agent
                ],
                |row| row.get::<_, i64>(0),
            )?;
            Ok(id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Full conversation in arrival order, insertion id breaking timestamp ties.
pub async fn get_messages(
    db: &Database,
    appointment_id: &str,
) -> Result<Vec<ChatMessage>, CarereadyError> {
    let appointment_id = appointment_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, appointment_id, sender_id, sender_type, content, is_agent, created_at
                 FROM messages
                 WHERE appointment_id = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![appointment_id], |row| {
                let sender_type: String = row.get(3)?;
                Ok(ChatMessage {
                    id: row.get(0)?,
                    appointment_id: row.get(1)?,
                    sender_id: row.get(2)?,
                    sender_type: column_enum(3, sender_type)?,
                    content: row.get(4)?,
                    is_agent: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })?;

            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
