// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user auto-reply gating.
//!
//! A user's agent is ACTIVE by default. When a coordinator takes over a
//! conversation the agent is paused with a cooldown; the pause expires
//! implicitly, so expiry is evaluated at read time rather than by a
//! background sweep. A pause without a deadline only lifts when a
//! coordinator flips it back.

use careready_core::types::{AgentStatus, SenderType};
use careready_core::CarereadyError;
use rusqlite::params;

use crate::database::Database;
use crate::queries::column_enum;

/// Pause the user's agent for `cooldown_minutes` from now.
pub async fn pause_agent(
    db: &Database,
    user_id: &str,
    role: SenderType,
    cooldown_minutes: u64,
) -> Result<(), CarereadyError> {
    let user_id = user_id.to_string();
    let modifier = format!("+{cooldown_minutes} minutes");
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user_agents (user_id, role, status, paused_until)
                 VALUES (?1, ?2, 'PAUSED', strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?3))
                 ON CONFLICT (user_id) DO UPDATE SET
                     role = ?2,
                     status = 'PAUSED',
                     paused_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?3),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![user_id, role.to_string(), modifier],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Explicitly set the agent status, clearing any pending cooldown.
pub async fn set_agent_status(
    db: &Database,
    user_id: &str,
    role: SenderType,
    status: AgentStatus,
) -> Result<(), CarereadyError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user_agents (user_id, role, status, paused_until)
                 VALUES (?1, ?2, ?3, NULL)
                 ON CONFLICT (user_id) DO UPDATE SET
                     status = ?3,
                     paused_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![user_id, role.to_string(), status.to_string()],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The status callers should act on, with pause expiry applied.
///
/// Unknown users are ACTIVE. A paused user whose cooldown has elapsed is
/// ACTIVE again without any row mutation.
pub async fn effective_agent_status(
    db: &Database,
    user_id: &str,
) -> Result<AgentStatus, CarereadyError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let row = conn.query_row(
                "SELECT status, paused_until,
                        paused_until IS NOT NULL
                            AND paused_until <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 FROM user_agents WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let status: String = row.get(0)?;
                    let expired: bool = row.get(2)?;
                    Ok((status, expired))
                },
            );

            match row {
                Ok((status, expired)) => {
                    let status: AgentStatus = column_enum(0, status)?;
                    if status == AgentStatus::Paused && expired {
                        Ok(AgentStatus::Active)
                    } else {
                        Ok(status)
                    }
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(AgentStatus::Active),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::setup_db;

    #[tokio::test]
    async fn unknown_users_default_to_active() {
        let (db, _dir) = setup_db().await;
        let status = effective_agent_status(&db, "nobody").await.unwrap();
        assert_eq!(status, AgentStatus::Active);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn pause_then_read_reports_paused() {
        let (db, _dir) = setup_db().await;
        pause_agent(&db, "cg-1", SenderType::Caregiver, 30).await.unwrap();
        let status = effective_agent_status(&db, "cg-1").await.unwrap();
        assert_eq!(status, AgentStatus::Paused);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn expired_cooldown_reads_active() {
        let (db, _dir) = setup_db().await;
        pause_agent(&db, "cg-1", SenderType::Caregiver, 0).await.unwrap();
        // Push the deadline into the past so expiry is unambiguous.
        db.connection()
            .call(|conn| {
                conn.execute(
                    "UPDATE user_agents
                     SET paused_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '-1 minute')
                     WHERE user_id = 'cg-1'",
                    [],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();

        let status = effective_agent_status(&db, "cg-1").await.unwrap();
        assert_eq!(status, AgentStatus::Active);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn explicit_pause_without_deadline_sticks() {
        let (db, _dir) = setup_db().await;
        set_agent_status(&db, "cg-1", SenderType::Caregiver, AgentStatus::Paused)
            .await
            .unwrap();
        let status = effective_agent_status(&db, "cg-1").await.unwrap();
        assert_eq!(status, AgentStatus::Paused);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reactivation_clears_the_cooldown() {
        let (db, _dir) = setup_db().await;
        pause_agent(&db, "cg-1", SenderType::Caregiver, 30).await.unwrap();
        set_agent_status(&db, "cg-1", SenderType::Caregiver, AgentStatus::Active)
            .await
            .unwrap();
        let status = effective_agent_status(&db, "cg-1").await.unwrap();
        assert_eq!(status, AgentStatus::Active);
        db.close().await.unwrap();
    }
}
