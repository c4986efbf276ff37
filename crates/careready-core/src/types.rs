// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Careready services.
//!
//! All enums serialize as SCREAMING_SNAKE_CASE both on the wire (serde) and
//! in TEXT columns (strum), so a value round-trips unchanged between a queue
//! payload and a database row.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Aggregate readiness of an appointment, always recomputed from its checklist.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessStatus {
    NotStarted,
    InProgress,
    Ready,
    Blocked,
}

/// Status of a single readiness check row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Pending,
    Pass,
    Fail,
}

/// The fixed taxonomy of readiness checks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckType {
    AccessCode,
    SafetyAssessment,
    CaregiverConfirmation,
}

impl CheckType {
    /// The default checklist created for every appointment.
    pub const DEFAULT_SET: [CheckType; 3] = [
        CheckType::AccessCode,
        CheckType::SafetyAssessment,
        CheckType::CaregiverConfirmation,
    ];
}

/// A classified PASS/FAIL decision; PENDING is never a signal outcome.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckOutcome {
    Pass,
    Fail,
}

impl From<CheckOutcome> for CheckStatus {
    fn from(outcome: CheckOutcome) -> Self {
        match outcome {
            CheckOutcome::Pass => CheckStatus::Pass,
            CheckOutcome::Fail => CheckStatus::Fail,
        }
    }
}

/// Who authored a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SenderType {
    Caregiver,
    Coordinator,
    Family,
    System,
    AiAgent,
}

impl SenderType {
    /// True for senders whose messages must never re-enter the router.
    pub fn is_automated(self) -> bool {
        matches!(self, SenderType::System | SenderType::AiAgent)
    }
}

/// Whether a user's digital twin is allowed to answer on their behalf.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Active,
    Paused,
}

/// A single (type, status) entry of an appointment's checklist.
///
/// This is the whole input of the readiness state machine; it deliberately
/// carries no identity or timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    #[serde(rename = "type")]
    pub check_type: CheckType,
    pub status: CheckStatus,
}

/// Snapshot read model: appointment status plus the full checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessState {
    pub appointment_id: String,
    pub status: ReadinessStatus,
    pub risk_score: i64,
    pub checks: Vec<ChecklistEntry>,
}

/// A persisted chat message on an appointment's timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: i64,
    pub appointment_id: String,
    pub sender_type: SenderType,
    pub sender_id: String,
    pub content: String,
    pub is_agent: bool,
    pub created_at: String,
}

/// External facts about an appointment, as delivered by the scheduling system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionPayload {
    pub source_appointment_id: String,
    pub start_time: String,
    pub end_time: String,
    pub service_type: String,
    pub location: String,
    pub client: ClientFacts,
    pub caregiver: CaregiverFacts,
}

/// Client identity and contact facts, keyed by external source id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFacts {
    pub source_id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Caregiver identity and contact facts, keyed by external source id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverFacts {
    pub source_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// One durable row of the broker table backing the queue client.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub locked_until: Option<String>,
}
