// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue event payloads.
//!
//! Every payload is a typed struct (or tagged enum) validated at the
//! deserialization boundary. Unknown discriminants fail deserialization
//! deterministically instead of being duck-typed from optional fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{CheckOutcome, CheckType, SenderType};

/// Well-known queue names used across the services.
pub mod queues {
    pub const READINESS_EVALUATION: &str = "readiness-evaluation";
    pub const READINESS_SIGNALS: &str = "readiness-signals";
    pub const INBOUND_MESSAGES: &str = "inbound-messages";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const BRIEF_GENERATION: &str = "brief-generation";
}

/// What caused an evaluation to be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationTrigger {
    Ingestion,
    Update,
    Manual,
}

/// Asks the orchestrator to recompute an appointment's aggregate status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationEvent {
    pub appointment_id: String,
    pub trigger: EvaluationTrigger,
    pub timestamp: String,
}

/// Signals flowing from the interpretation router to the orchestrator.
///
/// Tagged by the `type` field; payloads with an unrecognized tag are
/// rejected at deserialization and dropped by the consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CheckSignal {
    #[serde(rename = "UPDATE_CHECK", rename_all = "camelCase")]
    UpdateCheck {
        appointment_id: String,
        check_type: CheckType,
        status: CheckOutcome,
        source: String,
    },
}

/// A chat message published for interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessageEvent {
    pub appointment_id: String,
    pub text: String,
    pub sender_type: SenderType,
    pub sender_id: String,
}

/// Delivery channel for an outbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationChannel {
    Sms,
    Email,
    Push,
}

/// The decision to notify, handed to the delivery layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationJob {
    #[serde(rename = "type")]
    pub channel: NotificationChannel,
    pub recipient: String,
    pub template_id: String,
    pub data: HashMap<String, String>,
}

/// Output format for a generated appointment brief.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BriefFormat {
    Pdf,
    Text,
}

/// Requests generation of a caregiver brief after a readiness transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefGenerationJob {
    pub appointment_id: String,
    pub caregiver_id: String,
    pub format: BriefFormat,
    pub recipient_phone: String,
}

/// Notification templates published by the orchestrator and workers.
pub mod templates {
    pub const ESCALATION_ALERT: &str = "ESCALATION_ALERT";
    pub const READY_CONFIRMATION: &str = "READY_CONFIRMATION";
    pub const CAREGIVER_BRIEF_DELIVERY: &str = "CAREGIVER_BRIEF_DELIVERY";
}
