// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The narrow contract with the external inference capability.
//!
//! The capability is a black box that may return malformed output; the
//! structured form is validated by the implementation before it crosses
//! this boundary, so callers only ever see well-typed analyses or an
//! [`CarereadyError::Inference`](crate::CarereadyError::Inference) error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CarereadyError;
use crate::types::{CheckOutcome, CheckType};

/// One detected readiness category with a PASS/FAIL decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckObservation {
    pub category: CheckType,
    pub status: CheckOutcome,
    pub confidence: f64,
    pub reasoning: String,
}

/// Structured classification of a caregiver's free-text message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessAnalysis {
    #[serde(default)]
    pub updates: Vec<CheckObservation>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Adapter for the external inference capability.
#[async_trait]
pub trait InferenceAdapter: Send + Sync {
    /// Classify free text against the fixed readiness taxonomy.
    async fn classify_readiness(&self, text: &str) -> Result<ReadinessAnalysis, CarereadyError>;

    /// Generate a conversational digital-twin reply to a family message.
    async fn generate_reply(&self, text: &str) -> Result<String, CarereadyError>;
}
