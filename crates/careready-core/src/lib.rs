// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Careready appointment-readiness coordinator.
//!
//! Provides the shared error type, domain types, queue event payloads, and
//! the inference-capability trait used throughout the workspace.

pub mod error;
pub mod events;
pub mod inference;
pub mod types;

pub use error::CarereadyError;
pub use inference::{CheckObservation, InferenceAdapter, ReadinessAnalysis};
pub use types::{
    AgentStatus, ChecklistEntry, CheckOutcome, CheckStatus, CheckType, ReadinessState,
    ReadinessStatus, SenderType,
};
