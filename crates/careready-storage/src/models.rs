// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types live in `careready-core::types` so they can cross
//! crate boundaries. This module re-exports them for convenience within
//! the storage crate.

pub use careready_core::types::{
    AgentStatus, ChatMessage, ChecklistEntry, CheckStatus, CheckType, IngestionPayload,
    QueueEntry, ReadinessState, ReadinessStatus, SenderType,
};
