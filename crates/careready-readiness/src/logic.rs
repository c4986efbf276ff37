// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure readiness evaluation.
//!
//! Total over every checklist shape and free of I/O so it can be tested
//! exhaustively. Rule order is fixed: emptiness, then failure dominance,
//! then full success, then the in-progress default.

use careready_core::types::{ChecklistEntry, CheckStatus, ReadinessStatus};

/// Outcome of evaluating a checklist snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub next_status: ReadinessStatus,
    pub risk_score: i64,
    pub should_notify: bool,
}

/// Collapse a checklist into an aggregate readiness decision.
///
/// A single FAIL dominates any number of PASSes. Notification is only
/// warranted at the two actionable endpoints, BLOCKED and READY.
pub fn evaluate(checks: &[ChecklistEntry]) -> Evaluation {
    if checks.is_empty() {
        return Evaluation {
            next_status: ReadinessStatus::NotStarted,
            risk_score: 0,
            should_notify: false,
        };
    }

    if checks.iter().any(|c| c.status == CheckStatus::Fail) {
        return Evaluation {
            next_status: ReadinessStatus::Blocked,
            risk_score: 100,
            should_notify: true,
        };
    }

    if checks.iter().all(|c| c.status == CheckStatus::Pass) {
        return Evaluation {
            next_status: ReadinessStatus::Ready,
            risk_score: 0,
            should_notify: true,
        };
    }

    Evaluation {
        next_status: ReadinessStatus::InProgress,
        risk_score: 50,
        should_notify: false,
    }
}
