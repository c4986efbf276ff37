// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Readiness evaluation for home-care appointments.
//!
//! [`logic`] holds the pure state machine; [`orchestrator`] wires it to
//! storage and the queues.

pub mod logic;
pub mod orchestrator;

pub use logic::{evaluate, Evaluation};
pub use orchestrator::{EvaluationHandler, Orchestrator, SignalHandler};
