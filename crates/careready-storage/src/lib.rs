// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the readiness coordinator.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed
//! operations for appointment facts, readiness checklists, conversation
//! history, agent pause state, and a crash-safe message queue.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

#[cfg(test)]
pub(crate) mod testutil;

pub use database::Database;
pub use models::*;
