// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the Careready storage entities.

pub mod agents;
pub mod checks;
pub mod facts;
pub mod messages;
pub mod queue;

/// Parse a TEXT column into a strum-derived enum, reporting failures as
/// rusqlite conversion errors so they surface through the normal error path.
pub(crate) fn column_enum<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
