// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI provider implementation of the inference adapter.

pub mod client;
pub mod types;

pub use client::OpenAiClient;
