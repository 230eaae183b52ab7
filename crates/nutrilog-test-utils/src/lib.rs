// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Nutrilog integration tests.
//!
//! # Components
//!
//! - [`FakeSource`] - In-memory data source with failure injection and a call log
//! - [`TestHarness`] - Repositories over a throwaway SQLite database
//! - [`fixtures`] - Ready-made entities

pub mod fake_source;
pub mod fixtures;
pub mod harness;

pub use fake_source::FakeSource;
pub use harness::TestHarness;
