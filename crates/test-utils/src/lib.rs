// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for unified-sql-metadata
//!
//! This crate provides common testing components including:
//! - A scriptable mock connectivity adapter that records every call
//! - Row-set and snapshot fixtures shaped like real driver collections

pub mod fixtures;
pub mod mock_adapter;

// Re-exports for convenience
pub use fixtures::RowSetFixtures;
pub use mock_adapter::{MockAdapter, MockAdapterBuilder, MockCall, MockHandle};
