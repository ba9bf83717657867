// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Fetchers
//!
//! Pure functions that interpret row-sets into canonical entities. They
//! never talk to a backend; the [`MetadataLoader`](crate::MetadataLoader)
//! obtains the row-sets and hands them in.

pub mod fields;
pub mod foreign_keys;
pub mod mapper;
pub mod namespaces;
pub mod objects;

pub use fields::{fetch_fields, fields_from_descriptors};
pub use foreign_keys::{fetch_foreign_keys, fetch_referencing};
pub use mapper::{RowMapper, coerce_bool, coerce_int};
pub use namespaces::{collect_names, fetch_namespaces, load_names, mark_sole_default};
pub use objects::{classify_tag, fetch_objects};
