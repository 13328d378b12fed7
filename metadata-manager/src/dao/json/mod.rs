// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! JSON file backend DAOs

pub mod dao;
pub mod document;

pub use dao::JsonDao;
pub use document::{MetadataDocument, DOCUMENT_FORMAT_VERSION};
