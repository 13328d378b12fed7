// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog providers
//!
//! One provider per metadata kind. Each operation runs in its own
//! transaction and answers `(Option<T>, Status)`.

pub mod base;
pub mod constraints;
pub mod data_types;
pub mod indexes;
pub mod privileges;
pub mod roles;
pub mod statistics;
pub mod tables;

pub use base::ProviderCore;
pub use constraints::ConstraintsProvider;
pub use data_types::DataTypesProvider;
pub use indexes::IndexesProvider;
pub use privileges::PrivilegesProvider;
pub use roles::RolesProvider;
pub use statistics::StatisticsProvider;
pub use tables::TablesProvider;
