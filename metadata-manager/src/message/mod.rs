// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Structured messages and operation status
//!
//! - [`MessageId`]: closed, versioned catalog of message identifiers
//! - [`Message`]: an identifier bound to arguments and an optional receiver
//! - [`Status`]: the result code every provider call returns
//! - [`MessageBroker`]: logs messages and dispatches them to receivers

pub mod broker;
pub mod catalog;
#[allow(clippy::module_inception)]
pub mod message;
pub mod status;

pub use broker::{MessageBroker, MessageReceiver};
pub use catalog::{MessageId, Severity, MESSAGE_CATALOG_VERSION};
pub use message::Message;
pub use status::Status;
