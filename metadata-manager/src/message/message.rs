// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog message values

use super::catalog::{MessageId, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A message bound to a catalog identifier and its arguments
///
/// The text is produced on demand by substituting the arguments into the
/// identifier's template in order. Missing arguments render as empty
/// strings; surplus arguments are appended separated by a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    args: Vec<String>,
    receiver: Option<String>,
}

impl Message {
    pub fn new(id: MessageId) -> Self {
        Self {
            id,
            args: Vec::new(),
            receiver: None,
        }
    }

    /// Append one template argument
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// Record the component this message is addressed to
    pub fn set_receiver(&mut self, receiver: impl Into<String>) {
        self.receiver = Some(receiver.into());
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.set_receiver(receiver);
        self
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn receiver(&self) -> Option<&str> {
        self.receiver.as_deref()
    }

    pub fn severity(&self) -> Severity {
        self.id.severity()
    }

    /// Render the template with the bound arguments
    pub fn text(&self) -> String {
        let template = self.id.template();
        let mut out = String::with_capacity(template.len() + 16);
        let mut args = self.args.iter();
        let mut pieces = template.split("{}").peekable();

        while let Some(piece) = pieces.next() {
            out.push_str(piece);
            if pieces.peek().is_some() {
                if let Some(arg) = args.next() {
                    out.push_str(arg);
                }
            }
        }
        for extra in args {
            out.push(' ');
            out.push_str(extra);
        }
        out.trim_end().to_string()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}
