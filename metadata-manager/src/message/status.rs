// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Operation status returned by every provider call

use super::message::Message;
use crate::error::{CatalogError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result code of one catalog operation
///
/// `sub_code` carries the status reported by a message receiver, when the
/// status originates from a receiver instead of the catalog itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    code: ErrorCode,
    message: Option<Message>,
    sub_code: Option<i32>,
}

impl Status {
    pub fn ok() -> Self {
        Self {
            code: ErrorCode::Ok,
            message: None,
            sub_code: None,
        }
    }

    pub fn new(code: ErrorCode, message: Message) -> Self {
        Self {
            code,
            message: Some(message),
            sub_code: None,
        }
    }

    pub fn from_error(err: &CatalogError) -> Self {
        Self::new(err.code(), err.message().clone())
    }

    pub fn with_sub_code(mut self, sub_code: i32) -> Self {
        self.sub_code = Some(sub_code);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.code == ErrorCode::Ok
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn sub_code(&self) -> Option<i32> {
        self.sub_code
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ok()
    }
}

impl From<&CatalogError> for Status {
    fn from(err: &CatalogError) -> Self {
        Status::from_error(err)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{:?}: {}", self.code, message),
            None => write!(f, "{:?}", self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageId;

    #[test]
    fn test_ok_status() {
        let status = Status::ok();
        assert!(status.is_ok());
        assert_eq!(status.code() as i32, 0);
        assert!(status.message().is_none());
    }

    #[test]
    fn test_status_from_error_keeps_message() {
        let err = CatalogError::NotFound(
            Message::new(MessageId::NOT_FOUND)
                .arg("tables")
                .arg("id")
                .arg(3),
        );
        let status = Status::from_error(&err);
        assert!(!status.is_ok());
        assert_eq!(status.code(), ErrorCode::NotFound);
        assert_eq!(
            status.message().map(|m| m.id()),
            Some(MessageId::NOT_FOUND)
        );
        assert_eq!(status.sub_code(), None);
    }

    #[test]
    fn test_sub_code() {
        let status = Status::ok().with_sub_code(12);
        assert_eq!(status.sub_code(), Some(12));
    }
}
