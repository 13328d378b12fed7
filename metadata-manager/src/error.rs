// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the metadata manager
//!
//! Every backend failure is normalized into one [`CatalogError`] variant
//! before it leaves the DAO layer. Each variant carries a catalog
//! [`Message`], so the text a caller sees always comes from the message
//! catalog.

use crate::message::{Message, MessageId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable numeric result codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    NotFound = 1,
    AmbiguousResult = 2,
    ReferenceNotFound = 3,
    AlreadyExists = 4,
    InvalidParameter = 5,
    ValueConversionError = 6,
    ConnectionError = 10,
    TransactionStartFailure = 11,
    InvalidState = 12,
    BackendTimeout = 13,
    NotSupported = 14,
    UnknownBackendError = 99,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Connection error: {0}")]
    ConnectionError(Message),

    #[error("Transaction start failure: {0}")]
    TransactionStartFailure(Message),

    #[error("Invalid state: {0}")]
    InvalidState(Message),

    #[error("Not found: {0}")]
    NotFound(Message),

    #[error("Ambiguous result: {0}")]
    AmbiguousResult(Message),

    #[error("Reference not found: {0}")]
    ReferenceNotFound(Message),

    #[error("Already exists: {0}")]
    AlreadyExists(Message),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(Message),

    #[error("Value conversion error: {0}")]
    ValueConversionError(Message),

    #[error("Backend timeout: {0}")]
    BackendTimeout(Message),

    #[error("Not supported: {0}")]
    NotSupported(Message),

    #[error("Backend error: {0}")]
    UnknownBackendError(Message),
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::ConnectionError(_) => ErrorCode::ConnectionError,
            CatalogError::TransactionStartFailure(_) => ErrorCode::TransactionStartFailure,
            CatalogError::InvalidState(_) => ErrorCode::InvalidState,
            CatalogError::NotFound(_) => ErrorCode::NotFound,
            CatalogError::AmbiguousResult(_) => ErrorCode::AmbiguousResult,
            CatalogError::ReferenceNotFound(_) => ErrorCode::ReferenceNotFound,
            CatalogError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            CatalogError::InvalidParameter(_) => ErrorCode::InvalidParameter,
            CatalogError::ValueConversionError(_) => ErrorCode::ValueConversionError,
            CatalogError::BackendTimeout(_) => ErrorCode::BackendTimeout,
            CatalogError::NotSupported(_) => ErrorCode::NotSupported,
            CatalogError::UnknownBackendError(_) => ErrorCode::UnknownBackendError,
        }
    }

    pub fn message(&self) -> &Message {
        match self {
            CatalogError::ConnectionError(m)
            | CatalogError::TransactionStartFailure(m)
            | CatalogError::InvalidState(m)
            | CatalogError::NotFound(m)
            | CatalogError::AmbiguousResult(m)
            | CatalogError::ReferenceNotFound(m)
            | CatalogError::AlreadyExists(m)
            | CatalogError::InvalidParameter(m)
            | CatalogError::ValueConversionError(m)
            | CatalogError::BackendTimeout(m)
            | CatalogError::NotSupported(m)
            | CatalogError::UnknownBackendError(m) => m,
        }
    }

    /// Whether the session that produced this error is in an unknown state
    /// and must be discarded rather than returned to the idle pool
    pub fn invalidates_session(&self) -> bool {
        matches!(
            self,
            CatalogError::ConnectionError(_) | CatalogError::BackendTimeout(_)
        )
    }

    pub fn not_found(node: &str, key: &str, value: impl std::fmt::Display) -> Self {
        CatalogError::NotFound(
            Message::new(MessageId::NOT_FOUND)
                .arg(node)
                .arg(key)
                .arg(value),
        )
    }

    pub fn ambiguous(node: &str, key: &str, value: impl std::fmt::Display, rows: usize) -> Self {
        CatalogError::AmbiguousResult(
            Message::new(MessageId::AMBIGUOUS_RESULT)
                .arg(node)
                .arg(key)
                .arg(value)
                .arg(rows),
        )
    }

    pub fn reference_not_found(node: &str, id: impl std::fmt::Display) -> Self {
        CatalogError::ReferenceNotFound(
            Message::new(MessageId::REFERENCE_NOT_FOUND).arg(node).arg(id),
        )
    }

    pub fn already_exists(node: &str, detail: impl std::fmt::Display) -> Self {
        CatalogError::AlreadyExists(
            Message::new(MessageId::ALREADY_EXISTS).arg(node).arg(detail),
        )
    }

    pub fn invalid_parameter(detail: impl std::fmt::Display) -> Self {
        CatalogError::InvalidParameter(Message::new(MessageId::PARAMETER_FAILED).arg(detail))
    }

    pub fn conversion(field: &str, detail: impl std::fmt::Display) -> Self {
        CatalogError::ValueConversionError(
            Message::new(MessageId::VALUE_CONVERSION_FAILURE)
                .arg(field)
                .arg(detail),
        )
    }

    pub fn invalid_state(detail: impl std::fmt::Display) -> Self {
        CatalogError::InvalidState(
            Message::new(MessageId::INVALID_TRANSACTION_STATE).arg(detail),
        )
    }

    pub fn not_supported(detail: impl std::fmt::Display) -> Self {
        CatalogError::NotSupported(Message::new(MessageId::NOT_SUPPORTED).arg(detail))
    }

    pub fn backend(code: impl std::fmt::Display, detail: impl std::fmt::Display) -> Self {
        CatalogError::UnknownBackendError(
            Message::new(MessageId::UNKNOWN_BACKEND_ERROR)
                .arg(code)
                .arg(detail),
        )
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorCode::Ok as i32, 0);
        assert_eq!(ErrorCode::NotFound as i32, 1);
        assert_eq!(ErrorCode::UnknownBackendError as i32, 99);
    }

    #[test]
    fn test_error_display_uses_catalog_text() {
        let err = CatalogError::not_found("tables", "name", "orders");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(
            err.to_string(),
            "Not found: Metadata not found.: tables where name = orders"
        );
    }

    #[test]
    fn test_invalidates_session() {
        let timeout = CatalogError::BackendTimeout(Message::new(MessageId::BACKEND_TIMEOUT));
        let conn = CatalogError::ConnectionError(Message::new(MessageId::CONNECT_FAILURE));
        assert!(timeout.invalidates_session());
        assert!(conn.invalidates_session());
        assert!(!CatalogError::already_exists("tables", "t1").invalidates_session());
        assert!(!CatalogError::invalid_state("commit").invalidates_session());
    }
}
