// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Message catalog
//!
//! Every message the metadata manager can emit is identified by a
//! [`MessageId`]. The identifier maps to a fixed format template and a
//! severity through exhaustive matches, so adding an identifier without a
//! template does not compile.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the message catalog. Bump when a template changes meaning.
pub const MESSAGE_CATALOG_VERSION: u32 = 1;

/// Severity attached to a message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Closed set of message identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum MessageId {
    // Connection and session
    CONNECT_FAILURE,
    CLOSE_FAILURE,
    NOT_CONNECT,
    NOT_INITIALIZED,
    SET_ALWAYS_SECURE_SEARCH_PATH,
    BACKEND_TIMEOUT,

    // Transactions
    START_TRANSACTION_FAILURE,
    COMMIT_FAILURE,
    ROLLBACK_FAILURE,
    INVALID_TRANSACTION_STATE,

    // Statements
    PREPARE_FAILURE,
    PREPARED_STATEMENT_EXECUTION_FAILURE,
    INVALID_STATEMENT_KEY,

    // JSON documents
    READ_JSON_FAILURE,
    WRITE_JSON_FAILURE,
    READ_JSON_FILE_FAILURE,
    WRITE_JSON_FILE_FAILURE,

    // Values and parameters
    CONVERT_STRING_TO_INT_FAILURE,
    VALUE_CONVERSION_FAILURE,
    METADATA_KEY_NOT_FOUND,
    PARAMETER_FAILED,
    INCORRECT_DATA,

    // Results
    ALREADY_EXISTS,
    RECORD_INSERT_FAILURE,
    NOT_FOUND,
    AMBIGUOUS_RESULT,
    REFERENCE_NOT_FOUND,
    NOT_SUPPORTED,
    UNKNOWN_BACKEND_ERROR,

    // Catalog events
    CREATE_TABLE,
    ALTER_TABLE,
    DROP_TABLE,
}

impl MessageId {
    /// Format template. Each `{}` is replaced by the next message argument.
    pub fn template(self) -> &'static str {
        match self {
            MessageId::CONNECT_FAILURE => "Failed to open connection to database.: {}",
            MessageId::CLOSE_FAILURE => "Failed to close connection to database.: {}",
            MessageId::NOT_CONNECT => "Not connected to the database.: {}",
            MessageId::NOT_INITIALIZED => "not initialized.: {}",
            MessageId::SET_ALWAYS_SECURE_SEARCH_PATH => {
                "Failed to set always-secure search path.: {}"
            }
            MessageId::BACKEND_TIMEOUT => "Backend operation timed out.: {}",
            MessageId::START_TRANSACTION_FAILURE => "Failed to start transaction.: {}",
            MessageId::COMMIT_FAILURE => "Failed to commit.: {}",
            MessageId::ROLLBACK_FAILURE => "Failed to rollback.: {}",
            MessageId::INVALID_TRANSACTION_STATE => "Invalid transaction state.: {}",
            MessageId::PREPARE_FAILURE => "Failed to prepare of prepared statement.: {}",
            MessageId::PREPARED_STATEMENT_EXECUTION_FAILURE => {
                "Failed to execute prepared statement.: {}"
            }
            MessageId::INVALID_STATEMENT_KEY => "SQL statement is undefined.: {}",
            MessageId::READ_JSON_FAILURE => "Failed to parse json.: JSON to Property-tree. {}",
            MessageId::WRITE_JSON_FAILURE => "Failed to parse json.: Property-tree to JSON. {}",
            MessageId::READ_JSON_FILE_FAILURE => "Failed to read json file.: {} {}",
            MessageId::WRITE_JSON_FILE_FAILURE => "Failed to write json file.: {} {}",
            MessageId::CONVERT_STRING_TO_INT_FAILURE => {
                "Failed to convert a string to an integer. {}"
            }
            MessageId::VALUE_CONVERSION_FAILURE => "Failed to convert value of {}.: {}",
            MessageId::METADATA_KEY_NOT_FOUND => {
                "Could not find such column name of metadata.: {}"
            }
            MessageId::PARAMETER_FAILED => "Invalid parameter.: {}",
            MessageId::INCORRECT_DATA => "Incorrect data.: {}",
            MessageId::ALREADY_EXISTS => "Object with same parameter exists.: {} {}",
            MessageId::RECORD_INSERT_FAILURE => "Failed to insert record. {}",
            MessageId::NOT_FOUND => "Metadata not found.: {} where {} = {}",
            MessageId::AMBIGUOUS_RESULT => {
                "More than one metadata matched.: {} where {} = {} ({} rows)"
            }
            MessageId::REFERENCE_NOT_FOUND => "Referenced metadata does not exist.: {} id = {}",
            MessageId::NOT_SUPPORTED => "Operation is not supported.: {}",
            MessageId::UNKNOWN_BACKEND_ERROR => "Backend error.: [{}] {}",
            MessageId::CREATE_TABLE => "Table metadata added.: id = {}",
            MessageId::ALTER_TABLE => "Table metadata updated.: id = {}",
            MessageId::DROP_TABLE => "Table metadata removed.: id = {}",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            MessageId::CREATE_TABLE | MessageId::ALTER_TABLE | MessageId::DROP_TABLE => {
                Severity::Info
            }
            MessageId::NOT_FOUND | MessageId::CLOSE_FAILURE => Severity::Warning,
            MessageId::CONNECT_FAILURE
            | MessageId::NOT_CONNECT
            | MessageId::NOT_INITIALIZED
            | MessageId::SET_ALWAYS_SECURE_SEARCH_PATH
            | MessageId::BACKEND_TIMEOUT
            | MessageId::START_TRANSACTION_FAILURE
            | MessageId::COMMIT_FAILURE
            | MessageId::ROLLBACK_FAILURE
            | MessageId::INVALID_TRANSACTION_STATE
            | MessageId::PREPARE_FAILURE
            | MessageId::PREPARED_STATEMENT_EXECUTION_FAILURE
            | MessageId::INVALID_STATEMENT_KEY
            | MessageId::READ_JSON_FAILURE
            | MessageId::WRITE_JSON_FAILURE
            | MessageId::READ_JSON_FILE_FAILURE
            | MessageId::WRITE_JSON_FILE_FAILURE
            | MessageId::CONVERT_STRING_TO_INT_FAILURE
            | MessageId::VALUE_CONVERSION_FAILURE
            | MessageId::METADATA_KEY_NOT_FOUND
            | MessageId::PARAMETER_FAILED
            | MessageId::INCORRECT_DATA
            | MessageId::ALREADY_EXISTS
            | MessageId::RECORD_INSERT_FAILURE
            | MessageId::AMBIGUOUS_RESULT
            | MessageId::REFERENCE_NOT_FOUND
            | MessageId::NOT_SUPPORTED
            | MessageId::UNKNOWN_BACKEND_ERROR => Severity::Error,
        }
    }

    /// Number of `{}` placeholders in the template
    pub fn arity(self) -> usize {
        self.template().matches("{}").count()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
