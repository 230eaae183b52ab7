// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Nutrilog data-access layer.

use thiserror::Error;

use crate::lock::LockError;
use crate::types::{EntityKind, RecordId};

/// The primary error type returned by data sources and repositories.
#[derive(Debug, Error)]
pub enum NutrilogError {
    /// Configuration errors (invalid values, unusable paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// A storage backend operation failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Resource lock acquisition or release failed.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// A record was handed to an operation whose precondition it violates.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A data source declared a different entity kind than its repository.
    #[error("cannot add {found} data source `{source_name}` to a {expected} repository")]
    KindMismatch {
        expected: EntityKind,
        found: EntityKind,
        source_name: String,
    },

    /// The same data source instance was added to a repository twice.
    #[error("data source `{source_name}` was already added to the {kind} repository")]
    DuplicateDataSource { kind: EntityKind, source_name: String },

    /// A write was attempted on a repository without any data source.
    #[error("{kind} repository has no data sources")]
    NoDataSources { kind: EntityKind },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NutrilogError {
    /// Whether a repository may try the next data source after this error.
    ///
    /// Backend failures and lock timeouts are transient for a single source.
    /// Contract and protocol violations would fail identically everywhere.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend(_) => true,
            Self::Lock(err) => err.is_timeout(),
            Self::Config(_)
            | Self::Model(_)
            | Self::KindMismatch { .. }
            | Self::DuplicateDataSource { .. }
            | Self::NoDataSources { .. }
            | Self::Internal(_) => false,
        }
    }

    /// The status-like code of a backend error, if this is one.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Backend(err) => Some(err.code()),
            _ => None,
        }
    }
}

/// A failing storage operation, carrying a status-like code and a message.
#[derive(Debug, Error)]
#[error("{message} (code {code})")]
pub struct BackendError {
    code: u16,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    /// The addressed row does not exist in this backend.
    pub const NOT_FOUND: u16 = 404;
    /// A constraint (unique index, foreign key) rejected the write.
    pub const CONFLICT: u16 = 409;
    /// Generic backend failure.
    pub const INTERNAL: u16 = 500;
    /// The backend cannot be reached or is not initialized.
    pub const UNAVAILABLE: u16 = 503;

    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Self::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(Self::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(Self::UNAVAILABLE, message)
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Record precondition violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Insert was called with a record that already has an identity.
    #[error("{kind} record already has identity {id}; insert requires a new record")]
    AlreadyPersisted { kind: EntityKind, id: RecordId },

    /// Update was called with a record that was never persisted.
    #[error("{kind} record has no identity; update requires a persisted record")]
    NotPersisted { kind: EntityKind },

    /// A second identity assignment was attempted.
    #[error("{kind} record already has identity {current}, refusing to reassign {attempted}")]
    IdentityAlreadyAssigned {
        kind: EntityKind,
        current: RecordId,
        attempted: RecordId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn backend_error_displays_message_and_code() {
        let err = BackendError::conflict("user name `anna` is taken");
        assert_eq!(err.to_string(), "user name `anna` is taken (code 409)");
        assert_eq!(err.code(), BackendError::CONFLICT);
    }

    #[test]
    fn backend_error_keeps_source_chain() {
        use std::error::Error;

        let err = BackendError::internal("disk full").with_source(std::io::Error::other("ENOSPC"));
        let source = err.source().expect("source should be attached");
        assert_eq!(source.to_string(), "ENOSPC");
    }

    #[test]
    fn retryable_classification() {
        let backend: NutrilogError = BackendError::unavailable("closed").into();
        assert!(backend.is_retryable());
        assert_eq!(backend.code(), Some(503));

        let timeout: NutrilogError = LockError::Timeout {
            resource: "meals".into(),
            waited: Duration::from_millis(10),
        }
        .into();
        assert!(timeout.is_retryable());

        let not_held: NutrilogError = LockError::NotHeld {
            resource: "meals".into(),
        }
        .into();
        assert!(!not_held.is_retryable());

        let model: NutrilogError = ModelError::NotPersisted {
            kind: EntityKind::Meal,
        }
        .into();
        assert!(!model.is_retryable());
        assert_eq!(model.code(), None);
    }

    #[test]
    fn kind_mismatch_message_names_both_kinds() {
        let err = NutrilogError::KindMismatch {
            expected: EntityKind::Meal,
            found: EntityKind::User,
            source_name: "sqlite-users".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot add user data source `sqlite-users` to a meal repository"
        );
    }
}
