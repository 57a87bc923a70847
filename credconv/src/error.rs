// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

//! Errors that might occur while normalizing or comparing credentials.

use crate::key::{Algorithm, Branch};

/// Errors returned by this crate.
///
/// None of these are recoverable by retrying: they indicate the configuration of a credential
/// is wrong, and the caller should fail the convergence attempt for that credential.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The key material could not be interpreted as a private key of the algorithm its
    /// dispatch branch implies.
    ///
    /// This includes the fallback branch, where text without a recognizable PEM header is
    /// assumed to be an RSA key.
    #[error("invalid {algorithm} private key ({branch}): {reason}")]
    InvalidKeyMaterial {
        /// The dispatch branch that was attempted.
        branch: Branch,
        /// The algorithm the key was expected to use.
        algorithm: Algorithm,
        /// Why the key was rejected.
        reason: String,
    },

    /// A credential was constructed without a field it cannot exist without.
    #[error("the required field '{field}' is missing")]
    MissingRequiredField {
        /// The logical name of the missing field.
        field: &'static str,
    },

    /// The same credential ID was declared more than once in a desired set.
    #[error("credential '{0}' is declared more than once")]
    DuplicateId(String),
}

impl Error {
    pub(crate) fn invalid_key(
        branch: Branch,
        algorithm: Algorithm,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidKeyMaterial {
            branch,
            algorithm,
            reason: reason.to_string(),
        }
    }
}
