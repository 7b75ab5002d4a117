// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised while reading an ABI document or checking it against the bindings.
#[derive(Debug, Error)]
pub enum AbiError {
    /// [std::io] library error.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path of the ABI document.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// [serde_json] library error.
    #[error("ABI document {path} is not valid JSON ABI: {source}")]
    Json {
        /// Path of the ABI document.
        path: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The ABI has no function with this name.
    #[error("ABI does not declare function `{0}`")]
    MissingFunction(String),

    /// The ABI declares the function, but no overload matches the binding.
    #[error("ABI function `{name}` has no overload matching `{expected}`; found {found:?}")]
    FunctionSignatureMismatch {
        /// Function name.
        name: String,
        /// Signature the bindings were generated from.
        expected: String,
        /// Signatures declared in the ABI.
        found: Vec<String>,
    },

    /// The ABI has no event with this name.
    #[error("ABI does not declare event `{0}`")]
    MissingEvent(String),

    /// The ABI declares the event, but not with the expected signature.
    #[error("ABI event `{name}` has no overload matching `{expected}`; found {found:?}")]
    EventSignatureMismatch {
        /// Event name.
        name: String,
        /// Expected canonical signature.
        expected: String,
        /// Signatures declared in the ABI.
        found: Vec<String>,
    },
}
