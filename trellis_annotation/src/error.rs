// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Reasons an annotation cannot be reconstructed from JSON.
///
/// Only structural problems are errors; missing or malformed optional fields
/// fall back to their defaults.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// The value is not a JSON object.
    #[error("annotation JSON must be an object")]
    NotAnObject,
    /// There is no string `id` field.
    #[error("annotation JSON has no string `id`")]
    MissingId,
    /// There is no string `type` field.
    #[error("annotation `{0}` has no string `type`")]
    MissingType(String),
    /// The `type` field names no known annotation kind.
    #[error("annotation `{id}` has unknown type `{ty}`")]
    UnknownType {
        /// Id of the offending annotation.
        id: String,
        /// The unrecognized discriminator.
        ty: String,
    },
    /// The input text is not valid JSON.
    #[error("invalid annotation JSON: {0}")]
    Json(#[from] serde_json::Error),
}
