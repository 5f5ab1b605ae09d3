//! Module for reading and writing models
pub mod json;
pub mod lp;

use thiserror::Error;

use crate::model::model::ModelError;

/// Errors raised while serializing or deserializing models
#[derive(Error, Debug)]
pub enum IoError {
    /// Error when a model could not be serialized
    #[error("failed to serialize model: {0}")]
    Serialize(#[source] serde_json::Error),
    /// Error when input could not be parsed
    #[error("failed to deserialize model: {0}")]
    Deserialize(#[source] serde_json::Error),
    /// Error when parsed input does not form a valid model
    #[error("deserialized data is not a valid model")]
    InvalidModel(#[from] ModelError),
}
