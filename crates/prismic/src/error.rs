use thiserror::Error;

/// Failure to decode a structurally required part of a payload.
///
/// Malformed or forward-incompatible content (bad colors, unknown block
/// types, unparsable dates) never produces an error — those fields are
/// simply absent from the model. A `DecodeError` indicates a schema
/// contract violation, such as a document link without a target id.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for field `{0}`")]
    InvalidField(&'static str),

    #[error("invalid document payload: {0}")]
    InvalidDocument(String),
}
