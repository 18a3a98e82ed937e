use chatkeep_core::error::ResponderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BedrockError {
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),
}

impl From<BedrockError> for ResponderError {
    fn from(e: BedrockError) -> Self {
        ResponderError::Provider(e.to_string())
    }
}
