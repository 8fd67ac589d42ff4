use thiserror::Error;

/// Failures while reading curriculum data (persisted slot or import file).
#[derive(Error, Debug)]
pub enum CurriculumError {
    #[error("curriculum is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("curriculum must be a JSON array of lessons")]
    NotAnArray,
}

/// Failures talking to on-device storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("local storage is unavailable")]
    Unavailable,

    #[error("storage call failed: {0}")]
    Js(String),
}

/// Failures of the hosted generative model (judging or lesson generation).
#[derive(Error, Debug)]
pub enum AiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("service answered with HTTP {0}")]
    Status(u16),

    #[error("service returned no content")]
    EmptyResponse,

    #[error("could not decode service response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no API key configured")]
    MissingKey,
}

impl AiError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid app config: {0}")]
    Parse(#[from] serde_json::Error),
}
