use thiserror::Error;

/// Marker used by the server for an unset death timestamp (`i64::MAX`).
pub const DAG_DEATH_UNSPECIFIED: &str = "9223372036854775807";

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{path} returned {status}")]
    Api {
        path: String,
        status: reqwest::StatusCode,
    },

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Failure to turn a raw REST payload into a view model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("malformed payload: {0}")]
    Json(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}
