/// Errors raised before anything is sent to the backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input rejected client-side; the message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    #[error("Please select a CSV file")]
    UnsupportedMediaType(String),

    #[error("Invalid JSON: {0}")]
    MalformedJson(String),

    #[error("A request is already in progress")]
    Busy,

    #[error("No {0} has been generated yet")]
    MissingPayload(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
