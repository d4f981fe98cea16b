/// Failures of console operations: transport, backend, local input and I/O.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Http { status: u16, message: Option<String> },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Input(#[from] namaste_core::Error),
}

impl Error {
    /// The `message` field of a non-2xx JSON body, when the backend sent one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Error::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display_with_message() {
        let err = Error::Http {
            status: 422,
            message: Some("Invalid CSV header".to_string()),
        };
        assert_eq!(err.to_string(), "Backend returned HTTP 422: Invalid CSV header");
        assert_eq!(err.backend_message(), Some("Invalid CSV header"));
    }

    #[test]
    fn test_http_error_display_without_message() {
        let err = Error::Http {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "Backend returned HTTP 502");
        assert_eq!(err.backend_message(), None);
    }

    #[test]
    fn test_input_errors_pass_through() {
        let err: Error = namaste_core::Error::validation("Please enter a code to translate").into();
        assert_eq!(err.to_string(), "Please enter a code to translate");
        assert_eq!(err.backend_message(), None);
    }
}
