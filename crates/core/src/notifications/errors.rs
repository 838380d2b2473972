use thiserror::Error;

/// Errors from the transactional email API.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// No email API key is configured.
    #[error("Email delivery is not configured")]
    NotConfigured,

    /// The email API answered with a non-success status.
    #[error("Email API rejected the message with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The email API could not be reached.
    #[error("Email API request failed: {0}")]
    Transport(String),

    /// The message is missing a recipient or subject.
    #[error("Invalid email message: {0}")]
    InvalidMessage(String),
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Transport(err.to_string())
    }
}
