use std::fmt;

use crate::error::ClientError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient user-facing message. Every failure of a user action ends up as
/// one of these instead of propagating further.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.level, NoticeLevel::Warning | NoticeLevel::Error)
    }
}

impl From<&ClientError> for Notice {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Validation(message) => Notice::warning(message.clone()),
            ClientError::Network(_) => Notice::error("Network error. Please try again."),
            ClientError::Server { message, .. } => Notice::error(message.clone()),
            other => Notice::error(other.to_string()),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
