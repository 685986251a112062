use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures of a single requested operation. None of them are fatal for the application, they are
/// stored in [AppState](crate::app::AppState) and shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("{message}")]
    AuthFailure { code: String, message: String },
    #[error("Malformed identity message: {0}")]
    DecodeFailure(String),
    #[error("Interval ends at {end} which is before its start at {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("Can't {action} while the timer is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

impl TrackerError {
    /// Text that is safe to show to the user. Decoding details only go to the logs.
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::DecodeFailure(_) => {
                "Something went wrong while talking to the sign-in service".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TrackerError;

    #[test]
    fn auth_failure_is_shown_verbatim() {
        let error = TrackerError::AuthFailure {
            code: "auth/wrong-password".into(),
            message: "The password is invalid".into(),
        };
        assert_eq!(error.user_message(), "The password is invalid");
    }

    #[test]
    fn decode_failure_hides_details() {
        let error = TrackerError::DecodeFailure("missing field `code`".into());
        assert!(!error.user_message().contains("code"));
    }
}
