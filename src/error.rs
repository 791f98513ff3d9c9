//! Error types for the contact submission flow.
//!
//! Every variant ends up as an error alert inside the widget; none of them is
//! fatal to the host application.

/// Generic text shown when the backend says `success: false` without a reason.
pub const BACKEND_FALLBACK: &str = "Xatolik yuz berdi";

/// Generic text shown for network failures and unreadable responses.
pub const TRANSPORT_FALLBACK: &str = "Tarmoq xatoligi. Qaytadan urinib ko'ring.";

/// Errors from a single submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    /// Local validation failed; no request was sent.
    #[error("validation error: {0}")]
    Validation(String),
    /// The backend answered `success: false`.
    #[error("backend error: {0}")]
    Backend(String),
    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ContactError {
    /// Text to put in the widget's alert area.
    pub fn alert_text(&self) -> &str {
        match self {
            ContactError::Validation(text) | ContactError::Backend(text) => text,
            ContactError::Transport(_) => TRANSPORT_FALLBACK,
        }
    }
}

impl From<reqwest::Error> for ContactError {
    fn from(err: reqwest::Error) -> Self {
        ContactError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ContactError {
    fn from(err: serde_json::Error) -> Self {
        ContactError::Transport(format!("malformed response: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContactError::Validation("Iltimos, xabar yozing".to_string());
        assert_eq!(err.to_string(), "validation error: Iltimos, xabar yozing");

        let err = ContactError::Backend("Xato".to_string());
        assert_eq!(err.to_string(), "backend error: Xato");

        let err = ContactError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn test_alert_text_passes_through_local_and_backend_reasons() {
        assert_eq!(
            ContactError::Validation("Iltimos, xabar yozing".to_string()).alert_text(),
            "Iltimos, xabar yozing"
        );
        assert_eq!(ContactError::Backend("Xato".to_string()).alert_text(), "Xato");
    }

    #[test]
    fn test_alert_text_hides_transport_details() {
        let err = ContactError::Transport("error sending request: tcp connect".to_string());
        assert_eq!(err.alert_text(), TRANSPORT_FALLBACK);
    }

    #[test]
    fn test_from_serde_json_error_is_transport() {
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err: ContactError = json_err.into();
        assert!(matches!(err, ContactError::Transport(_)));
        assert!(err.to_string().contains("malformed response"));
    }
}
