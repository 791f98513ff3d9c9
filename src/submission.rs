//! Submission requests, backend results and the per-tab phase machine.
//!
//! A submission moves through:
//! Idle -> Validating -> Submitting -> Succeeded/Failed -> Idle
//! Validating -> Failed (local validation error, nothing is sent)

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ContactError, BACKEND_FALLBACK};
use crate::state::Tab;

pub const WEBCHAT_REQUIRED: &str = "Iltimos, xabar yozing";
pub const PHONE_REQUIRED: &str = "Iltimos, telefon raqamingizni kiriting";
pub const PHONE_FORMAT: &str =
    "Telefon raqami +998 bilan boshlanishi va 13 ta raqamdan iborat bo'lishi kerak";

/// Shown when the backend reports success without a message of its own.
pub const SUCCESS_FALLBACK: &str = "Xabaringiz yuborildi!";

// ASCII digits only; `\d` in the regex crate would also accept other scripts.
const PHONE_PATTERN: &str = r"^\+998[0-9]{9}$";

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern is valid"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid submission transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: SubmissionPhase,
    pub to: SubmissionPhase,
}

/// Validate that a phase transition is allowed.
pub fn validate_transition(
    from: SubmissionPhase,
    to: SubmissionPhase,
) -> Result<(), InvalidTransition> {
    use SubmissionPhase::*;

    let valid = matches!(
        (from, to),
        (Idle, Validating)
            | (Validating, Submitting)
            | (Validating, Failed)
            | (Submitting, Succeeded)
            | (Submitting, Failed)
            | (Succeeded, Idle)
            | (Failed, Idle)
    );

    if valid {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}

/// What gets sent to the backend. Built from form input at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionRequest {
    Webchat { message: String },
    Phone { phone: String, note: Option<String> },
}

impl SubmissionRequest {
    pub fn tab(&self) -> Tab {
        match self {
            SubmissionRequest::Webchat { .. } => Tab::Webchat,
            SubmissionRequest::Phone { .. } => Tab::Phone,
        }
    }

    /// Path of the backend endpoint, relative to the base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            SubmissionRequest::Webchat { .. } => "/contact/webchat",
            SubmissionRequest::Phone { .. } => "/contact/phone",
        }
    }
}

/// Decoded backend response. Extra fields such as `log_id` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SubmissionResult {
    /// Success text, or the backend failure as a [`ContactError::Backend`].
    pub fn into_outcome(self) -> Result<String, ContactError> {
        if self.success {
            Ok(self
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| SUCCESS_FALLBACK.to_string()))
        } else {
            Err(ContactError::Backend(
                self.error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| BACKEND_FALLBACK.to_string()),
            ))
        }
    }
}

pub fn validate_webchat(message: &str) -> Result<SubmissionRequest, ContactError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ContactError::Validation(WEBCHAT_REQUIRED.to_string()));
    }

    Ok(SubmissionRequest::Webchat {
        message: message.to_string(),
    })
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_pattern().is_match(phone)
}

pub fn validate_phone(phone: &str, note: &str) -> Result<SubmissionRequest, ContactError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ContactError::Validation(PHONE_REQUIRED.to_string()));
    }
    if !is_valid_phone(phone) {
        return Err(ContactError::Validation(PHONE_FORMAT.to_string()));
    }

    let note = note.trim();
    Ok(SubmissionRequest::Phone {
        phone: phone.to_string(),
        note: (!note.is_empty()).then(|| note.to_string()),
    })
}
