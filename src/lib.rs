pub mod client;
pub mod config;
pub mod error;
pub mod state;
pub mod submission;
pub mod widget;

// Re-export main types for convenience
pub use client::{ContactBackend, ContactClient};
pub use config::Config;
pub use error::ContactError;
pub use state::{Alert, AlertKind, Tab, WidgetState};
pub use submission::{SubmissionPhase, SubmissionRequest, SubmissionResult};
pub use widget::{Field, PendingSubmission, SubmitAttempt, SubmitTicket, WidgetController};
