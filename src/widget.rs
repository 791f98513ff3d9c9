//! Widget controller: owns one widget's state, its form fields and the
//! submission flow of each tab.
//!
//! The controller never performs I/O itself. A submission is split into
//! [`WidgetController::begin_submit`], which validates and disables the submit
//! control synchronously, and [`WidgetController::complete`], which applies the
//! backend outcome once it arrives. The [`SubmitTicket`] handed out by the
//! first half decides whether the outcome is still relevant when it comes back.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::client::ContactBackend;
use crate::error::ContactError;
use crate::state::{Alert, AlertKind, Tab, WidgetState, SENDING_LABEL};
use crate::submission::{
    validate_phone, validate_transition, validate_webchat, SubmissionPhase, SubmissionRequest,
    SubmissionResult,
};

/// Editable form fields across both tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    WebchatMessage,
    PhoneNumber,
    PhoneNote,
}

impl Field {
    pub fn tab(&self) -> Tab {
        match self {
            Field::WebchatMessage => Tab::Webchat,
            Field::PhoneNumber | Field::PhoneNote => Tab::Phone,
        }
    }

    pub fn fields(tab: Tab) -> &'static [Field] {
        match tab {
            Tab::Webchat => &[Field::WebchatMessage],
            Tab::Phone => &[Field::PhoneNumber, Field::PhoneNote],
        }
    }

    pub fn first(tab: Tab) -> Field {
        Self::fields(tab)[0]
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::WebchatMessage => "Savolingizni yozing...",
            Field::PhoneNumber => "+998901234567",
            Field::PhoneNote => "Qanday masala bo'yicha aloqaga chiqishimiz kerak?",
        }
    }
}

/// Identifies one submission; captured when the request leaves the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    tab: Tab,
    generation: u64,
}

impl SubmitTicket {
    pub fn tab(&self) -> Tab {
        self.tab
    }
}

/// A validated request that the caller must deliver to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub ticket: SubmitTicket,
    pub request: SubmissionRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAttempt {
    /// Validation passed and the submit control is now disabled.
    Pending(PendingSubmission),
    /// Validation failed locally; an error alert is showing.
    Rejected(ContactError),
    /// Widget closed or the tab already has a request in flight.
    Ignored,
}

#[derive(Debug, Default)]
pub struct WidgetController {
    state: WidgetState,

    webchat_message: String,
    phone_number: String,
    phone_note: String,
    focus: Option<Field>,

    webchat_phase: SubmissionPhase,
    phone_phase: SubmissionPhase,

    // Bumped on every close; tickets from an older generation are stale.
    generation: u64,
    auto_close_at: Option<Instant>,
}

impl WidgetController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn active_tab(&self) -> Tab {
        self.state.active_tab
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.state.alert.as_ref()
    }

    pub fn open(&mut self) {
        if !self.state.is_open {
            self.state.is_open = true;
            info!(tab = self.state.active_tab.as_str(), "widget opened");
        }
        self.focus = Some(Field::first(self.state.active_tab));
    }

    /// Hide the widget and reset it. Requests still in flight are not
    /// cancelled, but their outcomes will be discarded.
    pub fn close(&mut self) {
        let abandoned = Tab::all()
            .into_iter()
            .filter(|tab| self.is_submitting(*tab))
            .count();

        self.state.is_open = false;
        self.state.alert = None;
        self.webchat_message.clear();
        self.phone_number.clear();
        self.phone_note.clear();
        self.focus = None;
        self.webchat_phase = SubmissionPhase::Idle;
        self.phone_phase = SubmissionPhase::Idle;
        self.auto_close_at = None;
        self.generation += 1;

        info!(abandoned, "widget closed");
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.state.active_tab = tab;
        self.state.alert = None;
        if self.state.is_open {
            self.focus = Some(Field::first(tab));
        }
        debug!(tab = tab.as_str(), "tab switched");
    }

    pub fn show_alert(&mut self, text: impl Into<String>, kind: AlertKind) {
        self.state.alert = Some(Alert {
            text: text.into(),
            kind,
        });
    }

    pub fn clear_alert(&mut self) {
        self.state.alert = None;
    }

    // Form fields

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::WebchatMessage => &self.webchat_message,
            Field::PhoneNumber => &self.phone_number,
            Field::PhoneNote => &self.phone_note,
        }
    }

    pub fn set_field(&mut self, field: Field, value: &str) {
        *self.field_mut(field) = value.to_string();
    }

    /// The field that has keyboard focus, if the widget is open.
    pub fn focus(&self) -> Option<Field> {
        self.focus
    }

    pub fn focused_input_mut(&mut self) -> Option<&mut String> {
        let field = self.focus?;
        Some(self.field_mut(field))
    }

    /// Focus `field` if it belongs to the open widget's active tab.
    pub fn focus_field(&mut self, field: Field) -> bool {
        if !self.state.is_open || field.tab() != self.state.active_tab {
            return false;
        }
        self.focus = Some(field);
        true
    }

    pub fn focus_next_field(&mut self) {
        self.cycle_focus(1);
    }

    pub fn focus_prev_field(&mut self) {
        let len = Field::fields(self.state.active_tab).len();
        self.cycle_focus(len - 1);
    }

    fn cycle_focus(&mut self, step: usize) {
        if !self.state.is_open {
            return;
        }
        let fields = Field::fields(self.state.active_tab);
        let current = self
            .focus
            .and_then(|f| fields.iter().position(|candidate| *candidate == f))
            .unwrap_or(0);
        self.focus = Some(fields[(current + step) % fields.len()]);
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::WebchatMessage => &mut self.webchat_message,
            Field::PhoneNumber => &mut self.phone_number,
            Field::PhoneNote => &mut self.phone_note,
        }
    }

    fn clear_inputs(&mut self, tab: Tab) {
        for field in Field::fields(tab) {
            self.field_mut(*field).clear();
        }
    }

    // Submission flow

    pub fn phase(&self, tab: Tab) -> SubmissionPhase {
        match tab {
            Tab::Webchat => self.webchat_phase,
            Tab::Phone => self.phone_phase,
        }
    }

    /// Whether the tab's submit control is disabled.
    pub fn is_submitting(&self, tab: Tab) -> bool {
        self.phase(tab) == SubmissionPhase::Submitting
    }

    pub fn submit_label(&self, tab: Tab) -> &'static str {
        if self.is_submitting(tab) {
            SENDING_LABEL
        } else {
            tab.submit_label()
        }
    }

    pub fn auto_close_at(&self) -> Option<Instant> {
        self.auto_close_at
    }

    fn transition(&mut self, tab: Tab, to: SubmissionPhase) {
        let phase = match tab {
            Tab::Webchat => &mut self.webchat_phase,
            Tab::Phone => &mut self.phone_phase,
        };
        let from = *phase;
        match validate_transition(from, to) {
            Ok(()) => {
                debug!(tab = tab.as_str(), ?from, ?to, "submission phase");
                *phase = to;
            }
            Err(err) => warn!(tab = tab.as_str(), "{}", err),
        }
    }

    /// Validate the tab's form and, if it passes, disable its submit control.
    ///
    /// Everything here happens before the caller awaits the network, so a
    /// second submit on the same tab sees the control disabled.
    pub fn begin_submit(&mut self, tab: Tab) -> SubmitAttempt {
        if !self.state.is_open || self.phase(tab) != SubmissionPhase::Idle {
            debug!(tab = tab.as_str(), open = self.state.is_open, "submit ignored");
            return SubmitAttempt::Ignored;
        }

        self.transition(tab, SubmissionPhase::Validating);
        let validated = match tab {
            Tab::Webchat => validate_webchat(&self.webchat_message),
            Tab::Phone => validate_phone(&self.phone_number, &self.phone_note),
        };

        match validated {
            Ok(request) => {
                self.transition(tab, SubmissionPhase::Submitting);
                self.clear_alert();
                info!(tab = tab.as_str(), endpoint = request.endpoint(), "submission started");

                SubmitAttempt::Pending(PendingSubmission {
                    ticket: SubmitTicket {
                        tab,
                        generation: self.generation,
                    },
                    request,
                })
            }
            Err(err) => {
                self.transition(tab, SubmissionPhase::Failed);
                self.show_alert(err.alert_text(), AlertKind::Error);
                self.transition(tab, SubmissionPhase::Idle);
                SubmitAttempt::Rejected(err)
            }
        }
    }

    /// Whether an outcome for `ticket` may still touch this widget.
    pub fn is_relevant(&self, ticket: &SubmitTicket) -> bool {
        ticket.generation == self.generation
            && self.state.is_open
            && self.is_submitting(ticket.tab())
    }

    /// Apply a backend outcome. Returns the terminal phase reached, or `None`
    /// when the outcome was stale and dropped without touching any state.
    pub fn complete(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<SubmissionResult, ContactError>,
        now: Instant,
    ) -> Option<SubmissionPhase> {
        if !self.is_relevant(&ticket) {
            info!(tab = ticket.tab().as_str(), "discarding stale submission result");
            return None;
        }

        let tab = ticket.tab();
        let reached = match outcome.and_then(SubmissionResult::into_outcome) {
            Ok(message) => {
                self.transition(tab, SubmissionPhase::Succeeded);
                self.show_alert(message, AlertKind::Success);
                self.clear_inputs(tab);
                self.auto_close_at = Some(now + tab.auto_close_delay());
                info!(tab = tab.as_str(), "submission succeeded");
                SubmissionPhase::Succeeded
            }
            Err(err) => {
                self.transition(tab, SubmissionPhase::Failed);
                self.show_alert(err.alert_text(), AlertKind::Error);
                info!(tab = tab.as_str(), error = %err, "submission failed");
                SubmissionPhase::Failed
            }
        };
        self.transition(tab, SubmissionPhase::Idle);

        Some(reached)
    }

    /// Fire the auto-close timer if it is due. Returns true if the widget closed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.auto_close_at {
            Some(deadline) if now >= deadline => {
                debug!("auto-close timer fired");
                self.close();
                true
            }
            _ => false,
        }
    }

    /// Run a whole submission for `tab` against `backend`, awaiting the
    /// response in place. Returns `None` if the submit was ignored.
    pub async fn submit_with(
        &mut self,
        tab: Tab,
        backend: &dyn ContactBackend,
    ) -> Option<SubmissionPhase> {
        match self.begin_submit(tab) {
            SubmitAttempt::Pending(pending) => {
                let outcome = backend.submit(&pending.request).await;
                self.complete(pending.ticket, outcome, Instant::now())
            }
            SubmitAttempt::Rejected(_) => Some(SubmissionPhase::Failed),
            SubmitAttempt::Ignored => None,
        }
    }
}
