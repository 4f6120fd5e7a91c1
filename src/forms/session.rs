//! Form submission state machine
//!
//! `Idle -> Pending -> Success | Error`. Fields survive an error so the
//! visitor can resubmit; after a success they are cleared once the reset
//! delay has passed. There are no retries.

use std::time::{Duration, Instant};

use super::relay::{FormFields, RelayError, RelayReply};

/// Visible state of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

impl FormStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FormStatus::Idle => "idle",
            FormStatus::Pending => "pending",
            FormStatus::Success => "success",
            FormStatus::Error => "error",
        }
    }
}

/// A submission is already in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a submission is already pending")]
pub struct AlreadyPending;

/// One visitor's form and its submission state
#[derive(Debug, Clone)]
pub struct FormSession<F: FormFields> {
    pub fields: F,
    initial: F,
    status: FormStatus,
    reset_after: Duration,
    succeeded_at: Option<Instant>,
    error: Option<String>,
}

impl<F: FormFields> FormSession<F> {
    /// Start from `initial`; after a success, fields reset to it once `reset_after` elapses
    pub fn new(initial: F, reset_after: Duration) -> Self {
        Self {
            fields: initial.clone(),
            initial,
            status: FormStatus::Idle,
            reset_after,
            succeeded_at: None,
            error: None,
        }
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    /// Message of the last failure, if the form is in the error state
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.status == FormStatus::Pending
    }

    /// Enter the pending state; the submit control is disabled meanwhile
    pub fn begin(&mut self) -> Result<(), AlreadyPending> {
        if self.is_pending() {
            return Err(AlreadyPending);
        }
        self.status = FormStatus::Pending;
        self.succeeded_at = None;
        self.error = None;
        Ok(())
    }

    /// Record the relay outcome
    pub fn finish(&mut self, outcome: Result<RelayReply, RelayError>, now: Instant) {
        match outcome {
            Ok(_) => {
                self.status = FormStatus::Success;
                self.succeeded_at = Some(now);
                self.tick(now);
            }
            Err(e) => {
                tracing::error!("Error submitting form: {}", e);
                self.status = FormStatus::Error;
                self.error = Some(e.to_string());
            }
        }
    }

    /// Clear the fields once the post-success delay has elapsed
    ///
    /// Returns true when the form was reset by this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(at) = self.succeeded_at else {
            return false;
        };
        if now.saturating_duration_since(at) < self.reset_after {
            return false;
        }

        self.fields = self.initial.clone();
        self.succeeded_at = None;
        // A zero delay clears the inputs but keeps the confirmation on screen
        if !self.reset_after.is_zero() {
            self.status = FormStatus::Idle;
        }
        true
    }

    /// Delay before a successful submission is cleared, while one is waiting
    pub fn pending_reset(&self) -> Option<Duration> {
        self.succeeded_at.map(|_| self.reset_after)
    }

    /// Manual reset back to a fresh form
    pub fn refresh(&mut self) {
        self.fields = self.initial.clone();
        self.status = FormStatus::Idle;
        self.succeeded_at = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{ContactForm, ResumeRequest};

    fn filled_contact() -> ContactForm {
        ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hi".to_string(),
            message: "Hello".to_string(),
        }
    }

    fn ok() -> Result<RelayReply, RelayError> {
        Ok(RelayReply {
            success: true,
            message: None,
        })
    }

    #[test]
    fn test_pending_blocks_second_submit() {
        let mut session = FormSession::new(ContactForm::default(), Duration::ZERO);
        session.begin().unwrap();
        assert_eq!(session.status(), FormStatus::Pending);
        assert_eq!(session.begin(), Err(AlreadyPending));
    }

    #[test]
    fn test_contact_success_clears_immediately() {
        let mut session = FormSession::new(ContactForm::default(), Duration::ZERO);
        session.fields = filled_contact();
        session.begin().unwrap();
        session.finish(ok(), Instant::now());

        assert_eq!(session.status(), FormStatus::Success);
        assert_eq!(session.fields, ContactForm::default());
        assert_eq!(session.pending_reset(), None);
    }

    #[test]
    fn test_resume_success_clears_after_delay() {
        let initial = ResumeRequest::for_member(Some("Asha"));
        let mut session = FormSession::new(initial.clone(), Duration::from_secs(60));
        session.fields.email = "hr@corp.example".to_string();
        session.fields.company = "Corp".to_string();

        let start = Instant::now();
        session.begin().unwrap();
        session.finish(ok(), start);
        assert_eq!(session.status(), FormStatus::Success);
        assert_eq!(session.fields.company, "Corp");

        assert_eq!(session.pending_reset(), Some(Duration::from_secs(60)));
        assert!(!session.tick(start + Duration::from_secs(59)));
        assert_eq!(session.status(), FormStatus::Success);

        assert!(session.tick(start + Duration::from_secs(60)));
        assert_eq!(session.status(), FormStatus::Idle);
        assert_eq!(session.pending_reset(), None);
        assert_eq!(session.fields, initial);
        assert_eq!(session.fields.member_name, "Asha");
    }

    #[test]
    fn test_failure_preserves_fields() {
        let mut session = FormSession::new(ContactForm::default(), Duration::ZERO);
        session.fields = filled_contact();
        session.begin().unwrap();
        session.finish(
            Err(RelayError::Rejected("Invalid access key".to_string())),
            Instant::now(),
        );

        assert_eq!(session.status(), FormStatus::Error);
        assert_eq!(session.fields, filled_contact());
        assert!(session.error().unwrap().contains("Invalid access key"));
        assert!(!session.tick(Instant::now()));

        // Resubmission is a fresh attempt
        session.begin().unwrap();
        assert!(session.error().is_none());
    }

    #[test]
    fn test_refresh() {
        let mut session = FormSession::new(ResumeRequest::default(), Duration::from_secs(60));
        session.fields.email = "x@example.com".to_string();
        session.begin().unwrap();
        session.finish(Err(RelayError::MissingKey), Instant::now());
        session.refresh();
        assert_eq!(session.status(), FormStatus::Idle);
        assert_eq!(session.fields, ResumeRequest::default());
    }
}
