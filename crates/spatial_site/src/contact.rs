//! Contact form
//!
//! Validates the enquiry, posts it to a third-party form relay as flat JSON
//! and shows the outcome for a few seconds before returning to idle. A relay
//! that cannot be reached and one that answers `success: false` look the same
//! to the visitor, and neither surfaces as an error to the caller.

use crate::config::ContactSection;
use crate::error::{FormError, RelayError};
use serde::{Deserialize, Serialize};
use spatial_core::{EventSource, Host, Subscription};
use std::cell::RefCell;
use std::rc::Rc;

/// What the submit button shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
}

impl FormFields {
    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(FormError::MissingField("email"));
        }
        if !self.email.contains('@') {
            return Err(FormError::InvalidEmail);
        }
        if self.message.trim().is_empty() {
            return Err(FormError::MissingField("message"));
        }
        Ok(())
    }
}

/// The JSON body posted to the relay
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelayPayload<'a> {
    pub access_key: &'a str,
    pub subject: String,
    pub from_name: &'a str,
    #[serde(flatten)]
    pub fields: &'a FormFields,
}

impl<'a> RelayPayload<'a> {
    pub fn new(settings: &'a ContactSection, fields: &'a FormFields) -> Self {
        Self {
            access_key: &settings.access_key,
            subject: format!("New Project Inquiry from {}", fields.name),
            from_name: &settings.sender_name,
            fields,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Transport to the form relay
///
/// `post` sends `body` as JSON to `endpoint` and returns the response body.
///
/// It is called synchronously from [`ContactForm::submit`] on the thread that
/// drives the scheduler, so every frame and timer waits for it to return.
/// Implementations must answer promptly: bound any network wait with a short
/// timeout, or hand back a cached or failed result instead of blocking.
/// The form reads [`FormStatus::Loading`] for the duration of the call.
pub trait FormRelay {
    fn post(&self, endpoint: &str, body: &str) -> Result<String, RelayError>;
}

fn read_response(body: &str) -> Result<(), RelayError> {
    let response: RelayResponse =
        serde_json::from_str(body).map_err(|e| RelayError::Malformed(e.to_string()))?;
    if response.success {
        Ok(())
    } else {
        Err(RelayError::Rejected(response.message.unwrap_or_default()))
    }
}

struct FormState {
    fields: FormFields,
    status: FormStatus,
    last_error: Option<RelayError>,
    /// Pending return to idle
    reset: Option<Subscription>,
}

/// A mounted contact form
pub struct ContactForm {
    host: Host,
    settings: ContactSection,
    relay: Rc<dyn FormRelay>,
    state: Rc<RefCell<FormState>>,
    status: Rc<EventSource<FormStatus>>,
}

impl ContactForm {
    pub fn mount(host: &Host, settings: ContactSection, relay: Rc<dyn FormRelay>) -> Self {
        if settings.access_key.is_empty() {
            tracing::warn!("contact relay has no access key; submissions will be rejected");
        }
        Self {
            host: host.clone(),
            settings,
            relay,
            state: Rc::new(RefCell::new(FormState {
                fields: FormFields::default(),
                status: FormStatus::Idle,
                last_error: None,
                reset: None,
            })),
            status: Rc::new(EventSource::new()),
        }
    }

    /// Edit the fields in place
    pub fn edit(&self, f: impl FnOnce(&mut FormFields)) {
        f(&mut self.state.borrow_mut().fields);
    }

    pub fn fields(&self) -> FormFields {
        self.state.borrow().fields.clone()
    }

    pub fn status(&self) -> FormStatus {
        self.state.borrow().status
    }

    pub fn last_error(&self) -> Option<RelayError> {
        self.state.borrow().last_error.clone()
    }

    /// Listen for status changes
    pub fn on_status<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&FormStatus) + 'static,
    {
        self.status.subscribe(listener)
    }

    fn set_status(&self, status: FormStatus) {
        self.state.borrow_mut().status = status;
        self.status.emit(&status);
    }

    /// Send the enquiry
    ///
    /// Invalid fields and a submission already in flight are refused with a
    /// [`FormError`]. Anything that goes wrong after that ends in
    /// [`FormStatus::Error`], returned as `Ok`.
    ///
    /// The relay call completes before this returns, so `Loading` is only
    /// visible to status listeners and to the relay itself. A re-entrant
    /// `submit` from either of them gets [`FormError::Busy`].
    pub fn submit(&self) -> Result<FormStatus, FormError> {
        let fields = {
            let state = self.state.borrow();
            if state.status == FormStatus::Loading {
                return Err(FormError::Busy);
            }
            state.fields.validate()?;
            state.fields.clone()
        };

        // A newer submission owns the reset
        let pending = self.state.borrow_mut().reset.take();
        drop(pending);
        self.set_status(FormStatus::Loading);

        let payload = RelayPayload::new(&self.settings, &fields);
        let outcome = serde_json::to_string(&payload)
            .map_err(|e| RelayError::Malformed(e.to_string()))
            .and_then(|body| self.relay.post(&self.settings.endpoint, &body))
            .and_then(|body| read_response(&body));

        let status = match outcome {
            Ok(()) => {
                tracing::debug!(name = %fields.name, "enquiry sent");
                let mut state = self.state.borrow_mut();
                state.fields = FormFields::default();
                state.last_error = None;
                FormStatus::Success
            }
            Err(err) => {
                tracing::warn!(error = %err, "enquiry failed");
                self.state.borrow_mut().last_error = Some(err);
                FormStatus::Error
            }
        };
        self.set_status(status);
        self.schedule_reset();
        Ok(status)
    }

    fn schedule_reset(&self) {
        let state = Rc::downgrade(&self.state);
        let source = Rc::downgrade(&self.status);
        let reset = self
            .host
            .scheduler
            .scoped_timeout(self.settings.reset_ms, move |_| {
                let (Some(state), Some(source)) = (state.upgrade(), source.upgrade()) else {
                    return;
                };
                state.borrow_mut().status = FormStatus::Idle;
                source.emit(&FormStatus::Idle);
            });
        let previous = self.state.borrow_mut().reset.replace(reset);
        drop(previous);
    }
}

impl std::fmt::Debug for ContactForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactForm")
            .field("status", &self.status())
            .field("endpoint", &self.settings.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spatial_core::{FrameScheduler, Viewport};
    use std::rc::Weak;

    /// Records every body and answers with a canned result
    struct StubRelay {
        bodies: RefCell<Vec<String>>,
        answer: Result<String, RelayError>,
    }

    impl StubRelay {
        fn answering(answer: Result<&str, RelayError>) -> Rc<Self> {
            Rc::new(Self {
                bodies: RefCell::new(Vec::new()),
                answer: answer.map(String::from),
            })
        }
    }

    impl FormRelay for StubRelay {
        fn post(&self, _endpoint: &str, body: &str) -> Result<String, RelayError> {
            self.bodies.borrow_mut().push(body.to_string());
            self.answer.clone()
        }
    }

    fn settings() -> ContactSection {
        ContactSection {
            access_key: "key-123".to_string(),
            ..Default::default()
        }
    }

    fn fill(form: &ContactForm) {
        form.edit(|f| {
            f.name = "Ada".to_string();
            f.email = "ada@example.com".to_string();
            f.message = "Need a GIS pipeline".to_string();
        });
    }

    fn record(form: &ContactForm) -> (Rc<RefCell<Vec<FormStatus>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let sub = form.on_status(move |s| sink.borrow_mut().push(*s));
        (log, sub)
    }

    #[test]
    fn test_network_failure_scenario() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::default()));
        let relay = StubRelay::answering(Err(RelayError::Network("offline".into())));
        let form = ContactForm::mount(&host, settings(), relay);
        fill(&form);
        let (log, _sub) = record(&form);

        assert_eq!(form.status(), FormStatus::Idle);
        assert_eq!(form.submit(), Ok(FormStatus::Error));
        assert_eq!(*log.borrow(), vec![FormStatus::Loading, FormStatus::Error]);
        assert!(matches!(form.last_error(), Some(RelayError::Network(_))));
        // Fields survive a failure
        assert_eq!(form.fields().name, "Ada");

        scheduler.advance(4999.0);
        assert_eq!(form.status(), FormStatus::Error);
        scheduler.advance(1.0);
        assert_eq!(form.status(), FormStatus::Idle);
        assert_eq!(
            *log.borrow(),
            vec![FormStatus::Loading, FormStatus::Error, FormStatus::Idle]
        );
        assert_eq!(scheduler.timer_count(), 0);
    }

    #[test]
    fn test_success_clears_fields() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::default()));
        let relay = StubRelay::answering(Ok(r#"{"success": true, "message": "sent"}"#));
        let form = ContactForm::mount(&host, settings(), Rc::clone(&relay) as Rc<dyn FormRelay>);
        fill(&form);

        assert_eq!(form.submit(), Ok(FormStatus::Success));
        assert_eq!(form.fields(), FormFields::default());

        let body: serde_json::Value = serde_json::from_str(&relay.bodies.borrow()[0]).unwrap();
        assert_eq!(body["access_key"], "key-123");
        assert_eq!(body["subject"], "New Project Inquiry from Ada");
        assert_eq!(body["from_name"], "Spatial Labs Website");
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["company"], "");

        scheduler.advance(5000.0);
        assert_eq!(form.status(), FormStatus::Idle);
    }

    #[test]
    fn test_rejection_and_garbage_are_errors() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::default()));

        for (answer, expected) in [
            (r#"{"success": false, "message": "bad key"}"#, RelayError::Rejected("bad key".into())),
            ("<html>502</html>", RelayError::Malformed(String::new())),
        ] {
            let form = ContactForm::mount(&host, settings(), StubRelay::answering(Ok(answer)));
            fill(&form);
            assert_eq!(form.submit(), Ok(FormStatus::Error));
            let err = form.last_error().unwrap();
            assert_eq!(
                std::mem::discriminant(&err),
                std::mem::discriminant(&expected)
            );
        }
    }

    #[test]
    fn test_validation() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::default()));
        let relay = StubRelay::answering(Ok(r#"{"success": true}"#));
        let form = ContactForm::mount(&host, settings(), Rc::clone(&relay) as Rc<dyn FormRelay>);

        assert_eq!(form.submit(), Err(FormError::MissingField("name")));
        fill(&form);
        form.edit(|f| f.email = "not-an-email".to_string());
        assert_eq!(form.submit(), Err(FormError::InvalidEmail));
        form.edit(|f| {
            f.email = "a@b.co".to_string();
            f.message = "   ".to_string();
        });
        assert_eq!(form.submit(), Err(FormError::MissingField("message")));

        assert!(relay.bodies.borrow().is_empty());
        assert_eq!(form.status(), FormStatus::Idle);
    }

    #[test]
    fn test_submit_while_loading_is_busy() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::default()));
        let relay = StubRelay::answering(Ok(r#"{"success": true}"#));
        let form = Rc::new(ContactForm::mount(&host, settings(), relay));
        fill(&form);

        let reentrant = Rc::new(RefCell::new(None));
        let weak = Rc::downgrade(&form);
        let seen = Rc::clone(&reentrant);
        let _sub = form.on_status(move |status| {
            if *status == FormStatus::Loading {
                if let Some(form) = weak.upgrade() {
                    *seen.borrow_mut() = Some(form.submit());
                }
            }
        });

        assert_eq!(form.submit(), Ok(FormStatus::Success));
        assert_eq!(*reentrant.borrow(), Some(Err(FormError::Busy)));
    }

    /// Records the form status and clock it sees while posting
    struct WatchingRelay {
        host: Host,
        form: RefCell<Weak<ContactForm>>,
        seen: RefCell<Vec<(FormStatus, f64)>>,
    }

    impl FormRelay for WatchingRelay {
        fn post(&self, _endpoint: &str, _body: &str) -> Result<String, RelayError> {
            if let Some(form) = self.form.borrow().upgrade() {
                self.seen.borrow_mut().push((form.status(), self.host.now()));
            }
            Ok(r#"{"success": true}"#.to_string())
        }
    }

    #[test]
    fn test_relay_runs_inside_submit() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::default()));
        scheduler.advance(250.0);
        let relay = Rc::new(WatchingRelay {
            host: host.clone(),
            form: RefCell::new(Weak::new()),
            seen: RefCell::new(Vec::new()),
        });
        let form = Rc::new(ContactForm::mount(&host, settings(), relay.clone()));
        *relay.form.borrow_mut() = Rc::downgrade(&form);
        fill(&form);
        let (log, _sub) = record(&form);

        assert_eq!(form.submit(), Ok(FormStatus::Success));
        assert_eq!(*relay.seen.borrow(), [(FormStatus::Loading, 250.0)]);
        assert_eq!(*log.borrow(), [FormStatus::Loading, FormStatus::Success]);
        assert_eq!(host.now(), 250.0);
        // Only the reset is left pending
        assert_eq!(scheduler.timer_count(), 1);
    }

    #[test]
    fn test_new_submission_owns_reset() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::default()));
        let relay = StubRelay::answering(Err(RelayError::Status(500)));
        let form = ContactForm::mount(&host, settings(), relay);
        fill(&form);

        form.submit().unwrap();
        scheduler.advance(3000.0);
        form.submit().unwrap();
        assert_eq!(scheduler.timer_count(), 1);

        scheduler.advance(2500.0);
        assert_eq!(form.status(), FormStatus::Error);
        scheduler.advance(2500.0);
        assert_eq!(form.status(), FormStatus::Idle);
    }

    #[test]
    fn test_drop_cancels_reset() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::default()));
        let form = ContactForm::mount(
            &host,
            settings(),
            StubRelay::answering(Err(RelayError::Network("down".into()))),
        );
        fill(&form);
        form.submit().unwrap();
        assert_eq!(scheduler.timer_count(), 1);
        drop(form);
        assert_eq!(scheduler.timer_count(), 0);
    }
}
