use serde::Serialize;
use tokio::sync::watch;

use crate::{
    entities::contact::ContactRequest,
    repositories::contact_transport::ContactTransport,
};

pub const LOCAL_VALIDATION_MESSAGE: &str = "Please enter your name and a valid email address.";
pub const SUCCESS_MESSAGE: &str = "Thanks! We will reach out shortly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    Idle,
    Sending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub status: FormStatus,
    pub message: String,
}

impl FormState {
    fn new(status: FormStatus, message: impl Into<String>) -> Self {
        FormState { status, message: message.into() }
    }

    pub fn idle() -> Self {
        Self::new(FormStatus::Idle, "")
    }
}

/// Values currently typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFormFields {
    pub name: String,
    pub email: String,
    pub treatment: String,
    pub notes: String,
    pub company_field: String,
}

impl ContactFormFields {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn to_request(&self) -> ContactRequest {
        ContactRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            treatment: self.treatment.trim().to_string(),
            notes: self.notes.trim().to_string(),
            company_field: self.company_field.trim().to_string(),
        }
    }
}

/// Phone and email offered when a submission fails.
#[derive(Debug, Clone)]
pub struct ContactFallback {
    pub phone: String,
    pub email: String,
}

/// Drives the contact form: local validation, one request per submit,
/// and the resulting `FormState`. Every state change is published on a
/// watch channel so a view can disable its submit button while sending.
pub struct ContactFormController<T>
where
    T: ContactTransport,
{
    transport: T,
    fallback: ContactFallback,
    state: watch::Sender<FormState>,
}

impl<T> ContactFormController<T>
where
    T: ContactTransport,
{
    pub fn new(transport: T, fallback: ContactFallback) -> Self {
        let (state, _) = watch::channel(FormState::idle());
        ContactFormController { transport, fallback, state }
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn can_submit(&self) -> bool {
        self.state.borrow().status != FormStatus::Sending
    }

    /// Closes the success or error popup.
    pub fn dismiss(&self) {
        self.state.send_if_modified(|current| {
            if matches!(current.status, FormStatus::Success | FormStatus::Error) {
                *current = FormState::idle();
                true
            } else {
                false
            }
        });
    }

    fn set(&self, status: FormStatus, message: impl Into<String>) {
        self.state.send_replace(FormState::new(status, message));
    }

    /// Submits the form. Never fails: every outcome lands in the state.
    pub async fn submit(&self, fields: &mut ContactFormFields) {
        if !self.can_submit() {
            tracing::debug!("Submission already in flight, ignoring submit");
            return;
        }

        let request = fields.to_request();

        // The honeypot is the server's business.
        let local = ContactRequest {
            company_field: String::new(),
            ..request.clone()
        };
        if local.validated().is_err() {
            self.set(FormStatus::Error, LOCAL_VALIDATION_MESSAGE);
            return;
        }

        // Claim the in-flight slot in one step so concurrent submits on a
        // shared controller cannot both pass.
        let claimed = self.state.send_if_modified(|current| {
            if current.status == FormStatus::Sending {
                false
            } else {
                *current = FormState::new(FormStatus::Sending, "");
                true
            }
        });
        if !claimed {
            tracing::debug!("Submission already in flight, ignoring submit");
            return;
        }

        let detail = match self.transport.post_contact(&request).await {
            Ok(response) if response.is_success() => {
                self.set(FormStatus::Success, SUCCESS_MESSAGE);
                fields.reset();
                return;
            }
            Ok(response) => {
                let detail = response
                    .error_message()
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Server error ({}). Please try again.", response.status));
                tracing::error!(status = response.status, body = %response.body, "Contact form error: {}", detail);
                detail
            }
            Err(e) => {
                tracing::error!("Contact form submission failed: {}", e);
                e.to_string()
            }
        };

        self.set(
            FormStatus::Error,
            format!(
                "Error: {}. Please call {} or email {}.",
                detail, self.fallback.phone, self.fallback.email
            ),
        );
    }
}
