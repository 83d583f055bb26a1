//! Contact form state.
//!
//! ```text
//! Idle ──submit──▶ Sending ──ok──▶ Success(msg)   fields cleared
//!                     └────err──▶ Error(msg)     fields kept for a retry
//! ```
//!
//! A submission is split into [`ContactForm::begin_submit`] and
//! [`ContactForm::finish_submit`] so a host can run the request elsewhere;
//! [`ContactForm::submit`] does both in one call.

use crate::api::{ApiError, ContentApi};
use crate::types::{ContactMessage, ContactReceipt};
use tracing::{info, warn};

pub const SUCCESS_KEY: &str = "contact.success";
pub const ERROR_DEFAULT_KEY: &str = "contact.error_default";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContactStatus {
    #[default]
    Idle,
    Sending,
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    status: ContactStatus,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &ContactStatus {
        &self.status
    }

    pub fn is_sending(&self) -> bool {
        self.status == ContactStatus::Sending
    }

    /// Enter `Sending` and return the payload to post, or `None` when a
    /// submission is already in flight.
    pub fn begin_submit(&mut self) -> Option<ContactMessage> {
        if self.is_sending() {
            return None;
        }
        self.status = ContactStatus::Sending;
        Some(ContactMessage {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }

    pub fn finish_submit<T>(&mut self, result: Result<ContactReceipt, ApiError>, t: &T)
    where
        T: Fn(&str, Option<&str>) -> String,
    {
        match result {
            Ok(receipt) => {
                info!(id = receipt.id, "contact message sent");
                self.name.clear();
                self.email.clear();
                self.message.clear();
                self.status = ContactStatus::Success(t(
                    SUCCESS_KEY,
                    Some("Thank you! Your message has been sent."),
                ));
            }
            Err(err) => {
                warn!("contact message failed: {err}");
                let message = match err.detail() {
                    Some(detail) => detail.to_string(),
                    None => t(
                        ERROR_DEFAULT_KEY,
                        Some("Something went wrong. Please try again."),
                    ),
                };
                self.status = ContactStatus::Error(message);
            }
        }
    }

    pub fn submit<T>(&mut self, api: &impl ContentApi, t: &T) -> &ContactStatus
    where
        T: Fn(&str, Option<&str>) -> String,
    {
        if let Some(message) = self.begin_submit() {
            let result = api.send_contact(&message);
            self.finish_submit(result, t);
        }
        &self.status
    }
}
