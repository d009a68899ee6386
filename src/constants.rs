use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const MAX_NAME_LENGTH: u64 = 100;
pub const MAX_EMAIL_LENGTH: u64 = 254;
pub const MAX_TREATMENT_LENGTH: u64 = 60;
pub const MAX_NOTES_LENGTH: u64 = 2000;
pub const MAX_COMPANY_LENGTH: u64 = 120;

/// Largest request body read for a submission. Any body past this cannot
/// hold fields that fit the limits above.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Requests accepted per client key inside one window.
pub const RATE_LIMIT_MAX: u32 = 5;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Shared by every request that carries no forwarding header.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub const FALLBACK_SENDER: &str = "Shvitz <onboarding@resend.dev>";
pub const EMAIL_SUBJECT: &str = "New Shvitz availability request";
pub const TREATMENT_PLACEHOLDER: &str = "Not specified";
pub const NOTES_PLACEHOLDER: &str = "Not provided";

pub const CONTACT_PATH: &str = "/api/contact";
