pub mod contact_transport;
pub mod mailer;
pub mod rate_limit;
