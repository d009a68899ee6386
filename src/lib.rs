use std::time::Duration;

use anyhow::Context;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{email, http_client, limiter, utils};

use email::resend::ResendMailer;
use limiter::rate_limiter::FixedWindowLimiter;
use settings::{AppConfig, AppEnvironment};
use use_cases::contact::{ContactHandler, DeliverySettings};

pub struct AppState {
    pub contact_handler: AppContactHandler,
    pub environment: AppEnvironment,
}

pub type AppContactHandler = ContactHandler<ResendMailer, FixedWindowLimiter>;

impl AppState {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        Self::with_limiter(config, FixedWindowLimiter::default())
    }

    /// Builds the state around an existing limiter, so the caller can keep
    /// a handle for purging or drive it with its own clock.
    pub fn with_limiter(config: &AppConfig, limiter: FixedWindowLimiter) -> anyhow::Result<Self> {
        let mailer = match config.api_key_secret() {
            Some(api_key) => {
                let client = reqwest::Client::builder()
                    .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
                    .connect_timeout(Duration::from_secs(10))
                    .build()
                    .context("Failed to build HTTP client")?;
                let base = config.resend_api_base().context("Invalid Resend API URL")?;
                Some(ResendMailer::new(client, api_key, &base).context("Invalid Resend API URL")?)
            }
            None => None,
        };

        let delivery = DeliverySettings {
            recipient: config.contact_to.clone(),
            sender: config.sender_address(),
            expose_message_id: !config.is_production(),
        };

        Ok(AppState {
            contact_handler: ContactHandler::new(mailer, limiter, delivery),
            environment: config.env.clone(),
        })
    }
}
