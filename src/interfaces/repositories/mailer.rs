use async_trait::async_trait;

use crate::entities::email::{DispatchOutcome, OutgoingEmail};

/// Transactional email provider. Failures come back as
/// [`DispatchOutcome::Rejected`], never as a panic or an `Err`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> DispatchOutcome;
}
