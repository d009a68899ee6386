use async_trait::async_trait;
use mockall::mock;
use serde_json::json;
use shvitz_contact::{
    constants::{RATE_LIMIT_MAX, RATE_LIMIT_WINDOW},
    entities::email::{DispatchOutcome, OutgoingEmail},
    errors::{AppError, ValidationFailure},
    limiter::{clock::ManualClock, rate_limiter::FixedWindowLimiter},
    repositories::{
        mailer::Mailer,
        rate_limit::{RateDecision, RateLimiter},
    },
    use_cases::contact::{ContactAccepted, ContactHandler, DeliverySettings},
};
use std::{sync::Arc, time::Duration};

mock! {
    pub Mailer {}

    #[async_trait]
    impl Mailer for Mailer {
        async fn send(&self, email: &OutgoingEmail) -> DispatchOutcome;
    }
}

mock! {
    pub Limiter {}

    impl RateLimiter for Limiter {
        fn check(&self, key: &str) -> RateDecision;
    }
}

fn delivery() -> DeliverySettings {
    DeliverySettings {
        recipient: Some("desk@shvitz.example".into()),
        sender: "Shvitz <onboarding@resend.dev>".into(),
        expose_message_id: true,
    }
}

fn limiter() -> (FixedWindowLimiter, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let limiter = FixedWindowLimiter::with_clock(RATE_LIMIT_MAX, RATE_LIMIT_WINDOW, clock.clone());
    (limiter, clock)
}

fn handler(mailer: MockMailer) -> ContactHandler<MockMailer, FixedWindowLimiter> {
    ContactHandler::new(Some(mailer), limiter().0, delivery())
}

fn never_called() -> MockMailer {
    let mut mailer = MockMailer::new();
    mailer.expect_send().never();
    mailer
}

fn sends_ok() -> MockMailer {
    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .returning(|_| DispatchOutcome::Sent { id: Some("email_1".into()) });
    mailer
}

fn body(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

#[tokio::test]
async fn valid_payload_is_dispatched_once_with_reply_to() {
    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .withf(|email| {
            email.reply_to == "jane@example.com"
                && email.to == vec!["desk@shvitz.example".to_string()]
                && email.from == "Shvitz <onboarding@resend.dev>"
        })
        .times(1)
        .returning(|_| DispatchOutcome::Sent { id: Some("email_1".into()) });

    let result = handler(mailer)
        .submit(
            "198.51.100.1",
            &body(json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "treatment": "Day pass",
                "notes": "",
                "company_field": ""
            })),
        )
        .await;

    assert_eq!(
        result.unwrap(),
        ContactAccepted { ok: true, id: Some("email_1".into()) }
    );
}

#[tokio::test]
async fn bad_identity_never_reaches_the_mailer() {
    let handler = handler(never_called());

    for (name, email) in [
        ("", "jane@example.com"),
        ("  ", "jane@example.com"),
        ("Jane", ""),
        ("Jane", "not-an-email"),
        ("Jane", "jane@ example.com"),
        ("Jane", "jane@localhost"),
    ] {
        let result = handler
            .submit(name, &body(json!({ "name": name, "email": email })))
            .await;
        assert!(
            matches!(result, Err(AppError::Validation(ValidationFailure::MissingIdentity))),
            "name={name:?} email={email:?}"
        );
    }

    let result = handler.submit("k", b"not json at all").await;
    assert!(matches!(result, Err(AppError::Validation(ValidationFailure::MissingIdentity))));
}

#[tokio::test]
async fn each_oversized_field_asks_to_shorten() {
    let cases = [
        ("name", "n".repeat(101)),
        ("email", format!("{}@example.com", "e".repeat(243))),
        ("treatment", "t".repeat(61)),
        ("notes", "n".repeat(2001)),
    ];

    for (field, value) in cases {
        let mut payload = json!({ "name": "Jane", "email": "jane@example.com" });
        payload[field] = json!(value);

        let result = handler(never_called()).submit("k", &body(payload)).await;
        assert!(
            matches!(result, Err(AppError::Validation(ValidationFailure::TooLong))),
            "field {field}"
        );
    }

    let payload = json!({ "name": "Jane", "email": "jane@example.com", "company_field": "c".repeat(121) });
    let result = handler(never_called()).submit("k", &body(payload)).await;
    assert!(matches!(result, Err(AppError::Validation(ValidationFailure::TooLong))));
}

#[tokio::test]
async fn honeypot_never_reaches_the_mailer() {
    let accepted = [
        json!({ "name": "Jane", "email": "jane@example.com", "company_field": "AcmeCorp" }),
        json!({ "name": "Jane", "email": "jane@example.com", "company": "AcmeCorp" }),
    ];
    for payload in accepted {
        let result = handler(never_called()).submit("k", &body(payload.clone())).await;
        assert_eq!(result.unwrap(), ContactAccepted { ok: true, id: None }, "{payload}");
    }

    // Field validation still runs first, so these get the same 400 as a person would.
    let rejected = [
        (
            json!({ "name": "", "email": "jane@example.com", "company_field": "AcmeCorp" }),
            ValidationFailure::MissingIdentity,
        ),
        (
            json!({ "name": "Jane", "email": "nope", "company_field": "AcmeCorp" }),
            ValidationFailure::MissingIdentity,
        ),
        (
            json!({ "name": "Jane", "email": "jane@example.com", "notes": "n".repeat(3000), "company_field": "AcmeCorp" }),
            ValidationFailure::TooLong,
        ),
    ];
    for (payload, expected) in rejected {
        let result = handler(never_called()).submit("k", &body(payload.clone())).await;
        match result {
            Err(AppError::Validation(failure)) => assert_eq!(failure, expected, "{payload}"),
            other => panic!("expected validation error for {payload}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn admission_counts_before_delivery() {
    let (limiter, _clock) = limiter();
    let handler = ContactHandler::new(Some(never_called()), limiter, delivery());

    for _ in 0..RATE_LIMIT_MAX {
        assert!(handler.admit("203.0.113.30").is_ok());
    }
    assert!(matches!(
        handler.admit("203.0.113.30"),
        Err(AppError::RateLimited { .. })
    ));

    let result = handler
        .deliver("203.0.113.30", &body(json!({ "name": "", "email": "jane@example.com" })))
        .await;
    assert!(matches!(result, Err(AppError::Validation(ValidationFailure::MissingIdentity))));
}

#[tokio::test]
async fn configuration_is_checked_before_anything_else() {
    let mut untouched = MockLimiter::new();
    untouched.expect_check().never();

    let no_recipient = ContactHandler::new(
        Some(never_called()),
        untouched,
        DeliverySettings { recipient: Some("  ".into()), ..delivery() },
    );
    let result = no_recipient.submit("k", b"{}").await;
    assert!(matches!(result, Err(AppError::NotConfigured)));
    assert!(!no_recipient.is_configured());

    let no_mailer: ContactHandler<MockMailer, FixedWindowLimiter> =
        ContactHandler::new(None, limiter().0, delivery());
    assert!(matches!(no_mailer.submit("k", b"{}").await, Err(AppError::NotConfigured)));
}

#[tokio::test]
async fn rate_limit_is_checked_before_the_payload() {
    let mut denying = MockLimiter::new();
    denying
        .expect_check()
        .withf(|key| key == "203.0.113.5")
        .times(1)
        .returning(|_| RateDecision::Denied { retry_after: Duration::from_millis(300) });

    let handler = ContactHandler::new(Some(never_called()), denying, delivery());
    let result = handler.submit("203.0.113.5", b"garbage").await;

    assert!(matches!(result, Err(AppError::RateLimited { retry_after_secs: 1 })));
}

#[tokio::test]
async fn window_expiry_restores_a_fresh_count() {
    let (limiter, clock) = limiter();
    let handler = ContactHandler::new(Some(sends_ok()), limiter, delivery());
    let payload = body(json!({ "name": "Jane", "email": "jane@example.com" }));

    for _ in 0..5 {
        assert!(handler.submit("203.0.113.9", &payload).await.is_ok());
    }
    assert!(matches!(
        handler.submit("203.0.113.9", &payload).await,
        Err(AppError::RateLimited { .. })
    ));

    clock.advance(RATE_LIMIT_WINDOW);
    for _ in 0..5 {
        assert!(handler.submit("203.0.113.9", &payload).await.is_ok());
    }
    assert!(matches!(
        handler.submit("203.0.113.9", &payload).await,
        Err(AppError::RateLimited { .. })
    ));
}

#[tokio::test]
async fn rejection_reason_is_embedded_or_defaults() {
    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .times(1)
        .returning(|_| DispatchOutcome::Rejected { reason: Some("Resend rejected the request.".into()) });
    let result = handler(mailer)
        .submit("k", &body(json!({ "name": "Jane", "email": "jane@example.com" })))
        .await;
    match result {
        Err(e @ AppError::Dispatch(_)) => {
            assert_eq!(e.to_string(), "Unable to send your request: Resend rejected the request.")
        }
        other => panic!("expected dispatch error, got {other:?}"),
    }

    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .times(1)
        .returning(|_| DispatchOutcome::Rejected { reason: None });
    let result = handler(mailer)
        .submit("k", &body(json!({ "name": "Jane", "email": "jane@example.com" })))
        .await;
    assert_eq!(result.unwrap_err().to_string(), "Unable to send your request: Unknown error");
}

#[tokio::test]
async fn message_id_is_withheld_when_not_exposed() {
    let handler = ContactHandler::new(
        Some(sends_ok()),
        limiter().0,
        DeliverySettings { expose_message_id: false, ..delivery() },
    );

    let result = handler
        .submit("k", &body(json!({ "name": "Jane", "email": "jane@example.com" })))
        .await;

    assert_eq!(result.unwrap(), ContactAccepted { ok: true, id: None });
}
