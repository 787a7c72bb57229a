use postbox_mail::domain::types::ConfirmOutcome;
use postbox_mail::error::MailServiceError;
use postbox_mail::usecase::send_email::{SendEmailInput, SendEmailUseCase};

use crate::helpers::{MockFailure, MockMailSender, test_registry};

fn input(to: &str, subject: &str, body: &str) -> SendEmailInput {
    SendEmailInput {
        to: Some(to.to_owned()),
        subject: Some(subject.to_owned()),
        body: Some(body.to_owned()),
    }
}

#[tokio::test]
async fn should_embed_and_register_code_for_confirm_subject() {
    let mailer = MockMailSender::new();
    let sent = mailer.sent_handle();
    let registry = test_registry();

    let uc = SendEmailUseCase {
        mailer,
        registry: registry.clone(),
    };
    let output = uc
        .execute(input("a@x.com", "Confirm", "Your code:"))
        .await
        .unwrap();

    let code = output.confirmation_code.expect("confirm mail should return a code");
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1, "expected exactly one message to be sent");
    assert_eq!(sent[0].to, "a@x.com");
    assert_eq!(sent[0].subject, "Confirm");
    assert_eq!(sent[0].body, format!("Your code: {code}"));
    assert_eq!(registry.validate("a@x.com", &code), Ok(ConfirmOutcome::Confirmed));
}

#[tokio::test]
async fn should_send_plain_mail_without_code() {
    let mailer = MockMailSender::new();
    let sent = mailer.sent_handle();
    let registry = test_registry();

    let uc = SendEmailUseCase {
        mailer,
        registry: registry.clone(),
    };
    let output = uc
        .execute(input("a@x.com", "Welcome", "Hello there"))
        .await
        .unwrap();

    assert!(output.confirmation_code.is_none());
    assert_eq!(sent.lock().unwrap()[0].body, "Hello there");
    assert!(registry.is_empty(), "non-confirm mail must not issue a code");
}

#[tokio::test]
async fn subject_match_is_exact() {
    let registry = test_registry();
    let uc = SendEmailUseCase {
        mailer: MockMailSender::new(),
        registry: registry.clone(),
    };
    let output = uc.execute(input("a@x.com", "confirm", "x")).await.unwrap();
    assert!(output.confirmation_code.is_none());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn should_key_code_by_normalized_recipient() {
    let registry = test_registry();
    let uc = SendEmailUseCase {
        mailer: MockMailSender::new(),
        registry: registry.clone(),
    };
    let code = uc
        .execute(input("  Alice@Example.COM ", "Confirm", "Code:"))
        .await
        .unwrap()
        .confirmation_code
        .unwrap();
    assert_eq!(
        registry.validate("alice@example.com", &code),
        Ok(ConfirmOutcome::Confirmed)
    );
}

#[tokio::test]
async fn should_reject_missing_fields() {
    let uc = SendEmailUseCase {
        mailer: MockMailSender::new(),
        registry: test_registry(),
    };

    let cases = [
        (None, Some("Confirm"), Some("b"), "to"),
        (Some("a@x.com"), None, Some("b"), "subject"),
        (Some("a@x.com"), Some("Confirm"), Some("  "), "body"),
    ];
    for (to, subject, body, field) in cases {
        let result = uc
            .execute(SendEmailInput {
                to: to.map(str::to_owned),
                subject: subject.map(str::to_owned),
                body: body.map(str::to_owned),
            })
            .await;
        assert!(
            matches!(result, Err(MailServiceError::MissingField(f)) if f == field),
            "expected MissingField({field}), got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_map_expired_authorization() {
    let uc = SendEmailUseCase {
        mailer: MockMailSender::failing(MockFailure::AuthorizationExpired),
        registry: test_registry(),
    };
    let result = uc.execute(input("a@x.com", "Confirm", "Code:")).await;
    assert!(
        matches!(result, Err(MailServiceError::ReauthorizationRequired)),
        "expected ReauthorizationRequired, got {result:?}"
    );
}

#[tokio::test]
async fn should_map_transport_failure() {
    let uc = SendEmailUseCase {
        mailer: MockMailSender::failing(MockFailure::Transport),
        registry: test_registry(),
    };
    let result = uc.execute(input("a@x.com", "Welcome", "Hi")).await;
    assert!(
        matches!(result, Err(MailServiceError::DeliveryFailed(_))),
        "expected DeliveryFailed, got {result:?}"
    );
}
