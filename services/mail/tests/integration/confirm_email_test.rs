use std::time::Duration;

use postbox_mail::error::MailServiceError;
use postbox_mail::usecase::confirm_email::{ConfirmEmailInput, ConfirmEmailUseCase};

use crate::helpers::{TEST_TTL, test_registry};

fn input(email: &str, code: &str) -> ConfirmEmailInput {
    ConfirmEmailInput {
        email: Some(email.to_owned()),
        code: Some(code.to_owned()),
    }
}

#[tokio::test(start_paused = true)]
async fn should_confirm_issued_code_once() {
    let registry = test_registry();
    let code = registry.issue("a@x.com");
    let uc = ConfirmEmailUseCase { registry };

    uc.execute(input("a@x.com", &code)).unwrap();
    let again = uc.execute(input("a@x.com", &code));
    assert!(
        matches!(again, Err(MailServiceError::ConfirmationCodeNotFound)),
        "expected ConfirmationCodeNotFound, got {again:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn should_normalize_header_email() {
    let registry = test_registry();
    let code = registry.issue("a@x.com");
    let uc = ConfirmEmailUseCase { registry };
    uc.execute(input(" A@X.com", &code)).unwrap();
}

#[tokio::test(start_paused = true)]
async fn wrong_code_is_mismatch() {
    let registry = test_registry();
    let code = registry.issue("a@x.com");
    let wrong = if code == "ZZZZZZ" { "YYYYYY" } else { "ZZZZZZ" };
    let uc = ConfirmEmailUseCase { registry };

    let result = uc.execute(input("a@x.com", wrong));
    assert!(
        matches!(result, Err(MailServiceError::ConfirmationCodeMismatch)),
        "expected ConfirmationCodeMismatch, got {result:?}"
    );
    uc.execute(input("a@x.com", &code)).unwrap();
}

#[tokio::test(start_paused = true)]
async fn expired_code_is_not_found() {
    let registry = test_registry();
    let code = registry.issue("a@x.com");
    let uc = ConfirmEmailUseCase { registry };

    tokio::time::sleep(TEST_TTL + Duration::from_secs(1)).await;
    let result = uc.execute(input("a@x.com", &code));
    assert!(
        matches!(result, Err(MailServiceError::ConfirmationCodeNotFound)),
        "expected ConfirmationCodeNotFound, got {result:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn should_require_email_before_code() {
    let uc = ConfirmEmailUseCase {
        registry: test_registry(),
    };

    let result = uc.execute(ConfirmEmailInput {
        email: None,
        code: None,
    });
    assert!(matches!(result, Err(MailServiceError::MissingField("email"))));

    let result = uc.execute(ConfirmEmailInput {
        email: Some("a@x.com".to_owned()),
        code: None,
    });
    assert!(matches!(result, Err(MailServiceError::MissingField("code"))));
}
