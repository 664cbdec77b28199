mod common;

use std::sync::Arc;

use chrono::Duration;

use engine::{EngineError, NewProductCmd, RegisterCmd, TokenKeys, VerifiedIdentity};

use common::{FixedIdentity, PASSWORD, engine_with_db, engine_with_verifier, register};

#[tokio::test]
async fn register_then_login() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "  Ana Souza ", "Ana@Example.com").await;
    assert_eq!(user.name, "Ana Souza");
    assert_eq!(user.email, "ana@example.com");

    let (token, logged) = engine.login("ana@example.com", PASSWORD).await.unwrap();
    assert_eq!(logged, user);

    let session = engine.authenticate(&token).await.unwrap();
    assert_eq!(session.user_id, user.id);
    assert_eq!(engine.me(session.user_id).await.unwrap(), user);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let (engine, _db) = engine_with_db().await;
    register(&engine, "Ana", "ana@example.com").await;
    let err = engine
        .register(RegisterCmd {
            name: "Other Ana".to_string(),
            email: "ANA@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn weak_password_is_a_business_rule_violation() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .register(RegisterCmd {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "weakpass".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BusinessRule(_)));

    let err = engine
        .register(RegisterCmd {
            name: "A".to_string(),
            email: "ana@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() {
    let (engine, _db) = engine_with_db().await;
    register(&engine, "Ana", "ana@example.com").await;

    let expected = EngineError::Unauthorized("invalid email or password".to_string());
    assert_eq!(
        engine
            .login("ana@example.com", "Wrong1234")
            .await
            .unwrap_err(),
        expected
    );
    assert_eq!(
        engine
            .login("nobody@example.com", PASSWORD)
            .await
            .unwrap_err(),
        expected
    );
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let (engine, _db) = engine_with_db().await;
    register(&engine, "Ana", "ana@example.com").await;
    let (token, _) = engine.login("ana@example.com", PASSWORD).await.unwrap();
    let (other, _) = engine.login("ana@example.com", PASSWORD).await.unwrap();

    let session = engine.authenticate(&token).await.unwrap();
    engine.logout(&session).await.unwrap();
    engine.logout(&session).await.unwrap();

    assert_eq!(
        engine.authenticate(&token).await.unwrap_err(),
        EngineError::Unauthorized("token revoked".to_string())
    );
    assert!(engine.authenticate(&other).await.is_ok());
}

#[tokio::test]
async fn foreign_and_expired_tokens_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "Ana", "ana@example.com").await;

    let foreign = TokenKeys::from_secret(b"another-secret", Duration::hours(1))
        .issue(user.id)
        .unwrap();
    assert!(matches!(
        engine.authenticate(&foreign).await,
        Err(EngineError::Unauthorized(_))
    ));

    let expired = TokenKeys::from_secret(b"engine-test-secret", Duration::hours(-1))
        .issue(user.id)
        .unwrap();
    assert!(matches!(
        engine.authenticate(&expired).await,
        Err(EngineError::Unauthorized(_))
    ));

    assert!(matches!(
        engine.authenticate("not-a-token").await,
        Err(EngineError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn identity_login_creates_the_account_once() {
    let verifier = FixedIdentity(VerifiedIdentity {
        email: "Gabi@Example.com".to_string(),
        email_verified: true,
        name: Some("Gabi".to_string()),
    });
    let (engine, _db) = engine_with_verifier(Some(Arc::new(verifier))).await;

    let (token, first) = engine.google_login("good-token").await.unwrap();
    assert_eq!(first.email, "gabi@example.com");
    assert_eq!(first.name, "Gabi");
    assert_eq!(engine.authenticate(&token).await.unwrap().user_id, first.id);

    let (_, second) = engine.google_login("good-token").await.unwrap();
    assert_eq!(second.id, first.id);

    assert!(matches!(
        engine.google_login("bad-token").await,
        Err(EngineError::Unauthorized(_))
    ));
    assert!(matches!(
        engine.google_login("   ").await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn identity_login_requires_a_verified_email() {
    let verifier = FixedIdentity(VerifiedIdentity {
        email: "gabi@example.com".to_string(),
        email_verified: false,
        name: None,
    });
    let (engine, _db) = engine_with_verifier(Some(Arc::new(verifier))).await;
    assert!(matches!(
        engine.google_login("good-token").await,
        Err(EngineError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn identity_login_is_disabled_by_default() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        engine.google_login("good-token").await,
        Err(EngineError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn barcodes_are_unique() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .new_product(NewProductCmd::new(" 7891000 ", "Milk").brand("  "))
        .await
        .unwrap();
    assert_eq!(created.barcode, "7891000");
    assert_eq!(created.brand, None);

    assert_eq!(
        engine.product_by_barcode("7891000").await.unwrap(),
        created
    );
    assert!(matches!(
        engine
            .new_product(NewProductCmd::new("7891000", "Other milk"))
            .await,
        Err(EngineError::ExistingKey(_))
    ));
    assert!(matches!(
        engine.product_by_barcode("0000").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.new_product(NewProductCmd::new("123", " ")).await,
        Err(EngineError::Validation(_))
    ));
}
