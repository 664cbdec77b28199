#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    AddPurchaseItemCmd, Engine, EngineError, IdentityVerifier, MoneyCents, NewProductCmd,
    RegisterCmd, TokenKeys, User, VerifiedIdentity,
};
use migration::MigratorTrait;

pub const PASSWORD: &str = "Secret123";

pub fn test_keys() -> TokenKeys {
    TokenKeys::from_secret(b"engine-test-secret", Duration::hours(1))
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_verifier(None).await
}

pub async fn engine_with_verifier(
    verifier: Option<Arc<dyn IdentityVerifier>>,
) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let mut builder = Engine::builder().database(db.clone()).tokens(test_keys());
    if let Some(verifier) = verifier {
        builder = builder.identity_verifier(verifier);
    }
    let engine = builder.build().await.unwrap();
    (engine, db)
}

pub async fn register(engine: &Engine, name: &str, email: &str) -> User {
    engine
        .register(RegisterCmd {
            name: name.to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap()
}

pub async fn product(engine: &Engine, barcode: &str, name: &str) -> i32 {
    engine
        .new_product(NewProductCmd::new(barcode, name).brand("Acme"))
        .await
        .unwrap()
        .id
}

pub fn item(
    user_id: i32,
    purchase_id: i32,
    product_id: i32,
    cents: i64,
    quantity: i64,
) -> AddPurchaseItemCmd {
    AddPurchaseItemCmd {
        purchase_id,
        product_id,
        unit_price: MoneyCents::new(cents),
        quantity,
        user_id,
    }
}

/// Verifier returning a fixed identity for any token.
pub struct FixedIdentity(pub VerifiedIdentity);

#[async_trait]
impl IdentityVerifier for FixedIdentity {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, EngineError> {
        if id_token == "bad-token" {
            return Err(EngineError::Unauthorized("invalid identity token".to_string()));
        }
        Ok(self.0.clone())
    }
}
