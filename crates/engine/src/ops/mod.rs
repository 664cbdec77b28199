use std::sync::Arc;

use chrono::Duration;
use sea_orm::DatabaseConnection;

use crate::{DisabledIdentityVerifier, IdentityVerifier, ResultEngine, TokenKeys};

mod access;
mod auth;
mod history;
mod lists;
mod products;
mod purchases;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Default bearer token lifetime.
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

pub struct Engine {
    database: DatabaseConnection,
    tokens: TokenKeys,
    identity: Arc<dyn IdentityVerifier>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    tokens: Option<TokenKeys>,
    identity: Option<Arc<dyn IdentityVerifier>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Keys used to sign and verify bearer tokens.
    pub fn tokens(mut self, tokens: TokenKeys) -> EngineBuilder {
        self.tokens = Some(tokens);
        self
    }

    /// Verifier for third-party identity tokens (Google login).
    pub fn identity_verifier(mut self, verifier: Arc<dyn IdentityVerifier>) -> EngineBuilder {
        self.identity = Some(verifier);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let tokens = match self.tokens {
            Some(tokens) => tokens,
            None => {
                tracing::warn!("no token keys configured, using an ephemeral secret");
                let secret = uuid::Uuid::new_v4();
                TokenKeys::from_secret(
                    secret.as_bytes(),
                    Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
                )
            }
        };
        Ok(Engine {
            database: self.database,
            tokens,
            identity: self
                .identity
                .unwrap_or_else(|| Arc::new(DisabledIdentityVerifier)),
        })
    }
}
