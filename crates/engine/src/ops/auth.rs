use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AuthSession, EngineError, RegisterCmd, ResultEngine, User,
    auth::{hash_password, verify_password},
    revoked_tokens, users,
    util::{normalize_email, normalize_required_text, validate_password_strength},
};

use super::{Engine, with_tx};

/// Name used for identity-provider accounts that do not carry one.
const FALLBACK_NAME: &str = "Listify user";

impl Engine {
    async fn find_user_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await
            .map_err(Into::into)
    }

    async fn insert_user(
        &self,
        db: &DatabaseTransaction,
        name: String,
        email: String,
        password_hash: String,
    ) -> ResultEngine<users::Model> {
        let model = users::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            email: ActiveValue::Set(email),
            password_hash: ActiveValue::Set(password_hash),
            created_at: ActiveValue::Set(Utc::now()),
        };
        model
            .insert(db)
            .await
            .map_err(|err| EngineError::from_insert(err, "email"))
    }

    /// Create an account.
    ///
    /// The email must be unused; the password must pass the strength rule.
    pub async fn register(&self, cmd: RegisterCmd) -> ResultEngine<User> {
        let name = normalize_required_text(&cmd.name, "name", 2)?;
        let email = normalize_email(&cmd.email)?;
        validate_password_strength(&cmd.password)?;
        let password_hash = hash_password(&cmd.password)?;

        with_tx!(self, |db_tx| {
            if self.find_user_by_email(&db_tx, &email).await?.is_some() {
                return Err(EngineError::ExistingKey("email".to_string()));
            }
            let model = self
                .insert_user(&db_tx, name, email, password_hash)
                .await?;
            tracing::info!(user_id = model.id, "registered user");
            Ok(User::from(model))
        })
    }

    /// Check credentials and issue a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<(String, User)> {
        let email = normalize_email(email)?;
        let invalid = || EngineError::Unauthorized("invalid email or password".to_string());

        let user = with_tx!(self, |db_tx| {
            self.find_user_by_email(&db_tx, &email).await
        })?
        .ok_or_else(invalid)?;

        if !verify_password(password, &user.password_hash) {
            return Err(invalid());
        }
        let token = self.tokens.issue(user.id)?;
        Ok((token, User::from(user)))
    }

    /// Log in with a third-party identity token.
    ///
    /// The account is matched by email and created on first use; unverified
    /// emails are rejected.
    pub async fn google_login(&self, id_token: &str) -> ResultEngine<(String, User)> {
        if id_token.trim().is_empty() {
            return Err(EngineError::Validation("id_token is required".to_string()));
        }
        let identity = self.identity.verify(id_token).await?;
        if !identity.email_verified {
            return Err(EngineError::Unauthorized(
                "identity email is not verified".to_string(),
            ));
        }
        let email = normalize_email(&identity.email)
            .map_err(|_| EngineError::Unauthorized("identity email is invalid".to_string()))?;
        let name = identity
            .name
            .as_deref()
            .and_then(|name| normalize_required_text(name, "name", 2).ok())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        let user = with_tx!(self, |db_tx| {
            match self.find_user_by_email(&db_tx, &email).await? {
                Some(user) => Ok::<_, EngineError>(user),
                None => {
                    // Identity-provider accounts get an unusable random password.
                    let password_hash = hash_password(&Uuid::new_v4().to_string())?;
                    let user = self
                        .insert_user(&db_tx, name, email.clone(), password_hash)
                        .await?;
                    tracing::info!(user_id = user.id, "registered user from identity provider");
                    Ok(user)
                }
            }
        })?;

        let token = self.tokens.issue(user.id)?;
        Ok((token, User::from(user)))
    }

    /// Resolve a bearer token into a session.
    ///
    /// Fails with `Unauthorized` when the token is malformed, expired,
    /// revoked or its user no longer exists.
    pub async fn authenticate(&self, token: &str) -> ResultEngine<AuthSession> {
        let claims = self.tokens.verify(token)?;
        let user_id: i32 = claims
            .sub
            .parse()
            .map_err(|_| EngineError::Unauthorized("invalid token subject".to_string()))?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| EngineError::Unauthorized("invalid token expiry".to_string()))?;

        with_tx!(self, |db_tx| {
            let revoked = revoked_tokens::Entity::find_by_id(claims.jti.clone())
                .one(&db_tx)
                .await?
                .is_some();
            if revoked {
                return Err(EngineError::Unauthorized("token revoked".to_string()));
            }
            if users::Entity::find_by_id(user_id).one(&db_tx).await?.is_none() {
                return Err(EngineError::Unauthorized("unknown user".to_string()));
            }
            Ok(AuthSession {
                user_id,
                jti: claims.jti.clone(),
                expires_at,
            })
        })
    }

    /// Return the account behind a session.
    pub async fn me(&self, user_id: i32) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await.map(User::from)
        })
    }

    /// Revoke the session's token; later `authenticate` calls reject it.
    pub async fn logout(&self, session: &AuthSession) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let exists = revoked_tokens::Entity::find_by_id(session.jti.clone())
                .one(&db_tx)
                .await?
                .is_some();
            if !exists {
                revoked_tokens::ActiveModel {
                    jti: ActiveValue::Set(session.jti.clone()),
                    user_id: ActiveValue::Set(session.user_id),
                    revoked_at: ActiveValue::Set(Utc::now()),
                }
                .insert(&db_tx)
                .await?;
            }
            Ok(())
        })
    }
}
