//! Google ID token verification through the `tokeninfo` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use engine::{EngineError, IdentityVerifier, VerifiedIdentity};
use serde::Deserialize;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// `email_verified` comes back as `"true"` from tokeninfo, but as a JSON
/// boolean from some proxies.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn is_true(&self) -> bool {
        match self {
            Flag::Bool(value) => *value,
            Flag::Text(value) => value.eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    email: Option<String>,
    email_verified: Option<Flag>,
    name: Option<String>,
}

fn rejected(reason: &str) -> EngineError {
    tracing::warn!("google token rejected: {reason}");
    EngineError::Unauthorized("invalid google token".to_string())
}

fn identity_from(info: TokenInfo, client_id: Option<&str>) -> Result<VerifiedIdentity, EngineError> {
    if let Some(expected) = client_id
        && info.aud.as_deref() != Some(expected)
    {
        return Err(rejected("audience mismatch"));
    }
    let email = info
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| rejected("missing email"))?;
    Ok(VerifiedIdentity {
        email,
        email_verified: info.email_verified.as_ref().is_some_and(Flag::is_true),
        name: info.name,
    })
}

/// Verifies Google ID tokens. Any failure is reported as unauthorized.
#[derive(Clone, Debug)]
pub struct GoogleVerifier {
    client: reqwest::Client,
    endpoint: String,
    client_id: Option<String>,
}

impl GoogleVerifier {
    /// `client_id`, when set, must match the token audience.
    pub fn new(client_id: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: TOKENINFO_URL.to_string(),
            client_id,
        })
    }

    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, EngineError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|err| rejected(&format!("request failed: {err}")))?;
        if !response.status().is_success() {
            return Err(rejected(&format!("status {}", response.status())));
        }
        let info: TokenInfo = response
            .json()
            .await
            .map_err(|err| rejected(&format!("malformed body: {err}")))?;
        identity_from(info, self.client_id.as_deref())
    }
}
