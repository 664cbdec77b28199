//! Account and session endpoints

use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{AuthSession, RegisterCmd};

use crate::{
    ServerError,
    extract::Payload,
    server::ServerState,
    types::{
        Message,
        auth::{GoogleLogin, Login, Register, TokenResponse, UserSummary},
    },
};

pub async fn register(
    State(state): State<ServerState>,
    Payload(payload): Payload<Register>,
) -> Result<(StatusCode, Json<UserSummary>), ServerError> {
    let user = state
        .engine
        .register(RegisterCmd {
            name: payload.nome,
            email: payload.email,
            password: payload.senha,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<ServerState>,
    Payload(payload): Payload<Login>,
) -> Result<Json<TokenResponse>, ServerError> {
    let (access_token, user) = state.engine.login(&payload.email, &payload.senha).await?;
    Ok(Json(TokenResponse {
        access_token,
        usuario: user.into(),
    }))
}

/// Log in (or sign up) with a Google ID token.
pub async fn google(
    State(state): State<ServerState>,
    Payload(payload): Payload<GoogleLogin>,
) -> Result<Json<TokenResponse>, ServerError> {
    let (access_token, user) = state.engine.google_login(&payload.id_token).await?;
    Ok(Json(TokenResponse {
        access_token,
        usuario: user.into(),
    }))
}

pub async fn me(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
) -> Result<Json<UserSummary>, ServerError> {
    let user = state.engine.me(session.user_id).await?;
    Ok(Json(user.into()))
}

pub async fn logout(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
) -> Result<Json<Message>, ServerError> {
    state.engine.logout(&session).await?;
    Ok(Json(Message {
        message: "Logout realizado",
    }))
}
