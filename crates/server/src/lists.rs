//! Shopping list endpoints

use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::AuthSession;

use crate::{
    ServerError,
    extract::{PathId, Payload},
    server::ServerState,
    types::{
        Message,
        lists::{ListItemNew, ListItemUpdate, ListItemView, ListNew, ListView},
    },
};

pub async fn list_new(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    Payload(payload): Payload<ListNew>,
) -> Result<(StatusCode, Json<ListView>), ServerError> {
    let list = state
        .engine
        .new_list(session.user_id, &payload.nome)
        .await?;
    Ok((StatusCode::CREATED, Json(list.into())))
}

pub async fn list_all(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ListView>>, ServerError> {
    let lists = state.engine.lists(session.user_id).await?;
    Ok(Json(lists.into_iter().map(Into::into).collect()))
}

pub async fn list_delete(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    PathId(list_id): PathId,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_list(session.user_id, list_id).await?;
    Ok(Json(Message {
        message: "Lista excluída",
    }))
}

pub async fn item_new(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    PathId(list_id): PathId,
    Payload(payload): Payload<ListItemNew>,
) -> Result<(StatusCode, Json<ListItemView>), ServerError> {
    let item = state
        .engine
        .add_list_item(session.user_id, list_id, &payload.descricao_item)
        .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PUT: mark the item as done.
pub async fn item_complete(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    PathId(item_id): PathId,
) -> Result<Json<ListItemView>, ServerError> {
    let item = state
        .engine
        .complete_list_item(session.user_id, item_id)
        .await?;
    Ok(Json(item.into()))
}

pub async fn item_update(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    PathId(item_id): PathId,
    Payload(payload): Payload<ListItemUpdate>,
) -> Result<Json<ListItemView>, ServerError> {
    let item = state
        .engine
        .update_list_item(session.user_id, item_id, payload.concluido)
        .await?;
    Ok(Json(item.into()))
}

pub async fn item_delete(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    PathId(item_id): PathId,
) -> Result<Json<Message>, ServerError> {
    state
        .engine
        .delete_list_item(session.user_id, item_id)
        .await?;
    Ok(Json(Message {
        message: "Item excluído",
    }))
}
