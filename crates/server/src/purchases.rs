//! Purchase session endpoints

use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{AddPurchaseItemCmd, AuthSession};

use crate::{
    ServerError,
    extract::{PathId, Payload},
    server::ServerState,
    types::purchases::{ItemAdded, PurchaseFinished, PurchaseItemNew, PurchaseStarted, Total},
};

pub async fn start(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
) -> Result<(StatusCode, Json<PurchaseStarted>), ServerError> {
    let purchase = state.engine.start_purchase(session.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(PurchaseStarted {
            compra_id: purchase.id,
            valor_total: purchase.total.to_major_f64(),
        }),
    ))
}

pub async fn add_item(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    PathId(purchase_id): PathId,
    Payload(payload): Payload<PurchaseItemNew>,
) -> Result<(StatusCode, Json<ItemAdded>), ServerError> {
    let unit_price = payload.preco_pago.to_money()?;
    let (item_id, total) = state
        .engine
        .add_purchase_item(AddPurchaseItemCmd {
            purchase_id,
            product_id: payload.produto_id,
            unit_price,
            quantity: payload.quantidade.unwrap_or(1),
            user_id: session.user_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ItemAdded {
            item_id,
            valor_total: total.to_major_f64(),
        }),
    ))
}

pub async fn remove_item(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    PathId(item_id): PathId,
) -> Result<Json<Total>, ServerError> {
    let total = state
        .engine
        .remove_purchase_item(session.user_id, item_id)
        .await?;
    Ok(Json(Total {
        valor_total: total.to_major_f64(),
    }))
}

pub async fn finish(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    PathId(purchase_id): PathId,
) -> Result<Json<PurchaseFinished>, ServerError> {
    let total = state
        .engine
        .finalize_purchase(session.user_id, purchase_id)
        .await?;
    Ok(Json(PurchaseFinished {
        message: "Compra finalizada",
        valor_total: total.to_major_f64(),
        compra_id: purchase_id,
    }))
}
