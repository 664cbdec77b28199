//! Product catalogue endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::NewProductCmd;

use crate::{
    ServerError,
    extract::Payload,
    server::ServerState,
    types::products::{ProductNew, ProductView},
};

pub async fn by_barcode(
    State(state): State<ServerState>,
    Path(barcode): Path<String>,
) -> Result<Json<ProductView>, ServerError> {
    let product = state.engine.product_by_barcode(&barcode).await?;
    Ok(Json(product.into()))
}

pub async fn product_new(
    State(state): State<ServerState>,
    Payload(payload): Payload<ProductNew>,
) -> Result<(StatusCode, Json<ProductView>), ServerError> {
    let product = state
        .engine
        .new_product(NewProductCmd {
            barcode: payload.codigo_barras,
            name: payload.nome,
            brand: payload.marca,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}
