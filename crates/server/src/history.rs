//! Purchase history endpoints

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::AuthSession;

use crate::{
    ServerError,
    extract::PathId,
    server::ServerState,
    types::{
        history::{CompareQuery, ComparisonView},
        purchases::PurchaseView,
    },
};

pub async fn list(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PurchaseView>>, ServerError> {
    let purchases = state.engine.history(session.user_id).await?;
    Ok(Json(purchases.into_iter().map(Into::into).collect()))
}

pub async fn detail(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    PathId(purchase_id): PathId,
) -> Result<Json<PurchaseView>, ServerError> {
    let detail = state
        .engine
        .purchase_detail(session.user_id, purchase_id)
        .await?;
    Ok(Json(detail.into()))
}

fn parse_ids(query: &CompareQuery) -> Result<(i32, i32), ServerError> {
    let (Some(a), Some(b)) = (query.a.as_deref(), query.b.as_deref()) else {
        return Err(ServerError::Generic(
            "query parameters 'a' and 'b' are required".to_string(),
        ));
    };
    match (a.trim().parse::<i32>(), b.trim().parse::<i32>()) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        _ => Err(ServerError::Generic(
            "query parameters 'a' and 'b' must be integers".to_string(),
        )),
    }
}

pub async fn compare(
    Extension(session): Extension<AuthSession>,
    State(state): State<ServerState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ComparisonView>, ServerError> {
    let (a, b) = parse_ids(&query)?;
    let report = state
        .engine
        .compare_purchases(session.user_id, a, b)
        .await?;
    Ok(Json(report.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(a: Option<&str>, b: Option<&str>) -> CompareQuery {
        CompareQuery {
            a: a.map(str::to_string),
            b: b.map(str::to_string),
        }
    }

    #[test]
    fn compare_ids_must_be_present_integers() {
        assert!(matches!(parse_ids(&query(Some("1"), Some(" 2"))), Ok((1, 2))));
        assert!(parse_ids(&query(Some("1"), None)).is_err());
        assert!(parse_ids(&query(Some("x"), Some("2"))).is_err());
        assert!(parse_ids(&query(Some("1.5"), Some("2"))).is_err());
    }
}
