use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, auth, history, lists, products, purchases, types::Health};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the bearer token and stores the `AuthSession` in the request
/// extensions.
async fn require_bearer(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        return Err(EngineError::Unauthorized("missing bearer token".to_string()).into());
    };

    let session = state.engine.authenticate(bearer.token()).await?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

async fn health() -> Json<Health> {
    Json(Health { status: "healthy" })
}

/// Build the API router without CORS.
pub fn app(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/products", post(products::product_new))
        .route("/products/barcode/{barcode}", get(products::by_barcode))
        .route("/purchase/start", post(purchases::start))
        .route("/purchase/{id}/add", post(purchases::add_item))
        .route("/purchase/{id}/finish", post(purchases::finish))
        .route("/purchase/item/{item_id}", delete(purchases::remove_item))
        .route("/lists", post(lists::list_new).get(lists::list_all))
        .route("/lists/{id}", delete(lists::list_delete))
        .route("/lists/{id}/items", post(lists::item_new))
        .route(
            "/lists/items/{item_id}",
            put(lists::item_complete)
                .patch(lists::item_update)
                .delete(lists::item_delete),
        )
        .route("/history", get(history::list))
        .route("/history/compare", get(history::compare))
        .route("/history/{id}", get(history::detail))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/google", post(auth::google))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
    cors_origins: Vec<String>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, app(state).layer(cors_layer(&cors_origins))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
    cors_origins: Vec<String>,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener, cors_origins).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
