use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::{
    domain::{Product, ProductId},
    error::{ApiError, ErrorCode},
    protocol::{DeleteResponse, ProductBody},
};
use storage::Storage;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    storage: Storage,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let app = build_router(Arc::new(AppState { storage }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "product server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/:item_id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state.storage.health_check().await.map_err(internal)?;
    Ok("ok")
}

async fn list_items(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Product>>> {
    let products = state.storage.list_products().await.map_err(internal)?;
    Ok(Json(products))
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<Product>> {
    state
        .storage
        .get_product(ProductId(item_id))
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(item_not_found)
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProductBody>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let name = required_name(&body)?;
    let product = state
        .storage
        .create_product(name)
        .await
        .map_err(internal)?;
    info!(
        product_id = product.id.0,
        requested_id = body.id.map(|id| id.0),
        "product created"
    );
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
    Json(body): Json<ProductBody>,
) -> ApiResult<Json<Product>> {
    let id = ProductId(item_id);
    let product = match body.name.as_deref() {
        Some(name) => state
            .storage
            .update_product(id, name)
            .await
            .map_err(internal)?,
        // Nothing to change; still report whether the item exists.
        None => state.storage.get_product(id).await.map_err(internal)?,
    };
    let product = product.ok_or_else(item_not_found)?;
    info!(product_id = product.id.0, "product updated");
    Ok(Json(product))
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state
        .storage
        .delete_product(ProductId(item_id))
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(item_not_found());
    }
    info!(product_id = item_id, "product deleted");
    Ok(Json(DeleteResponse {
        message: "item deleted".to_string(),
    }))
}

fn required_name(body: &ProductBody) -> ApiResult<&str> {
    match body.name.as_deref() {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                "the 'name' field is required",
            )),
        )),
    }
}

fn item_not_found() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::not_found("item not found")),
    )
}

fn internal(error: anyhow::Error) -> (StatusCode, Json<ApiError>) {
    error!(%error, "storage operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(ErrorCode::Internal, error.to_string())),
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
