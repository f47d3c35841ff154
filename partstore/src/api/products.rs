use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::DatabaseConnection;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

use super::AppState;
use crate::catalog::products;
use crate::entities::{Product, ProductCreate, ProductDetail, ProductImage, ProductImageCreate, ProductUpdate};
use crate::errors::ApiError;

crate::crud_handlers!(@collection Product, ProductCreate, ProductUpdate);

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = StatusCode::OK, description = "The product with its images", body = ProductDetail),
        (status = StatusCode::NOT_FOUND, description = "Product not found")
    ),
    operation_id = "get_one_product"
)]
pub async fn get_one_handler(
    State(db): State<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDetail>, ApiError> {
    products::get_product_detail(&db, id).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/{id}/images",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ProductImageCreate,
    responses(
        (status = StatusCode::CREATED, description = "Image attached", body = ProductImage),
        (status = StatusCode::NOT_FOUND, description = "Product not found"),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Validation failed")
    ),
    operation_id = "add_product_image"
)]
pub async fn add_image_handler(
    State(db): State<DatabaseConnection>,
    Path(id): Path<Uuid>,
    Json(create): Json<ProductImageCreate>,
) -> Result<(StatusCode, Json<ProductImage>), ApiError> {
    let image = products::add_image(&db, id, create).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

#[utoipa::path(
    delete,
    path = "/{id}/images/{image_id}",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("image_id" = Uuid, Path, description = "Image id")
    ),
    responses(
        (status = StatusCode::NO_CONTENT, description = "Image removed"),
        (status = StatusCode::NOT_FOUND, description = "Image not found on this product")
    ),
    operation_id = "remove_product_image"
)]
pub async fn remove_image_handler(
    State(db): State<DatabaseConnection>,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    products::remove_image(&db, id, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_all_handler, create_one_handler))
        .routes(routes!(get_one_handler, update_one_handler, delete_one_handler))
        .routes(routes!(add_image_handler))
        .routes(routes!(remove_image_handler))
}
