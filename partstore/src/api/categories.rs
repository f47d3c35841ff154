use axum::{Json, extract::State};
use sea_orm::DatabaseConnection;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::AppState;
use crate::catalog::{CategoryTreeNode, tree};
use crate::entities::{Category, CategoryCreate, CategoryUpdate};
use crate::errors::ApiError;

crate::crud_handlers!(Category, CategoryCreate, CategoryUpdate);

/// Full hierarchy with direct and aggregate product counts on every node
#[utoipa::path(
    get,
    path = "/tree",
    responses(
        (status = axum::http::StatusCode::OK, description = "Root categories with their children nested", body = [CategoryTreeNode]),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    operation_id = "get_category_tree"
)]
pub async fn tree_handler(State(db): State<DatabaseConnection>) -> Result<Json<Vec<CategoryTreeNode>>, ApiError> {
    tree::category_tree(&db).await.map(Json)
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(tree_handler))
        .routes(routes!(get_all_handler, create_one_handler))
        .routes(routes!(get_one_handler, update_one_handler, delete_one_handler))
}
