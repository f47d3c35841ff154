use axum::{Json, extract::State};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::AppState;
use crate::catalog::{ImportRequest, ImportSummary, import_products};
use crate::errors::ApiError;

/// Import a batch of feed rows. Row-level problems are reported in the
/// summary; the request itself only fails when the catalog cannot be read.
#[utoipa::path(
    post,
    path = "/products",
    request_body = ImportRequest,
    responses(
        (status = axum::http::StatusCode::OK, description = "Per-row outcome of the import", body = ImportSummary),
        (status = axum::http::StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error")
    ),
    operation_id = "import_products"
)]
pub async fn import_handler(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportSummary>, ApiError> {
    let default_model = request.default_model.unwrap_or(state.default_model);
    import_products(&state.db, &request.rows, default_model).await.map(Json)
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(import_handler))
}
