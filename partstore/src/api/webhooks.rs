use axum::{Json, extract::State};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::AppState;
use crate::collaborators::{ShippingEvent, ShippingWebhook, handle_shipping_webhook};
use crate::errors::ApiError;

#[utoipa::path(
    post,
    path = "/shipping",
    request_body = ShippingWebhook,
    responses(
        (status = axum::http::StatusCode::OK, description = "Event accepted", body = ShippingEvent),
        (status = axum::http::StatusCode::UNPROCESSABLE_ENTITY, description = "Unknown event type or bad resource URL"),
        (status = axum::http::StatusCode::BAD_GATEWAY, description = "Listener failed")
    ),
    operation_id = "shipping_webhook"
)]
pub async fn shipping_handler(
    State(state): State<AppState>,
    Json(webhook): Json<ShippingWebhook>,
) -> Result<Json<ShippingEvent>, ApiError> {
    handle_shipping_webhook(state.shipments.as_ref(), webhook).await.map(Json)
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(shipping_handler))
}
