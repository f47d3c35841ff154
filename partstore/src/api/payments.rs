use axum::{Json, extract::State};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::AppState;
use crate::collaborators::{PaymentIntent, PaymentIntentRequest, create_payment_intent};
use crate::errors::ApiError;

#[utoipa::path(
    post,
    path = "/intent",
    request_body = PaymentIntentRequest,
    responses(
        (status = axum::http::StatusCode::OK, description = "Intent created by the payment provider", body = PaymentIntent),
        (status = axum::http::StatusCode::UNPROCESSABLE_ENTITY, description = "Validation failed"),
        (status = axum::http::StatusCode::BAD_GATEWAY, description = "Payment provider failed")
    ),
    operation_id = "create_payment_intent"
)]
pub async fn intent_handler(
    State(state): State<AppState>,
    Json(request): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntent>, ApiError> {
    create_payment_intent(state.payments.as_ref(), request).await.map(Json)
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(intent_handler))
}
