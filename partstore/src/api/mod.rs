//! # HTTP API
//!
//! Everything is mounted under `/api`, with interactive docs at `/docs`:
//!
//! | Path | Methods |
//! |------|---------|
//! | `/api/categories` | list, create |
//! | `/api/categories/tree` | nested hierarchy with counts |
//! | `/api/categories/{id}` | get, update, delete |
//! | `/api/products` | list, create |
//! | `/api/products/{id}` | get (with images), update, delete |
//! | `/api/products/{id}/images[/{image_id}]` | attach, remove |
//! | `/api/imports/products` | bulk import |
//! | `/api/payments/intent` | create a payment intent |
//! | `/api/webhooks/shipping` | shipping provider callbacks |

pub mod categories;
pub mod imports;
pub mod payments;
pub mod products;
pub mod state;
pub mod webhooks;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub use state::AppState;

#[derive(OpenApi)]
#[openapi(info(title = "partstore", description = "Catalog, import and checkout API for Tesla-compatible parts"))]
struct ApiDoc;

/// Routes, docs and the HTTP middleware stack, bound to `state`
pub fn router(state: AppState) -> Router {
    let (api, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/categories", categories::router())
        .nest("/api/products", products::router())
        .nest("/api/imports", imports::router())
        .nest("/api/payments", payments::router())
        .nest("/api/webhooks", webhooks::router())
        .split_for_parts();

    api.merge(Scalar::with_url("/docs", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
