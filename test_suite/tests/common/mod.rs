use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use partstore::{
    AppState, CRUDResource, Migrator, api,
    entities::{Category, CategoryCreate, Product, ProductCreate},
    vehicle::VehicleModel,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

// Persistent databases are shared between tests, so setup runs one at a time
static SETUP_MUTEX: Mutex<()> = Mutex::const_new(());

fn get_test_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

async fn cleanup_test_tables(db: &DatabaseConnection) {
    // Reverse dependency order
    let _ = db.execute_unprepared("DROP TABLE IF EXISTS product_images").await;
    let _ = db.execute_unprepared("DROP TABLE IF EXISTS products").await;
    let _ = db.execute_unprepared("DROP TABLE IF EXISTS categories").await;
    let _ = db.execute_unprepared("DROP TABLE IF EXISTS seaql_migrations").await;
}

#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let database_url = get_test_database_url();
    let db = Database::connect(&database_url).await?;

    if database_url.starts_with("sqlite::memory:") {
        Migrator::up(&db, None).await?;
    } else {
        let _lock = SETUP_MUTEX.lock().await;
        cleanup_test_tables(&db).await;
        Migrator::up(&db, None).await?;
    }
    Ok(db)
}

#[allow(dead_code)]
pub fn setup_test_app(db: DatabaseConnection) -> Router {
    api::router(AppState::new(db, VehicleModel::ModelY))
}

#[allow(dead_code)]
pub async fn create_category(db: &DatabaseConnection, name: &str, parent_id: Option<Uuid>) -> Category {
    Category::create(
        db,
        CategoryCreate {
            name: name.to_string(),
            parent_id,
            ..Default::default()
        },
    )
    .await
    .unwrap_or_else(|e| panic!("failed to create category '{name}': {e}"))
}

#[allow(dead_code)]
pub async fn create_product(db: &DatabaseConnection, sku: &str, name: &str, category_id: Uuid) -> Product {
    Product::create(
        db,
        ProductCreate {
            sku: sku.to_string(),
            name: name.to_string(),
            price: Decimal::new(1999, 2),
            category_id,
            ..Default::default()
        },
    )
    .await
    .unwrap_or_else(|e| panic!("failed to create product '{sku}': {e}"))
}

/// Status, headers and JSON body (or `Null` for an empty body)
#[allow(dead_code)]
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| panic!("response was not JSON: {}", String::from_utf8_lossy(&bytes)))
    };
    (status, headers, json)
}

/// `base?key=value&...` with every value percent-encoded
#[allow(dead_code)]
pub fn list_uri(base: &str, params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={}", url_escape::encode_component(value)))
        .collect();
    format!("{base}?{}", query.join("&"))
}
