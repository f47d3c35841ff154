// Bulk import: per-row outcomes, category matching and auto-creation

use partstore::{
    CRUDResource,
    catalog::{FailureKind, ImportRow, UNCATEGORIZED, import_products, tree},
    entities::{Category, Product},
    vehicle::VehicleModel,
};
use rust_decimal::Decimal;
use sea_orm::{Condition, Order};

mod common;
use common::{create_category, create_product, setup_test_db};

fn row(name: &str, sku: &str, price: f64) -> ImportRow {
    ImportRow {
        name: Some(name.to_string()),
        sku: Some(sku.to_string()),
        price: Some(price),
        ..Default::default()
    }
}

async fn all_products(db: &sea_orm::DatabaseConnection) -> Vec<Product> {
    Product::get_all(db, &Condition::all(), partstore::entities::product::Column::Sku, Order::Asc, 0, 100)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_brake_pad_import_into_empty_store() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let rows = vec![
        ImportRow {
            category: Some("Brakes".into()),
            stock_quantity: Some(8),
            ..row("Brake Pad", "BP-1", 49.99)
        },
        row("", "BP-2", 10.0),
    ];
    let summary = import_products(&db, &rows, VehicleModel::ModelY).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.duplicates, 0);
    assert_eq!(summary.categories_created, vec!["Brakes".to_string()]);
    assert_eq!(summary.default_model, VehicleModel::ModelY);

    assert_eq!(summary.failures.len(), 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.row, 3);
    assert_eq!(failure.sku.as_deref(), Some("BP-2"));
    assert_eq!(failure.kind, FailureKind::Validation);
    assert!(failure.message.contains("name"), "message was {}", failure.message);

    let products = all_products(&db).await;
    assert_eq!(products.len(), 1);
    let pad = &products[0];
    assert_eq!(pad.sku, "BP-1");
    assert_eq!(pad.slug, "brake-pad");
    assert_eq!(pad.price, Decimal::new(4999, 2));
    assert_eq!(pad.stock_quantity, 8);
    assert_eq!(pad.low_stock_threshold, 5);
    assert_eq!(pad.compatible_models, vec![VehicleModel::ModelY]);
    assert_eq!(pad.short_description.as_deref(), Some("Brake Pad"));

    let brakes = Category::get_one(&db, pad.category_id).await.unwrap();
    assert_eq!(brakes.name, "Brakes");
    assert_eq!(brakes.level, 1);
    assert_eq!(brakes.parent_id, None);
    assert_eq!(brakes.sort_order, 999);
    assert_eq!(brakes.product_count, 1);
}

#[tokio::test]
async fn test_negative_price_fails_only_that_row() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let rows = vec![row("Cabin Filter", "CF-1", -5.0), row("Wiper Blade", "WB-1", 19.5)];

    let summary = import_products(&db, &rows, VehicleModel::Model3).await.unwrap();
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].row, 2);
    assert_eq!(summary.failures[0].message, "price: must not be negative");

    let products = all_products(&db).await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].sku, "WB-1");
    assert_eq!(products[0].compatible_models, vec![VehicleModel::Model3]);
}

#[tokio::test]
async fn test_existing_sku_is_a_duplicate_and_stays_untouched() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let brakes = create_category(&db, "Brakes", None).await;
    let existing = create_product(&db, "BP-1", "Brake Pad", brakes.id).await;

    let rows = vec![ImportRow {
        category: Some("Brakes".into()),
        ..row("Brake Pad Deluxe", "BP-1", 99.0)
    }];
    let summary = import_products(&db, &rows, VehicleModel::ModelY).await.unwrap();

    assert_eq!(summary.successful, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.failures[0].kind, FailureKind::Duplicate);
    assert_eq!(summary.failures[0].message, "A product with SKU 'BP-1' already exists");

    let unchanged = Product::get_one(&db, existing.id).await.unwrap();
    assert_eq!(unchanged.name, "Brake Pad");
    assert_eq!(unchanged.price, existing.price);
}

#[tokio::test]
async fn test_sku_repeated_within_a_batch() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let rows = vec![row("Tow Hook", "TH-1", 25.0), row("Tow Hook", "TH-1", 25.0)];

    let summary = import_products(&db, &rows, VehicleModel::ModelY).await.unwrap();
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.failures[0].row, 3);
}

#[tokio::test]
async fn test_rows_match_existing_categories() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let root = create_category(&db, "Model Y", None).await;
    let body = create_category(&db, "10 - BODY", Some(root.id)).await;
    let lighting = create_category(&db, "Exterior Lighting", Some(root.id)).await;

    let rows = vec![
        // name that contains the label
        ImportRow {
            subcategory: Some("lighting".into()),
            ..row("Fog Lamp", "FL-1", 80.0)
        },
        // label that contains both the root and the more specific child
        ImportRow {
            category: Some("Model Y - 10 - BODY".into()),
            ..row("Fender", "FE-1", 150.0)
        },
        // subcategory wins over category
        ImportRow {
            category: Some("Unrelated".into()),
            subcategory: Some("Exterior Lighting".into()),
            ..row("Tail Lamp", "TL-1", 120.0)
        },
    ];
    let summary = import_products(&db, &rows, VehicleModel::ModelY).await.unwrap();
    assert_eq!(summary.successful, 3, "failures: {:?}", summary.failures);
    assert!(summary.categories_created.is_empty());

    let products = all_products(&db).await;
    let category_of = |sku: &str| products.iter().find(|p| p.sku == sku).unwrap().category_id;
    assert_eq!(category_of("FL-1"), lighting.id);
    assert_eq!(category_of("FE-1"), body.id);
    assert_eq!(category_of("TL-1"), lighting.id);
}

#[tokio::test]
async fn test_new_label_is_created_once_per_batch() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let rows = vec![
        ImportRow {
            category: Some("Suspension".into()),
            ..row("Coilover", "SU-1", 900.0)
        },
        ImportRow {
            category: Some("Suspension".into()),
            ..row("Sway Bar", "SU-2", 300.0)
        },
    ];
    let summary = import_products(&db, &rows, VehicleModel::ModelS).await.unwrap();
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.categories_created, vec!["Suspension".to_string()]);

    let categories = tree::list_categories(&db).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].product_count, 2);
    assert_eq!(
        categories[0].description.as_deref(),
        Some("Auto-created category for Suspension (Model S)")
    );
}

#[tokio::test]
async fn test_missing_label_falls_back_to_uncategorized() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let rows = vec![row("Key Card", "KC-1", 15.0), row("Key Fob", "KF-1", 175.0)];

    let summary = import_products(&db, &rows, VehicleModel::ModelY).await.unwrap();
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.categories_created, vec![UNCATEGORIZED.to_string()]);

    let categories = tree::list_categories(&db).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, UNCATEGORIZED);
    assert_eq!(categories[0].product_count, 2);
}

#[tokio::test]
async fn test_row_models_override_the_batch_default() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let rows = vec![ImportRow {
        compatible_models: Some("MODEL_Y, Model 3".into()),
        ..row("Floor Mats", "FM-1", 150.0)
    }];

    let summary = import_products(&db, &rows, VehicleModel::Cybertruck).await.unwrap();
    assert_eq!(summary.successful, 1);

    let products = all_products(&db).await;
    assert_eq!(products[0].compatible_models, vec![VehicleModel::Model3, VehicleModel::ModelY]);
}

#[tokio::test]
async fn test_same_name_different_sku_gets_a_distinct_slug() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let rows = vec![row("Mud Flaps", "MF-1", 40.0), row("Mud Flaps", "MF-2", 45.0)];

    let summary = import_products(&db, &rows, VehicleModel::ModelY).await.unwrap();
    assert_eq!(summary.successful, 2, "failures: {:?}", summary.failures);

    let products = all_products(&db).await;
    let slugs: Vec<&str> = products.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["mud-flaps", "mud-flaps-mf-2"]);
}

#[tokio::test]
async fn test_empty_batch() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let summary = import_products(&db, &[], VehicleModel::ModelY).await.unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(summary.successful, 0);
    assert!(summary.failures.is_empty());
    assert!(summary.categories_created.is_empty());
}
