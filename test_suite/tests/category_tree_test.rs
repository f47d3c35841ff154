// Category tree store: levels, sibling uniqueness, sort order and delete promotion

use partstore::{
    ApiError, CRUDResource,
    catalog::tree,
    entities::{Category, CategoryCreate, CategoryUpdate},
};
use uuid::Uuid;

mod common;
use common::{create_category, create_product, setup_test_db};

#[tokio::test]
async fn test_levels_follow_parents() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let root = create_category(&db, "Model Y", None).await;
    let main = create_category(&db, "Exterior", Some(root.id)).await;
    let sub = create_category(&db, "Mirrors", Some(main.id)).await;

    assert_eq!(root.level, 1);
    assert_eq!(main.level, 2);
    assert_eq!(sub.level, 3);
    assert_eq!(sub.parent_id, Some(main.id));
    assert_eq!(sub.slug, "mirrors");
}

#[tokio::test]
async fn test_explicit_level_is_ignored_under_a_parent() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let root = create_category(&db, "Model 3", None).await;

    let child = Category::create(
        &db,
        CategoryCreate {
            name: "Interior".into(),
            parent_id: Some(root.id),
            level: Some(3),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(child.level, 2);
}

#[tokio::test]
async fn test_fourth_level_is_rejected() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let root = create_category(&db, "Model S", None).await;
    let main = create_category(&db, "Wheels", Some(root.id)).await;
    let sub = create_category(&db, "Center Caps", Some(main.id)).await;

    let err = Category::create(
        &db,
        CategoryCreate {
            name: "Too Deep".into(),
            parent_id: Some(sub.id),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::ValidationFailed { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_missing_parent_is_a_validation_error() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let err = Category::create(
        &db,
        CategoryCreate {
            name: "Orphan".into(),
            parent_id: Some(Uuid::new_v4()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    match err {
        ApiError::ValidationFailed { errors } => {
            assert_eq!(errors, vec!["parent_id: Parent category does not exist".to_string()]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let err = Category::create(
        &db,
        CategoryCreate {
            name: "   ".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_names_are_unique_among_siblings_only() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let model_y = create_category(&db, "Model Y", None).await;
    let model_3 = create_category(&db, "Model 3", None).await;

    // Same name under different parents is fine
    create_category(&db, "Brakes", Some(model_y.id)).await;
    create_category(&db, "Brakes", Some(model_3.id)).await;

    let err = Category::create(
        &db,
        CategoryCreate {
            name: "Brakes".into(),
            parent_id: Some(model_y.id),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }), "got {err:?}");
    assert_eq!(err.user_message(), "A category named 'Brakes' already exists at this level");

    // Root names collide too, even though parent_id is NULL
    let err = Category::create(
        &db,
        CategoryCreate {
            name: "Model Y".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_slug_collision_among_siblings() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    create_category(&db, "Floor Mats", None).await;

    let err = Category::create(
        &db,
        CategoryCreate {
            name: "floor mats!".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.user_message(), "A category with slug 'floor-mats' already exists at this level");
}

#[tokio::test]
async fn test_sort_order_increments_per_parent() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let first_root = create_category(&db, "Model Y", None).await;
    let second_root = create_category(&db, "Model X", None).await;
    let first_child = create_category(&db, "Lighting", Some(first_root.id)).await;
    let second_child = create_category(&db, "Charging", Some(first_root.id)).await;

    assert_eq!(first_root.sort_order, 1);
    assert_eq!(second_root.sort_order, 2);
    assert_eq!(first_child.sort_order, 1);
    assert_eq!(second_child.sort_order, 2);
}

#[tokio::test]
async fn test_rename_checks_siblings_but_not_itself() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let root = create_category(&db, "Model Y", None).await;
    let lighting = create_category(&db, "Lighting", Some(root.id)).await;
    create_category(&db, "Charging", Some(root.id)).await;

    // Renaming to its own name is not a conflict
    let same = Category::update(
        &db,
        lighting.id,
        CategoryUpdate {
            name: Some("Lighting".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(same.name, "Lighting");

    let err = Category::update(
        &db,
        lighting.id,
        CategoryUpdate {
            name: Some("Charging".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }), "got {err:?}");

    let renamed = Category::update(
        &db,
        lighting.id,
        CategoryUpdate {
            name: Some("Exterior Lighting".into()),
            description: Some(Some("Lamps and bulbs".into())),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.slug, "exterior-lighting");
    assert_eq!(renamed.description.as_deref(), Some("Lamps and bulbs"));
    assert_eq!(renamed.level, 2);
}

#[tokio::test]
async fn test_update_unknown_category_is_not_found() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let err = Category::update(&db, Uuid::new_v4(), CategoryUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_delete_with_products_is_a_conflict() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let brakes = create_category(&db, "Brakes", None).await;
    create_product(&db, "BP-1", "Brake Pad", brakes.id).await;

    let err = Category::delete(&db, brakes.id).await.unwrap_err();
    assert_eq!(err.user_message(), "Category 'Brakes' still has 1 product(s) assigned");

    // Still there
    assert!(Category::get_one(&db, brakes.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_promotes_children_and_their_subtree() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let root = create_category(&db, "Model Y", None).await;
    let main = create_category(&db, "Exterior", Some(root.id)).await;
    let sub = create_category(&db, "Mirrors", Some(main.id)).await;

    let deleted = Category::delete(&db, root.id).await.unwrap();
    assert_eq!(deleted, root.id);

    let main = Category::get_one(&db, main.id).await.unwrap();
    let sub = Category::get_one(&db, sub.id).await.unwrap();
    assert_eq!(main.parent_id, None);
    assert_eq!(main.level, 1);
    assert_eq!(sub.parent_id, Some(main.id));
    assert_eq!(sub.level, 2);

    let err = Category::get_one(&db, root.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_delete_refuses_promotion_into_a_name_clash() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let model_y = create_category(&db, "Model Y", None).await;
    create_category(&db, "Brakes", None).await;
    create_category(&db, "Brakes", Some(model_y.id)).await;

    let err = Category::delete(&db, model_y.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }), "got {err:?}");

    // Nothing moved
    let children: Vec<Category> = tree::list_categories(&db)
        .await
        .unwrap()
        .into_iter()
        .filter(|c| c.parent_id == Some(model_y.id))
        .collect();
    assert_eq!(children.len(), 1);
}

#[tokio::test]
async fn test_delete_promotes_a_child_named_like_its_parent() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let body = create_category(&db, "Body", None).await;
    let inner = create_category(&db, "Body", Some(body.id)).await;
    let panels = create_category(&db, "Panels", Some(inner.id)).await;

    Category::delete(&db, body.id).await.unwrap();

    let inner = Category::get_one(&db, inner.id).await.unwrap();
    assert_eq!(inner.parent_id, None);
    assert_eq!(inner.level, 1);
    assert_eq!(inner.name, "Body");
    assert_eq!(inner.slug, "body");
    assert_eq!(Category::get_one(&db, panels.id).await.unwrap().level, 2);

    let names: Vec<String> = tree::list_categories(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Body", "Panels"]);
}

#[tokio::test]
async fn test_delete_unknown_category_is_not_found() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let err = Category::delete(&db, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_list_is_in_store_order() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let model_y = create_category(&db, "Model Y", None).await;
    create_category(&db, "Charging", Some(model_y.id)).await;
    create_category(&db, "Accessories", None).await;

    let names: Vec<String> = tree::list_categories(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    // Level first, then sort order
    assert_eq!(names, vec!["Model Y", "Accessories", "Charging"]);
}
