//! Guarded product writes and image attachments.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::Expr,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::MergeIntoActiveModel;
use crate::entities::{
    Product, ProductCreate, ProductDetail, ProductImage, ProductImageCreate, ProductUpdate, category, product,
    product_image,
};
use crate::errors::ApiError;
use crate::slug::slugify;
use crate::validation::{Validatable, ValidationError};

async fn ensure_category_exists<C: ConnectionTrait>(conn: &C, category_id: Uuid) -> Result<(), ApiError> {
    let found = category::Entity::find_by_id(category_id).count(conn).await?;
    if found == 0 {
        return Err(ValidationError::new("category_id", "Category does not exist").into());
    }
    Ok(())
}

async fn ensure_unique<C: ConnectionTrait>(
    conn: &C,
    column: product::Column,
    value: &str,
    label: &str,
    exclude: Option<Uuid>,
) -> Result<(), ApiError> {
    let mut query = product::Entity::find().filter(column.eq(value));
    if let Some(id) = exclude {
        query = query.filter(product::Column::Id.ne(id));
    }
    if query.count(conn).await? > 0 {
        return Err(ApiError::conflict(format!(
            "A product with {label} '{value}' already exists"
        )));
    }
    Ok(())
}

/// # Errors
///
/// `ValidationFailed` for bad fields or an unknown category, `Conflict` when
/// the SKU or derived slug is already used.
pub async fn create_product(db: &DatabaseConnection, create: ProductCreate) -> Result<product::Model, ApiError> {
    create.validate()?;
    let sku = create.sku.trim().to_string();
    let slug = slugify(&create.name);

    let txn = db.begin().await?;
    ensure_category_exists(&txn, create.category_id).await?;
    ensure_unique(&txn, product::Column::Sku, &sku, "SKU", None).await?;
    ensure_unique(&txn, product::Column::Slug, &slug, "slug", None).await?;

    let model = create.into_active_model(slug).insert(&txn).await?;
    txn.commit().await?;
    debug!(sku = %model.sku, "created product");
    Ok(model)
}

/// # Errors
///
/// `NotFound` for an unknown id; otherwise as [`create_product`].
pub async fn update_product(
    db: &DatabaseConnection,
    id: Uuid,
    update: ProductUpdate,
) -> Result<product::Model, ApiError> {
    update.validate()?;

    let txn = db.begin().await?;
    let existing = product::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("product", Some(id.to_string())))?;

    if let Some(category_id) = update.category_id {
        ensure_category_exists(&txn, category_id).await?;
    }
    if let Some(sku) = &update.sku {
        ensure_unique(&txn, product::Column::Sku, sku.trim(), "SKU", Some(id)).await?;
    }
    if let Some(name) = &update.name {
        ensure_unique(&txn, product::Column::Slug, &slugify(name), "slug", Some(id)).await?;
    }

    let active = update.merge_into_activemodel(existing.into_active_model())?;
    let model = active.update(&txn).await?;
    txn.commit().await?;
    Ok(model)
}

/// Remove a product together with its images in one transaction
///
/// # Errors
///
/// `NotFound` for an unknown id.
pub async fn delete_product(db: &DatabaseConnection, id: Uuid) -> Result<Uuid, ApiError> {
    let txn = db.begin().await?;
    let exists = product::Entity::find_by_id(id).count(&txn).await?;
    if exists == 0 {
        return Err(ApiError::not_found("product", Some(id.to_string())));
    }

    let images = product_image::Entity::delete_many()
        .filter(product_image::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    product::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    debug!(%id, images = images.rows_affected, "deleted product");
    Ok(id)
}

async fn images_of<C: ConnectionTrait>(conn: &C, product_id: Uuid) -> Result<Vec<ProductImage>, sea_orm::DbErr> {
    let images = product_image::Entity::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .order_by_asc(product_image::Column::SortOrder)
        .all(conn)
        .await?;
    Ok(images.into_iter().map(ProductImage::from).collect())
}

/// # Errors
///
/// `NotFound` for an unknown id.
pub async fn get_product_detail(db: &DatabaseConnection, id: Uuid) -> Result<ProductDetail, ApiError> {
    let model = product::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("product", Some(id.to_string())))?;
    let images = images_of(db, id).await?;
    Ok(ProductDetail {
        product: Product::from(model),
        images,
    })
}

/// Attach an image URL; it is placed after the existing images
///
/// # Errors
///
/// `NotFound` for an unknown product, `ValidationFailed` for a bad URL.
pub async fn add_image(
    db: &DatabaseConnection,
    product_id: Uuid,
    create: ProductImageCreate,
) -> Result<ProductImage, ApiError> {
    create.validate()?;

    let txn = db.begin().await?;
    if product::Entity::find_by_id(product_id).count(&txn).await? == 0 {
        return Err(ApiError::not_found("product", Some(product_id.to_string())));
    }

    let max: Option<Option<i32>> = product_image::Entity::find()
        .select_only()
        .column_as(Expr::col(product_image::Column::SortOrder).max(), "max_sort_order")
        .filter(product_image::Column::ProductId.eq(product_id))
        .into_tuple()
        .one(&txn)
        .await?;
    let sort_order = max.flatten().map_or(1, |m| m.saturating_add(1));

    // At most one primary image per product
    if create.is_primary {
        product_image::Entity::update_many()
            .col_expr(product_image::Column::IsPrimary, Expr::value(false))
            .filter(product_image::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
    }

    let model = product_image::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        url: Set(create.url.trim().to_string()),
        alt_text: Set(create.alt_text),
        sort_order: Set(sort_order),
        is_primary: Set(create.is_primary),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    Ok(ProductImage::from(model))
}

/// # Errors
///
/// `NotFound` when the image does not belong to the product.
pub async fn remove_image(db: &DatabaseConnection, product_id: Uuid, image_id: Uuid) -> Result<Uuid, ApiError> {
    let result = product_image::Entity::delete_many()
        .filter(product_image::Column::Id.eq(image_id))
        .filter(product_image::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("product image", Some(image_id.to_string())));
    }
    Ok(image_id)
}
