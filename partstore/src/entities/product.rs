use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::Set, DatabaseConnection, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::product_image::ProductImage;
use crate::catalog::products;
use crate::core::{CRUDResource, MergeIntoActiveModel};
use crate::errors::ApiError;
use crate::slug::slugify;
use crate::validation::{Validatable, ValidationError, ValidationErrors, validators};
use crate::vehicle::{CompatibleModels, VehicleModel};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub meta_description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub track_quantity: bool,
    /// Comma-joined `VehicleModel` codes
    pub compatible_models: String,
    #[sea_orm(column_type = "Decimal(Some((10, 3)))", nullable)]
    pub weight: Option<Decimal>,
    pub dimensions: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,

    #[sea_orm(has_many = "super::product_image::Entity")]
    Images,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stored models decoded leniently; codes this build does not know are skipped
    #[must_use]
    pub fn compatible_models(&self) -> CompatibleModels {
        self.compatible_models
            .split(',')
            .filter_map(|code| code.parse::<VehicleModel>().ok())
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub meta_description: Option<String>,
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[schema(value_type = Option<f64>)]
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub track_quantity: bool,
    pub compatible_models: Vec<VehicleModel>,
    #[schema(value_type = Option<f64>)]
    pub weight: Option<Decimal>,
    pub dimensions: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        let compatible_models = model.compatible_models().models().to_vec();
        Self {
            id: model.id,
            sku: model.sku,
            name: model.name,
            slug: model.slug,
            description: model.description,
            short_description: model.short_description,
            meta_description: model.meta_description,
            price: model.price,
            compare_at_price: model.compare_at_price,
            stock_quantity: model.stock_quantity,
            low_stock_threshold: model.low_stock_threshold,
            track_quantity: model.track_quantity,
            compatible_models,
            weight: model.weight,
            dimensions: model.dimensions,
            is_active: model.is_active,
            is_featured: model.is_featured,
            category_id: model.category_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Product with its images, ordered by sort index
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct ProductCreate {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub meta_description: Option<String>,
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[schema(value_type = Option<f64>)]
    pub compare_at_price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub track_quantity: Option<bool>,
    #[serde(default)]
    pub compatible_models: Vec<VehicleModel>,
    #[schema(value_type = Option<f64>)]
    pub weight: Option<Decimal>,
    pub dimensions: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub category_id: Uuid,
}

fn check_optional_price(errors: &mut ValidationErrors, field: &str, value: Option<Decimal>) {
    if let Some(value) = value {
        errors.check(validators::validate_price(field, value));
    }
}

fn check_optional_quantity(errors: &mut ValidationErrors, field: &str, value: Option<i32>) {
    if let Some(value) = value {
        errors.check(validators::validate_non_negative(field, value.into()));
    }
}

impl Validatable for ProductCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validators::validate_required("name", &self.name));
        errors.check(validators::validate_required("sku", &self.sku));
        errors.check(validators::validate_price("price", self.price));
        check_optional_price(&mut errors, "compare_at_price", self.compare_at_price);
        check_optional_quantity(&mut errors, "stock_quantity", self.stock_quantity);
        check_optional_quantity(&mut errors, "low_stock_threshold", self.low_stock_threshold);
        if slugify(&self.name).is_empty() && !self.name.trim().is_empty() {
            errors.add(ValidationError::new("name", "must contain at least one letter or digit"));
        }
        errors.result()
    }
}

impl ProductCreate {
    /// Active model for insertion, with storefront defaults for absent fields
    #[must_use]
    pub fn into_active_model(self, slug: String) -> ActiveModel {
        let now = Utc::now();
        let models: CompatibleModels = self.compatible_models.into_iter().collect();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(self.sku.trim().to_string()),
            name: Set(self.name.trim().to_string()),
            slug: Set(slug),
            description: Set(self.description),
            short_description: Set(self.short_description),
            meta_description: Set(self.meta_description),
            price: Set(self.price),
            compare_at_price: Set(self.compare_at_price),
            stock_quantity: Set(self.stock_quantity.unwrap_or(0)),
            low_stock_threshold: Set(self.low_stock_threshold.unwrap_or(5)),
            track_quantity: Set(self.track_quantity.unwrap_or(true)),
            compatible_models: Set(models.encode()),
            weight: Set(self.weight),
            dimensions: Set(self.dimensions),
            is_active: Set(self.is_active.unwrap_or(true)),
            is_featured: Set(self.is_featured.unwrap_or(false)),
            category_id: Set(self.category_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct ProductUpdate {
    pub sku: Option<String>,
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub short_description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub meta_description: Option<Option<String>>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<f64>)]
    pub compare_at_price: Option<Option<Decimal>>,
    pub stock_quantity: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub track_quantity: Option<bool>,
    pub compatible_models: Option<Vec<VehicleModel>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<f64>)]
    pub weight: Option<Option<Decimal>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub dimensions: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub category_id: Option<Uuid>,
}

impl Validatable for ProductUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validators::validate_required("name", name));
            if slugify(name).is_empty() && !name.trim().is_empty() {
                errors.add(ValidationError::new("name", "must contain at least one letter or digit"));
            }
        }
        if let Some(sku) = &self.sku {
            errors.check(validators::validate_required("sku", sku));
        }
        check_optional_price(&mut errors, "price", self.price);
        check_optional_price(&mut errors, "compare_at_price", self.compare_at_price.flatten());
        check_optional_quantity(&mut errors, "stock_quantity", self.stock_quantity);
        check_optional_quantity(&mut errors, "low_stock_threshold", self.low_stock_threshold);
        errors.result()
    }
}

impl MergeIntoActiveModel<ActiveModel> for ProductUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(sku) = self.sku {
            existing.sku = Set(sku.trim().to_string());
        }
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            existing.slug = Set(slugify(&name));
            existing.name = Set(name);
        }
        if let Some(description) = self.description {
            existing.description = Set(description);
        }
        if let Some(short_description) = self.short_description {
            existing.short_description = Set(short_description);
        }
        if let Some(meta_description) = self.meta_description {
            existing.meta_description = Set(meta_description);
        }
        if let Some(price) = self.price {
            existing.price = Set(price);
        }
        if let Some(compare_at_price) = self.compare_at_price {
            existing.compare_at_price = Set(compare_at_price);
        }
        if let Some(stock_quantity) = self.stock_quantity {
            existing.stock_quantity = Set(stock_quantity);
        }
        if let Some(low_stock_threshold) = self.low_stock_threshold {
            existing.low_stock_threshold = Set(low_stock_threshold);
        }
        if let Some(track_quantity) = self.track_quantity {
            existing.track_quantity = Set(track_quantity);
        }
        if let Some(models) = self.compatible_models {
            existing.compatible_models = Set(models.into_iter().collect::<CompatibleModels>().encode());
        }
        if let Some(weight) = self.weight {
            existing.weight = Set(weight);
        }
        if let Some(dimensions) = self.dimensions {
            existing.dimensions = Set(dimensions);
        }
        if let Some(is_active) = self.is_active {
            existing.is_active = Set(is_active);
        }
        if let Some(is_featured) = self.is_featured {
            existing.is_featured = Set(is_featured);
        }
        if let Some(category_id) = self.category_id {
            existing.category_id = Set(category_id);
        }
        existing.updated_at = Set(Utc::now());
        Ok(existing)
    }
}

#[async_trait]
impl CRUDResource for Product {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = ProductCreate;
    type UpdateModel = ProductUpdate;

    const ID_COLUMN: Self::ColumnType = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "product";
    const RESOURCE_NAME_PLURAL: &'static str = "products";
    const RESOURCE_DESCRIPTION: &'static str =
        "Catalog parts with pricing, stock and the vehicle models they fit.";

    async fn create(db: &DatabaseConnection, create_model: ProductCreate) -> Result<Self, ApiError> {
        products::create_product(db, create_model).await.map(Self::from)
    }

    async fn update(db: &DatabaseConnection, id: Uuid, update_model: ProductUpdate) -> Result<Self, ApiError> {
        products::update_product(db, id, update_model).await.map(Self::from)
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<Uuid, ApiError> {
        products::delete_product(db, id).await
    }

    fn default_index_column() -> Self::ColumnType {
        Column::Name
    }

    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("name", Column::Name),
            ("sku", Column::Sku),
            ("price", Column::Price),
            ("stock_quantity", Column::StockQuantity),
            ("created_at", Column::CreatedAt),
            ("updated_at", Column::UpdatedAt),
        ]
    }

    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", Column::Id),
            ("sku", Column::Sku),
            ("name", Column::Name),
            ("price", Column::Price),
            ("stock_quantity", Column::StockQuantity),
            ("category_id", Column::CategoryId),
            ("compatible_models", Column::CompatibleModels),
            ("is_active", Column::IsActive),
            ("is_featured", Column::IsFeatured),
        ]
    }

    fn like_filterable_columns() -> Vec<&'static str> {
        vec!["name", "compatible_models"]
    }
}
