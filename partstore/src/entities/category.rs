use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::Set, Condition, DatabaseConnection, Order, QueryOrder, QuerySelect, entity::prelude::*,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::tree;
use crate::core::{CRUDResource, MergeIntoActiveModel};
use crate::errors::ApiError;
use crate::slug::slugify;
use crate::validation::{Validatable, ValidationErrors, validators};

/// Root → Main → Sub
pub const MAX_LEVEL: i32 = 3;
pub const MAX_NAME_LENGTH: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub level: i32,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(belongs_to = "Entity", from = "Column::ParentId", to = "Column::Id")]
    Parent,

    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Category as returned by the API, annotated with product counts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub level: i32,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Products assigned to this category itself
    pub product_count: u64,
    /// Products assigned to this category or any descendant
    pub total_product_count: u64,
}

impl Category {
    #[must_use]
    pub fn with_counts(mut self, direct: u64, total: u64) -> Self {
        self.product_count = direct;
        self.total_product_count = total;
        self
    }
}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            level: model.level,
            parent_id: model.parent_id,
            sort_order: model.sort_order,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            product_count: 0,
            total_product_count: 0,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    /// Ignored when `parent_id` is given; the level follows the parent
    pub level: Option<i32>,
    pub is_active: Option<bool>,
}

impl Validatable for CategoryCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validators::validate_required("name", &self.name));
        errors.check(validators::validate_max_length("name", self.name.trim(), MAX_NAME_LENGTH));
        if let Some(level) = self.level {
            errors.check(validators::validate_range("level", level.into(), 1, MAX_LEVEL.into()));
        }
        errors.result()
    }
}

/// Partial update. The parent cannot change; moving subtrees is not supported.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl Validatable for CategoryUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(validators::validate_required("name", name));
            errors.check(validators::validate_max_length("name", name.trim(), MAX_NAME_LENGTH));
        }
        errors.result()
    }
}

impl MergeIntoActiveModel<ActiveModel> for CategoryUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, DbErr> {
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            existing.slug = Set(slugify(&name));
            existing.name = Set(name);
        }
        if let Some(description) = self.description {
            existing.description = Set(description);
        }
        if let Some(sort_order) = self.sort_order {
            existing.sort_order = Set(sort_order);
        }
        if let Some(is_active) = self.is_active {
            existing.is_active = Set(is_active);
        }
        existing.updated_at = Set(Utc::now());
        Ok(existing)
    }
}

#[async_trait]
impl CRUDResource for Category {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = CategoryCreate;
    type UpdateModel = CategoryUpdate;

    const ID_COLUMN: Self::ColumnType = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "category";
    const RESOURCE_NAME_PLURAL: &'static str = "categories";
    const RESOURCE_DESCRIPTION: &'static str =
        "Three-level catalog hierarchy (root, main, sub) that products are filed under.";

    async fn get_all(
        db: &DatabaseConnection,
        condition: &Condition,
        order_column: Column,
        order_direction: Order,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self>, ApiError> {
        let page = Entity::find()
            .filter(condition.clone())
            .order_by(order_column, order_direction)
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::Name)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;
        tree::annotate_page(db, page).await
    }

    async fn get_one(db: &DatabaseConnection, id: Uuid) -> Result<Self, ApiError> {
        tree::get_category(db, id).await
    }

    async fn create(db: &DatabaseConnection, create_model: CategoryCreate) -> Result<Self, ApiError> {
        tree::create_category(db, create_model).await.map(Self::from)
    }

    async fn update(db: &DatabaseConnection, id: Uuid, update_model: CategoryUpdate) -> Result<Self, ApiError> {
        tree::update_category(db, id, update_model).await?;
        tree::get_category(db, id).await
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<Uuid, ApiError> {
        tree::delete_category(db, id).await
    }

    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("name", Column::Name),
            ("level", Column::Level),
            ("sort_order", Column::SortOrder),
            ("created_at", Column::CreatedAt),
        ]
    }

    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("level", Column::Level),
            ("parent_id", Column::ParentId),
            ("is_active", Column::IsActive),
        ]
    }

    fn like_filterable_columns() -> Vec<&'static str> {
        vec!["name"]
    }
}
