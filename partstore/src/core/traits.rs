use async_trait::async_trait;
use sea_orm::{
    Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryOrder, QuerySelect,
    entity::prelude::*,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::validation::Validatable;

pub trait MergeIntoActiveModel<ActiveModelType> {
    /// Merge this update model into an existing active model
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if a value cannot be converted for storage.
    fn merge_into_activemodel(self, existing: ActiveModelType) -> Result<ActiveModelType, DbErr>;
}

/// A catalog entity exposed through the HTTP surface.
///
/// Reads get default implementations. Writes are required because every
/// resource guards them differently (sibling uniqueness for categories, SKU
/// uniqueness and image cascades for products).
#[async_trait]
pub trait CRUDResource: Sized + Send + Sync
where
    Self: From<<Self::EntityType as EntityTrait>::Model>,
{
    type EntityType: EntityTrait<Model: Sync> + Sync;
    type ColumnType: ColumnTrait + Copy + std::fmt::Debug;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType> + ActiveModelBehavior + Send + Sync;
    type CreateModel: Validatable + Send;
    type UpdateModel: Validatable + Send + Sync + MergeIntoActiveModel<Self::ActiveModelType>;

    const ID_COLUMN: Self::ColumnType;
    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;
    const RESOURCE_DESCRIPTION: &'static str = "";

    async fn get_all(
        db: &DatabaseConnection,
        condition: &Condition,
        order_column: Self::ColumnType,
        order_direction: Order,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self>, ApiError> {
        let models = Self::EntityType::find()
            .filter(condition.clone())
            .order_by(order_column, order_direction)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from).collect())
    }

    async fn get_one(db: &DatabaseConnection, id: Uuid) -> Result<Self, ApiError> {
        let model = Self::EntityType::find()
            .filter(Self::ID_COLUMN.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found(Self::RESOURCE_NAME_SINGULAR, Some(id.to_string())))?;
        Ok(Self::from(model))
    }

    async fn total_count(db: &DatabaseConnection, condition: &Condition) -> Result<u64, ApiError> {
        let query = Self::EntityType::find().filter(condition.clone());
        Ok(PaginatorTrait::count(query, db).await?)
    }

    async fn create(db: &DatabaseConnection, create_model: Self::CreateModel) -> Result<Self, ApiError>;

    async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        update_model: Self::UpdateModel,
    ) -> Result<Self, ApiError>;

    async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<Uuid, ApiError>;

    #[must_use]
    fn default_index_column() -> Self::ColumnType {
        Self::ID_COLUMN
    }

    #[must_use]
    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", Self::ID_COLUMN)]
    }

    #[must_use]
    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", Self::ID_COLUMN)]
    }

    /// Text columns matched with a case-insensitive `LIKE` instead of equality
    #[must_use]
    fn like_filterable_columns() -> Vec<&'static str> {
        vec![]
    }
}
