use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{Validatable, ValidationError, ValidationErrors, validators};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for ProductImage {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            url: model.url,
            alt_text: model.alt_text,
            sort_order: model.sort_order,
            is_primary: model.is_primary,
            created_at: model.created_at,
        }
    }
}

/// Attaches a URL already produced by the storage service
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct ProductImageCreate {
    pub url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl Validatable for ProductImageCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validators::validate_required("url", &self.url));
        let url = self.url.trim();
        if !url.is_empty() && !(url.starts_with("https://") || url.starts_with("http://")) {
            errors.add(ValidationError::new("url", "must be an http(s) URL"));
        }
        errors.result()
    }
}
