//! Bulk Catalog Importer
//!
//! Rows are processed in order and in isolation: a row that fails validation,
//! collides with an existing SKU or cannot be stored is written to the
//! summary and the batch moves on. Rows that succeed stay committed whatever
//! happens to later rows.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::matcher::CategoryMatcher;
use crate::entities::product::{self, ProductCreate};
use crate::errors::ApiError;
use crate::slug::slugify;
use crate::validation::{ValidationError, ValidationErrors, validators};
use crate::vehicle::{CompatibleModels, VehicleModel};

pub const DEFAULT_STOCK_QUANTITY: i32 = 10;
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;
const SHORT_DESCRIPTION_CHARS: usize = 100;
const META_DESCRIPTION_CHARS: usize = 160;

/// Spreadsheet rows are numbered from 1 and the first one is the header
const ROW_NUMBER_OFFSET: usize = 2;

/// One feed row as parsed upstream; every field may be missing
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ImportRow {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    /// Comma-joined models, overriding the batch default
    pub compatible_models: Option<String>,
    pub stock_quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub track_quantity: Option<bool>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
    pub compare_at_price: Option<f64>,
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ImportRequest {
    pub rows: Vec<ImportRow>,
    /// Falls back to the server's configured model
    pub default_model: Option<VehicleModel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Validation,
    Duplicate,
    Persistence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportFailure {
    pub row: usize,
    pub sku: Option<String>,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportSummary {
    pub total: usize,
    pub successful: usize,
    /// Includes duplicates
    pub failed: usize,
    pub duplicates: usize,
    pub failures: Vec<ImportFailure>,
    pub categories_created: Vec<String>,
    pub default_model: VehicleModel,
}

impl ImportSummary {
    fn new(total: usize, default_model: VehicleModel) -> Self {
        Self {
            total,
            successful: 0,
            failed: 0,
            duplicates: 0,
            failures: Vec::new(),
            categories_created: Vec::new(),
            default_model,
        }
    }

    fn record(&mut self, failure: ImportFailure) {
        warn!(
            row = failure.row,
            sku = failure.sku.as_deref().unwrap_or(""),
            kind = ?failure.kind,
            "import row skipped: {}",
            failure.message
        );
        if failure.kind == FailureKind::Duplicate {
            self.duplicates += 1;
        }
        self.failed += 1;
        self.failures.push(failure);
    }
}

/// A row that passed validation, with feed values converted for storage
#[derive(Debug, Clone, PartialEq)]
struct CheckedRow {
    name: String,
    sku: String,
    price: Decimal,
    compare_at_price: Option<Decimal>,
    weight: Option<Decimal>,
    stock_quantity: i32,
    low_stock_threshold: i32,
    models: Option<CompatibleModels>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Absent and zero both mean "use the default"
fn quantity_or_default(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<i64>,
    default: i32,
) -> i32 {
    match value {
        None | Some(0) => default,
        Some(raw) => {
            if let Err(err) = validators::validate_non_negative(field, raw) {
                errors.add(err);
                return default;
            }
            i32::try_from(raw).unwrap_or_else(|_| {
                errors.add(ValidationError::new(field, "is too large"));
                default
            })
        }
    }
}

fn optional_amount(errors: &mut ValidationErrors, field: &str, value: Option<f64>) -> Option<Decimal> {
    let value = value?;
    match validators::validate_feed_price(field, Some(value)) {
        Ok(amount) => Some(amount),
        Err(err) => {
            errors.add(err);
            None
        }
    }
}

fn check_row(row: &ImportRow) -> Result<CheckedRow, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = non_blank(row.name.as_ref()).unwrap_or_default().to_string();
    errors.check(validators::validate_required("name", &name));
    if !name.is_empty() && slugify(&name).is_empty() {
        errors.add(ValidationError::new("name", "must contain at least one letter or digit"));
    }

    let sku = non_blank(row.sku.as_ref()).unwrap_or_default().to_string();
    errors.check(validators::validate_required("sku", &sku));

    let price = match validators::validate_feed_price("price", row.price) {
        Ok(price) => price,
        Err(err) => {
            errors.add(err);
            Decimal::ZERO
        }
    };
    let compare_at_price = optional_amount(&mut errors, "compare_at_price", row.compare_at_price);
    let weight = optional_amount(&mut errors, "weight", row.weight);

    let stock_quantity = quantity_or_default(
        &mut errors,
        "stock_quantity",
        row.stock_quantity,
        DEFAULT_STOCK_QUANTITY,
    );
    let low_stock_threshold = quantity_or_default(
        &mut errors,
        "low_stock_threshold",
        row.low_stock_threshold,
        DEFAULT_LOW_STOCK_THRESHOLD,
    );

    let models = match non_blank(row.compatible_models.as_ref()).map(str::parse::<CompatibleModels>) {
        Some(Ok(models)) if !models.is_empty() => Some(models),
        Some(Err(err)) => {
            errors.add(ValidationError::new("compatible_models", err.to_string()));
            None
        }
        _ => None,
    };

    errors.result().map(|()| CheckedRow {
        name,
        sku,
        price,
        compare_at_price,
        weight,
        stock_quantity,
        low_stock_threshold,
        models,
    })
}

async fn sku_exists(db: &DatabaseConnection, sku: &str) -> Result<bool, DbErr> {
    let count = product::Entity::find()
        .filter(product::Column::Sku.eq(sku))
        .count(db)
        .await?;
    Ok(count > 0)
}

async fn available_slug(db: &DatabaseConnection, name: &str, sku: &str) -> Result<String, DbErr> {
    let slug = slugify(name);
    let taken = product::Entity::find()
        .filter(product::Column::Slug.eq(slug.as_str()))
        .count(db)
        .await?
        > 0;
    if taken {
        Ok(slugify(&format!("{name} {sku}")))
    } else {
        Ok(slug)
    }
}

fn product_payload(row: &ImportRow, checked: CheckedRow, category_id: Uuid, default_model: VehicleModel) -> ProductCreate {
    let description = non_blank(row.description.as_ref()).map(str::to_string);
    let meta_source = description.as_deref().unwrap_or(&checked.name);
    let models = checked
        .models
        .unwrap_or_else(|| CompatibleModels::single(default_model));

    ProductCreate {
        short_description: Some(truncate_chars(&checked.name, SHORT_DESCRIPTION_CHARS)),
        meta_description: Some(truncate_chars(meta_source, META_DESCRIPTION_CHARS)),
        description,
        sku: checked.sku,
        name: checked.name,
        price: checked.price,
        compare_at_price: checked.compare_at_price,
        stock_quantity: Some(checked.stock_quantity),
        low_stock_threshold: Some(checked.low_stock_threshold),
        track_quantity: Some(row.track_quantity != Some(false)),
        compatible_models: models.models().to_vec(),
        weight: checked.weight,
        dimensions: non_blank(row.dimensions.as_ref()).map(str::to_string),
        is_active: Some(row.is_active != Some(false)),
        is_featured: Some(false),
        category_id,
    }
}

/// What happened to a single row that got past validation
enum RowOutcome {
    Imported,
    Duplicate,
}

async fn import_row(
    db: &DatabaseConnection,
    matcher: &mut CategoryMatcher,
    row: &ImportRow,
    checked: CheckedRow,
    default_model: VehicleModel,
) -> Result<RowOutcome, DbErr> {
    let label = non_blank(row.subcategory.as_ref())
        .or_else(|| non_blank(row.category.as_ref()))
        .unwrap_or_default();
    let category_id = matcher.resolve(db, label, default_model).await?;

    if sku_exists(db, &checked.sku).await? {
        return Ok(RowOutcome::Duplicate);
    }

    let slug = available_slug(db, &checked.name, &checked.sku).await?;
    product_payload(row, checked, category_id, default_model)
        .into_active_model(slug)
        .insert(db)
        .await?;
    Ok(RowOutcome::Imported)
}

/// Import a batch of feed rows
///
/// # Errors
///
/// Only fails when the category snapshot cannot be loaded before the first
/// row; every per-row problem ends up in the returned summary.
pub async fn import_products(
    db: &DatabaseConnection,
    rows: &[ImportRow],
    default_model: VehicleModel,
) -> Result<ImportSummary, ApiError> {
    let mut summary = ImportSummary::new(rows.len(), default_model);
    let mut matcher = CategoryMatcher::load(db).await?;
    info!(rows = rows.len(), default_model = %default_model, "starting product import");

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + ROW_NUMBER_OFFSET;
        let sku = non_blank(row.sku.as_ref()).map(str::to_string);

        let checked = match check_row(row) {
            Ok(checked) => checked,
            Err(errors) => {
                summary.record(ImportFailure {
                    row: row_number,
                    sku,
                    kind: FailureKind::Validation,
                    message: errors.joined(),
                });
                continue;
            }
        };

        match import_row(db, &mut matcher, row, checked, default_model).await {
            Ok(RowOutcome::Imported) => summary.successful += 1,
            Ok(RowOutcome::Duplicate) => {
                let message = format!(
                    "A product with SKU '{}' already exists",
                    sku.as_deref().unwrap_or_default()
                );
                summary.record(ImportFailure {
                    row: row_number,
                    sku,
                    kind: FailureKind::Duplicate,
                    message,
                });
            }
            Err(err) => summary.record(ImportFailure {
                row: row_number,
                sku,
                kind: FailureKind::Persistence,
                message: err.to_string(),
            }),
        }
    }

    summary.categories_created = matcher.into_categories_created();
    info!(
        total = summary.total,
        successful = summary.successful,
        failed = summary.failed,
        duplicates = summary.duplicates,
        categories_created = summary.categories_created.len(),
        "product import finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, sku: &str, price: f64) -> ImportRow {
        ImportRow {
            name: Some(name.to_string()),
            sku: Some(sku.to_string()),
            price: Some(price),
            ..Default::default()
        }
    }

    #[test]
    fn test_check_row_applies_quantity_defaults() {
        let checked = check_row(&row("Brake Pad", "BP-1", 49.99)).unwrap();
        assert_eq!(checked.price, Decimal::new(4999, 2));
        assert_eq!(checked.stock_quantity, DEFAULT_STOCK_QUANTITY);
        assert_eq!(checked.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);

        let zeroes = ImportRow {
            stock_quantity: Some(0),
            low_stock_threshold: Some(0),
            ..row("Brake Pad", "BP-1", 1.0)
        };
        let checked = check_row(&zeroes).unwrap();
        assert_eq!(checked.stock_quantity, DEFAULT_STOCK_QUANTITY);
        assert_eq!(checked.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
    }

    #[test]
    fn test_check_row_joins_every_violation() {
        let bad = ImportRow {
            name: Some("  ".into()),
            sku: None,
            price: Some(-1.0),
            stock_quantity: Some(-3),
            compatible_models: Some("MODEL_Y,Roadster".into()),
            ..Default::default()
        };
        let message = check_row(&bad).unwrap_err().joined();
        assert_eq!(
            message,
            "name: This field is required; sku: This field is required; \
             price: must not be negative; stock_quantity: must not be negative; \
             compatible_models: unknown vehicle model 'Roadster'"
        );
    }

    #[test]
    fn test_check_row_missing_and_non_finite_price() {
        let missing = ImportRow {
            price: None,
            ..row("Brake Pad", "BP-1", 0.0)
        };
        assert!(check_row(&missing).unwrap_err().joined().contains("price"));
        assert!(check_row(&row("Brake Pad", "BP-1", f64::NAN)).is_err());
        assert!(check_row(&row("Brake Pad", "BP-1", 0.0)).is_ok());
    }

    #[test]
    fn test_payload_defaults_and_truncation() {
        let long_name = "X".repeat(150);
        let feed_row = ImportRow {
            track_quantity: None,
            is_active: Some(false),
            ..row(&long_name, "LONG-1", 5.0)
        };
        let checked = check_row(&feed_row).unwrap();
        let payload = product_payload(&feed_row, checked, Uuid::new_v4(), VehicleModel::ModelY);

        assert_eq!(payload.short_description.as_ref().unwrap().chars().count(), 100);
        assert_eq!(payload.meta_description.as_ref().unwrap().chars().count(), 150);
        assert_eq!(payload.track_quantity, Some(true));
        assert_eq!(payload.is_active, Some(false));
        assert_eq!(payload.is_featured, Some(false));
        assert_eq!(payload.compatible_models, vec![VehicleModel::ModelY]);
    }

    #[test]
    fn test_payload_prefers_row_models_and_description() {
        let feed_row = ImportRow {
            compatible_models: Some("Model 3, Model Y".into()),
            description: Some("D".repeat(200)),
            ..row("Mirror", "MR-1", 5.0)
        };
        let checked = check_row(&feed_row).unwrap();
        let payload = product_payload(&feed_row, checked, Uuid::new_v4(), VehicleModel::Cybertruck);

        assert_eq!(payload.compatible_models, vec![VehicleModel::Model3, VehicleModel::ModelY]);
        assert_eq!(payload.meta_description.unwrap(), "D".repeat(160));
    }
}
