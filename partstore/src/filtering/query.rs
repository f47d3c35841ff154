use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for filtering, pagination, and sorting list endpoints.
///
/// # Filtering
/// `filter` is a JSON object:
/// - free text over the resource's text columns: `{"q": "brake"}`
/// - exact or case-insensitive match on a column: `{"sku": "BP-1"}`
/// - several ids at once: `{"id": ["…", "…"]}`
/// - numeric comparisons with `_gte`, `_lte`, `_gt`, `_lt`, `_neq`: `{"price_lte": 100}`
///
/// # Pagination
/// Either React-Admin style `range=[0,9]` or `page=1&per_page=10`. Pages are
/// capped at 100 items.
///
/// # Sorting
/// `sort=["price","DESC"]`, or `sort_by=price&order=DESC`.
#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct FilterOptions {
    /// JSON-encoded filter object
    #[param(example = json!({"q": "brake", "is_active": true}))]
    pub filter: Option<String>,
    /// Inclusive range `[start, end]`
    #[param(example = "[0,9]")]
    pub range: Option<String>,
    /// 1-based page number, used together with `per_page`
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 10)]
    pub per_page: Option<u64>,
    /// `["column", "ASC" | "DESC"]`, or a bare column name
    #[param(example = r#"["name", "ASC"]"#)]
    pub sort: Option<String>,
    #[param(example = "name")]
    pub sort_by: Option<String>,
    #[param(example = "ASC")]
    pub order: Option<String>,
}
