//! # List Queries
//!
//! Translates list query parameters into Sea-ORM conditions, ordering and
//! paging, and builds the `Content-Range` header React-Admin expects.
//!
//! ```rust,ignore
//! // Products under a category, cheapest first
//! GET /api/products?filter={"category_id":"…","is_active":true}&sort=["price","ASC"]&range=[0,24]
//!
//! // Free text over the resource's text columns
//! GET /api/products?filter={"q":"brake"}
//!
//! // Numeric comparisons
//! GET /api/products?filter={"price_lte":100,"stock_quantity_gt":0}
//!
//! // Standard REST paging
//! GET /api/categories?page=2&per_page=20&sort_by=name&order=DESC
//! ```

pub mod conditions;
pub mod pagination;
pub mod query;
pub mod sort;

pub use conditions::{apply_filters, parse_pagination, parse_range};
pub use pagination::calculate_content_range;
pub use query::FilterOptions;
pub use sort::parse_sorting;
