//! Catalog core: the category tree, aggregate counts, label matching and bulk import.

pub mod aggregate;
pub mod importer;
pub mod matcher;
pub mod products;
pub mod tree;

pub use aggregate::{CountNode, MAX_TREE_DEPTH, aggregate_counts, total_for};
pub use importer::{FailureKind, ImportFailure, ImportRequest, ImportRow, ImportSummary, import_products};
pub use matcher::{CategoryMatcher, UNCATEGORIZED};
pub use tree::{CatalogSnapshot, CategoryTreeNode};
