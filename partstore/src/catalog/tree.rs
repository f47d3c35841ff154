//! Category Tree Store
//!
//! Three-level hierarchy (root, main, sub). A category's level always equals
//! its parent's level plus one, and names and slugs are unique among
//! siblings. Writes run inside a transaction so the sibling checks and the
//! insert or update they guard see the same state.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
    sea_query::{Expr, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use super::aggregate::{CountNode, MAX_TREE_DEPTH, aggregate_counts};
use crate::core::MergeIntoActiveModel;
use crate::entities::category::{self, Category, CategoryCreate, CategoryUpdate, MAX_LEVEL};
use crate::entities::product;
use crate::errors::ApiError;
use crate::slug::slugify;
use crate::validation::{Validatable, ValidationError};

/// Fields of a category about to be inserted, already checked by the caller
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub level: i32,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    pub is_active: bool,
}

/// Nested view of the catalog; each node carries its own counts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryTreeNode {
    #[serde(flatten)]
    pub category: Category,
    #[schema(no_recursion)]
    pub children: Vec<CategoryTreeNode>,
}

/// All categories in store order plus the direct product count of each
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub categories: Vec<category::Model>,
    pub direct_counts: HashMap<Uuid, u64>,
}

impl CatalogSnapshot {
    /// One query for the categories and one grouped count over products
    ///
    /// # Errors
    ///
    /// Returns the storage error if either query fails.
    pub async fn load<C: ConnectionTrait>(conn: &C) -> Result<Self, sea_orm::DbErr> {
        let categories = load_categories(conn).await?;
        let rows: Vec<(Uuid, i64)> = product::Entity::find()
            .select_only()
            .column(product::Column::CategoryId)
            .column_as(Expr::col(product::Column::Id).count(), "product_count")
            .group_by(product::Column::CategoryId)
            .into_tuple()
            .all(conn)
            .await?;
        let direct_counts = rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
            .collect();
        Ok(Self {
            categories,
            direct_counts,
        })
    }

    #[must_use]
    pub fn count_nodes(&self) -> Vec<CountNode> {
        self.categories
            .iter()
            .map(|c| CountNode {
                id: c.id,
                parent_id: c.parent_id,
                direct_count: self.direct_counts.get(&c.id).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Every category with its direct and aggregate counts, in store order
    #[must_use]
    pub fn annotated(&self) -> Vec<Category> {
        self.annotate(self.categories.clone())
    }

    /// Counts for any subset of the snapshot's categories, keeping input order
    #[must_use]
    pub fn annotate(&self, models: Vec<category::Model>) -> Vec<Category> {
        let totals = aggregate_counts(&self.count_nodes());
        models
            .into_iter()
            .map(|model| {
                let direct = self.direct_counts.get(&model.id).copied().unwrap_or(0);
                let total = totals.get(&model.id).copied().unwrap_or(direct);
                Category::from(model).with_counts(direct, total)
            })
            .collect()
    }
}

/// Categories ordered by level, sort order, then name
///
/// # Errors
///
/// Returns the storage error if the query fails.
pub async fn load_categories<C: ConnectionTrait>(conn: &C) -> Result<Vec<category::Model>, sea_orm::DbErr> {
    category::Entity::find()
        .order_by_asc(category::Column::Level)
        .order_by_asc(category::Column::SortOrder)
        .order_by_asc(category::Column::Name)
        .all(conn)
        .await
}

fn parent_scope(parent_id: Option<Uuid>) -> SimpleExpr {
    match parent_id {
        Some(parent) => category::Column::ParentId.eq(parent),
        None => category::Column::ParentId.is_null(),
    }
}

async fn ensure_unique_among_siblings<C: ConnectionTrait>(
    conn: &C,
    parent_id: Option<Uuid>,
    name: &str,
    slug: &str,
    exclude: Option<Uuid>,
) -> Result<(), ApiError> {
    let mut query = category::Entity::find().filter(parent_scope(parent_id)).filter(
        Condition::any()
            .add(category::Column::Name.eq(name))
            .add(category::Column::Slug.eq(slug)),
    );
    if let Some(id) = exclude {
        query = query.filter(category::Column::Id.ne(id));
    }

    match query.one(conn).await? {
        Some(existing) if existing.name == name => Err(ApiError::conflict(format!(
            "A category named '{name}' already exists at this level"
        ))),
        Some(_) => Err(ApiError::conflict(format!(
            "A category with slug '{slug}' already exists at this level"
        ))),
        None => Ok(()),
    }
}

/// `max(sibling sort order) + 1`, or 1 for the first child
async fn next_sort_order<C: ConnectionTrait>(conn: &C, parent_id: Option<Uuid>) -> Result<i32, sea_orm::DbErr> {
    let max: Option<Option<i32>> = category::Entity::find()
        .select_only()
        .column_as(Expr::col(category::Column::SortOrder).max(), "max_sort_order")
        .filter(parent_scope(parent_id))
        .into_tuple()
        .one(conn)
        .await?;
    Ok(max.flatten().map_or(1, |m| m.saturating_add(1)))
}

fn slug_for(name: &str) -> Result<String, ApiError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ValidationError::new("name", "must contain at least one letter or digit").into());
    }
    Ok(slug)
}

/// Insert without any checks; unique violations surface as the raw `DbErr`
///
/// # Errors
///
/// Returns the storage error, including unique-index violations.
pub async fn insert_category<C: ConnectionTrait>(conn: &C, new: NewCategory) -> Result<category::Model, sea_orm::DbErr> {
    let now = Utc::now();
    category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new.name),
        slug: Set(new.slug),
        description: Set(new.description),
        level: Set(new.level),
        parent_id: Set(new.parent_id),
        sort_order: Set(new.sort_order),
        is_active: Set(new.is_active),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// Create a category under an optional parent
///
/// # Errors
///
/// `ValidationFailed` for a blank name, an out-of-range level, a missing
/// parent or a parent at the deepest level. `Conflict` when a sibling already
/// uses the name or slug.
pub async fn create_category(db: &DatabaseConnection, create: CategoryCreate) -> Result<category::Model, ApiError> {
    create.validate()?;
    let name = create.name.trim().to_string();
    let slug = slug_for(&name)?;

    let txn = db.begin().await?;
    let level = match create.parent_id {
        Some(parent_id) => {
            let parent = category::Entity::find_by_id(parent_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ValidationError::new("parent_id", "Parent category does not exist"))?;
            parent.level + 1
        }
        None => 1,
    };
    if level > MAX_LEVEL {
        return Err(ValidationError::new(
            "parent_id",
            format!("Categories can be nested at most {MAX_LEVEL} levels deep"),
        )
        .into());
    }

    ensure_unique_among_siblings(&txn, create.parent_id, &name, &slug, None).await?;
    let sort_order = next_sort_order(&txn, create.parent_id).await?;

    let model = insert_category(
        &txn,
        NewCategory {
            name,
            slug,
            description: create.description,
            level,
            parent_id: create.parent_id,
            sort_order,
            is_active: create.is_active.unwrap_or(true),
        },
    )
    .await?;
    txn.commit().await?;

    debug!(category = %model.name, level = model.level, "created category");
    Ok(model)
}

/// Category with its direct and aggregate product counts
///
/// # Errors
///
/// `NotFound` for an unknown id.
pub async fn get_category(db: &DatabaseConnection, id: Uuid) -> Result<Category, ApiError> {
    let snapshot = CatalogSnapshot::load(db).await?;
    snapshot
        .annotated()
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| ApiError::not_found("category", Some(id.to_string())))
}

/// # Errors
///
/// `NotFound` for an unknown id, `Conflict` when a rename collides with a sibling.
pub async fn update_category(
    db: &DatabaseConnection,
    id: Uuid,
    update: CategoryUpdate,
) -> Result<category::Model, ApiError> {
    update.validate()?;

    let txn = db.begin().await?;
    let existing = category::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("category", Some(id.to_string())))?;

    if let Some(name) = &update.name {
        let name = name.trim();
        let slug = slug_for(name)?;
        ensure_unique_among_siblings(&txn, existing.parent_id, name, &slug, Some(id)).await?;
    }

    let active = update.merge_into_activemodel(existing.into_active_model())?;
    let model = active.update(&txn).await?;
    txn.commit().await?;
    Ok(model)
}

async fn subtree_ids<C: ConnectionTrait>(conn: &C, roots: Vec<Uuid>) -> Result<Vec<Uuid>, sea_orm::DbErr> {
    let mut seen: HashSet<Uuid> = roots.iter().copied().collect();
    let mut all = roots.clone();
    let mut frontier = roots;
    let mut depth = 1;

    while !frontier.is_empty() && depth < MAX_TREE_DEPTH {
        let next: Vec<Uuid> = category::Entity::find()
            .select_only()
            .column(category::Column::Id)
            .filter(category::Column::ParentId.is_in(frontier))
            .into_tuple()
            .all(conn)
            .await?;
        frontier = next.into_iter().filter(|id| seen.insert(*id)).collect();
        all.extend(frontier.iter().copied());
        depth += 1;
    }
    Ok(all)
}

/// Delete a category that owns no products.
///
/// Children move up to the deleted category's parent and their whole subtree
/// moves up one level, all in the same transaction as the delete.
///
/// # Errors
///
/// `NotFound` for an unknown id. `Conflict` when products are still assigned
/// directly, or when a promoted child would collide with a category already at
/// its new level.
pub async fn delete_category(db: &DatabaseConnection, id: Uuid) -> Result<Uuid, ApiError> {
    let txn = db.begin().await?;
    let existing = category::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("category", Some(id.to_string())))?;

    let assigned = product::Entity::find()
        .filter(product::Column::CategoryId.eq(id))
        .count(&txn)
        .await?;
    if assigned > 0 {
        return Err(ApiError::conflict(format!(
            "Category '{}' still has {assigned} product(s) assigned",
            existing.name
        )));
    }

    let children = category::Entity::find()
        .filter(category::Column::ParentId.eq(id))
        .all(&txn)
        .await?;

    if !children.is_empty() {
        for child in &children {
            ensure_unique_among_siblings(&txn, existing.parent_id, &child.name, &child.slug, Some(id)).await?;
        }

        // The row is still referenced by its children until they move, so it
        // gives up its name and slug instead of being deleted first
        let placeholder = id.to_string();
        category::Entity::update_many()
            .col_expr(category::Column::Name, Expr::value(placeholder.clone()))
            .col_expr(category::Column::Slug, Expr::value(placeholder))
            .filter(category::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        let promoted = subtree_ids(&txn, children.iter().map(|c| c.id).collect()).await?;
        category::Entity::update_many()
            .col_expr(category::Column::Level, Expr::col(category::Column::Level).sub(1))
            .col_expr(category::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(category::Column::Id.is_in(promoted.clone()))
            .exec(&txn)
            .await?;
        category::Entity::update_many()
            .col_expr(category::Column::ParentId, Expr::value(existing.parent_id))
            .filter(category::Column::ParentId.eq(id))
            .exec(&txn)
            .await?;

        info!(
            category = %existing.name,
            promoted = promoted.len(),
            "promoted child categories of deleted category"
        );
    }

    category::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(id)
}

/// All categories in store order with their counts
///
/// # Errors
///
/// Returns a database error if loading the snapshot fails.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<Category>, ApiError> {
    Ok(CatalogSnapshot::load(db).await?.annotated())
}

/// Attach counts to a page of categories fetched by the caller
///
/// # Errors
///
/// Returns a database error if loading the snapshot fails.
pub async fn annotate_page(db: &DatabaseConnection, page: Vec<category::Model>) -> Result<Vec<Category>, ApiError> {
    Ok(CatalogSnapshot::load(db).await?.annotate(page))
}

/// Roots with their children nested recursively
///
/// # Errors
///
/// Returns a database error if loading the snapshot fails.
pub async fn category_tree(db: &DatabaseConnection) -> Result<Vec<CategoryTreeNode>, ApiError> {
    let snapshot = CatalogSnapshot::load(db).await?;
    Ok(build_tree(snapshot.annotated()))
}

fn attach(
    parent: Option<Uuid>,
    by_parent: &mut HashMap<Option<Uuid>, Vec<Category>>,
    depth: usize,
) -> Vec<CategoryTreeNode> {
    let Some(level) = by_parent.remove(&parent) else {
        return Vec::new();
    };
    level
        .into_iter()
        .map(|category| {
            let children = if depth < MAX_TREE_DEPTH {
                attach(Some(category.id), by_parent, depth + 1)
            } else {
                Vec::new()
            };
            CategoryTreeNode { category, children }
        })
        .collect()
}

/// Nest annotated categories; input order is kept among siblings
#[must_use]
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryTreeNode> {
    let ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut by_parent: HashMap<Option<Uuid>, Vec<Category>> = HashMap::new();
    for category in categories {
        let parent = category.parent_id.filter(|p| ids.contains(p) && *p != category.id);
        by_parent.entry(parent).or_default().push(category);
    }

    attach(None, &mut by_parent, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, parent_id: Option<Uuid>) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slugify(name),
            description: None,
            level: if parent_id.is_some() { 2 } else { 1 },
            parent_id,
            sort_order: 1,
            is_active: true,
            created_at: now,
            updated_at: now,
            product_count: 0,
            total_product_count: 0,
        }
    }

    #[test]
    fn test_build_tree_nests_children_in_order() {
        let body = category("Body", None);
        let doors = category("Doors", Some(body.id));
        let mirrors = category("Mirrors", Some(body.id));
        let brakes = category("Brakes", None);

        let tree = build_tree(vec![body.clone(), brakes, doors, mirrors]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.name, "Body");
        let child_names: Vec<&str> = tree[0].children.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(child_names, vec!["Doors", "Mirrors"]);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_build_tree_promotes_orphans_to_roots() {
        let orphan = category("Orphan", Some(Uuid::new_v4()));
        let tree = build_tree(vec![orphan]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_tree_node_serializes_flat_with_children() {
        let root = category("Body", None);
        let node = CategoryTreeNode {
            category: root,
            children: vec![],
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["name"], "Body");
        assert_eq!(json["total_product_count"], 0);
        assert!(json["children"].as_array().unwrap().is_empty());
    }
}
