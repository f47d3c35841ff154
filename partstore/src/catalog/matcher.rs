//! Category Matcher
//!
//! Resolves a free-text feed label to a category id. First match wins:
//!
//! 1. a category whose name equals the label exactly;
//! 2. a category whose name contains the label (first in store order), then
//!    the category with the longest name contained in the label (both
//!    case-insensitive);
//! 3. a new root category named after the label;
//! 4. the shared "Uncategorized" root.
//!
//! A matcher lives for one import batch. It loads the categories once and
//! keeps its own creations in that snapshot, so a label repeated across rows
//! resolves to the category created for its first occurrence.

use sea_orm::{ConnectionTrait, DbErr, SqlErr};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::tree::{self, NewCategory};
use crate::entities::category;
use crate::slug::slugify;
use crate::vehicle::VehicleModel;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Auto-created categories share this sort order and tie with each other
pub const AUTO_CREATED_SORT_ORDER: i32 = 999;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Index of the longest name found inside `label`; ties go to the earliest
fn longest_contained(names: &[String], label: &str) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (index, name) in names.iter().enumerate() {
        if name.is_empty() || !label.contains(name.as_str()) {
            continue;
        }
        let len = name.chars().count();
        if best.is_none_or(|(_, best_len)| len > best_len) {
            best = Some((index, len));
        }
    }
    best.map(|(index, _)| index)
}

#[derive(Debug, Default)]
pub struct CategoryMatcher {
    categories: Vec<category::Model>,
    created: Vec<String>,
}

impl CategoryMatcher {
    /// Snapshot the current categories in store order
    ///
    /// # Errors
    ///
    /// Returns the storage error if the categories cannot be loaded.
    pub async fn load<C: ConnectionTrait>(conn: &C) -> Result<Self, DbErr> {
        Ok(Self::from_snapshot(tree::load_categories(conn).await?))
    }

    /// Matcher over an already loaded snapshot, expected in store order
    #[must_use]
    pub fn from_snapshot(categories: Vec<category::Model>) -> Self {
        Self {
            categories,
            created: Vec::new(),
        }
    }

    /// Names of every category this matcher created, in creation order
    #[must_use]
    pub fn categories_created(&self) -> &[String] {
        &self.created
    }

    #[must_use]
    pub fn into_categories_created(self) -> Vec<String> {
        self.created
    }

    /// Match against the snapshot only, without creating anything
    #[must_use]
    pub fn find_existing(&self, label: &str) -> Option<&category::Model> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        if let Some(exact) = self.categories.iter().find(|c| c.name == label) {
            return Some(exact);
        }

        let needle = label.to_lowercase();
        let lowered: Vec<String> = self.categories.iter().map(|c| c.name.to_lowercase()).collect();
        lowered
            .iter()
            .position(|name| name.contains(&needle))
            .or_else(|| longest_contained(&lowered, &needle))
            .map(|index| &self.categories[index])
    }

    /// Resolve a label to a category id, creating a root category if nothing matches
    ///
    /// # Errors
    ///
    /// Returns a storage error only when even the "Uncategorized" fallback
    /// cannot be found or created.
    pub async fn resolve<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        label: &str,
        model: VehicleModel,
    ) -> Result<Uuid, DbErr> {
        let label = label.trim();
        if label.is_empty() || slugify(label).is_empty() {
            return self.uncategorized(conn).await;
        }
        if let Some(found) = self.find_existing(label) {
            return Ok(found.id);
        }

        match self.create_root(conn, label, model).await {
            Ok(id) => Ok(id),
            Err(err) if is_unique_violation(&err) => {
                debug!(label, "category creation raced a concurrent writer, reloading");
                self.reload(conn).await?;
                if let Some(found) = self.find_existing(label) {
                    return Ok(found.id);
                }
                match self.create_root(conn, label, model).await {
                    Ok(id) => Ok(id),
                    Err(err) => {
                        warn!(label, error = %err, "retry failed, filing under {UNCATEGORIZED}");
                        self.uncategorized(conn).await
                    }
                }
            }
            Err(err) => {
                warn!(label, error = %err, "could not create category, filing under {UNCATEGORIZED}");
                self.uncategorized(conn).await
            }
        }
    }

    async fn reload<C: ConnectionTrait>(&mut self, conn: &C) -> Result<(), DbErr> {
        self.categories = tree::load_categories(conn).await?;
        Ok(())
    }

    async fn create_root<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        label: &str,
        model: VehicleModel,
    ) -> Result<Uuid, DbErr> {
        let created = tree::insert_category(
            conn,
            NewCategory {
                name: label.to_string(),
                slug: slugify(label),
                description: Some(format!("Auto-created category for {label} ({model})")),
                level: 1,
                parent_id: None,
                sort_order: AUTO_CREATED_SORT_ORDER,
                is_active: true,
            },
        )
        .await?;
        info!(category = %created.name, "auto-created category");
        Ok(self.remember(created))
    }

    fn remember(&mut self, created: category::Model) -> Uuid {
        let id = created.id;
        self.created.push(created.name.clone());
        self.categories.push(created);
        id
    }

    fn find_uncategorized(&self) -> Option<Uuid> {
        self.categories
            .iter()
            .find(|c| c.parent_id.is_none() && c.name == UNCATEGORIZED)
            .map(|c| c.id)
    }

    async fn uncategorized<C: ConnectionTrait>(&mut self, conn: &C) -> Result<Uuid, DbErr> {
        if let Some(id) = self.find_uncategorized() {
            return Ok(id);
        }

        let inserted = tree::insert_category(
            conn,
            NewCategory {
                name: UNCATEGORIZED.to_string(),
                slug: slugify(UNCATEGORIZED),
                description: Some("Products imported without a matching category".to_string()),
                level: 1,
                parent_id: None,
                sort_order: AUTO_CREATED_SORT_ORDER,
                is_active: true,
            },
        )
        .await;

        match inserted {
            Ok(created) => {
                info!("created {UNCATEGORIZED} fallback category");
                Ok(self.remember(created))
            }
            Err(err) if is_unique_violation(&err) => {
                self.reload(conn).await?;
                self.find_uncategorized().ok_or(err)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn model(name: &str, level: i32, sort_order: i32) -> category::Model {
        let now = Utc::now();
        category::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slugify(name),
            description: None,
            level,
            parent_id: None,
            sort_order,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_exact_match_is_case_sensitive_and_preferred() {
        let brakes_lower = model("brakes", 1, 1);
        let brakes = model("Brakes", 1, 2);
        let expected = brakes.id;
        let matcher = CategoryMatcher::from_snapshot(vec![brakes_lower, brakes]);
        assert_eq!(matcher.find_existing("Brakes").unwrap().id, expected);
    }

    #[test]
    fn test_category_name_containing_label_matches() {
        let pads = model("Brake Pads", 1, 1);
        let expected = pads.id;
        let matcher = CategoryMatcher::from_snapshot(vec![model("Body", 1, 2), pads]);
        assert_eq!(matcher.find_existing("brake").unwrap().id, expected);
    }

    #[test]
    fn test_label_containing_category_name_matches() {
        let body = model("10 - BODY", 2, 1);
        let expected = body.id;
        let matcher = CategoryMatcher::from_snapshot(vec![model("Interior", 1, 1), body]);
        assert_eq!(matcher.find_existing("Model Y - 10 - BODY").unwrap().id, expected);
    }

    #[test]
    fn test_longest_contained_name_beats_a_shallower_prefix() {
        let root = model("Model Y", 1, 1);
        let body = model("10 - BODY", 2, 1);
        let expected = body.id;
        let matcher = CategoryMatcher::from_snapshot(vec![root, body]);
        assert_eq!(matcher.find_existing("Model Y - 10 - BODY").unwrap().id, expected);
    }

    #[test]
    fn test_longest_contained_ties_keep_store_order() {
        let front = model("Doors", 1, 1);
        let expected = front.id;
        let matcher = CategoryMatcher::from_snapshot(vec![front, model("Parts", 1, 2)]);
        assert_eq!(matcher.find_existing("Doors and Parts kit").unwrap().id, expected);
    }

    #[test]
    fn test_first_match_in_store_order_wins() {
        let first = model("Front Lights", 1, 1);
        let expected = first.id;
        let matcher = CategoryMatcher::from_snapshot(vec![first, model("Rear Lights", 1, 2)]);
        assert_eq!(matcher.find_existing("lights").unwrap().id, expected);
    }

    #[test]
    fn test_no_match_and_blank_labels() {
        let matcher = CategoryMatcher::from_snapshot(vec![model("Body", 1, 1)]);
        assert!(matcher.find_existing("Charging").is_none());
        assert!(matcher.find_existing("   ").is_none());
        assert!(matcher.categories_created().is_empty());
    }
}
