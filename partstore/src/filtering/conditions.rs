use sea_orm::{
    ColumnTrait, Condition,
    sea_query::{Expr, Func, SimpleExpr},
};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use super::query::FilterOptions;
use crate::core::CRUDResource;
use crate::errors::ApiError;

const MAX_FIELD_VALUE_LENGTH: usize = 10_000;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Split a React-Admin comparison suffix off a filter key
fn parse_comparison_operator(key: &str) -> Option<(&str, &'static str)> {
    [("_gte", ">="), ("_lte", "<="), ("_gt", ">"), ("_lt", "<"), ("_neq", "!=")]
        .into_iter()
        .find_map(|(suffix, op)| key.strip_suffix(suffix).map(|base| (base, op)))
}

fn compare<C: ColumnTrait, V: Into<sea_orm::Value>>(column: C, operator: &str, value: V) -> SimpleExpr {
    match operator {
        ">=" => column.gte(value),
        "<=" => column.lte(value),
        ">" => column.gt(value),
        "<" => column.lt(value),
        "!=" => column.ne(value),
        _ => column.eq(value),
    }
}

fn number_expr<C: ColumnTrait>(column: C, operator: &str, number: &Number) -> Option<SimpleExpr> {
    if let Some(int_value) = number.as_i64() {
        Some(compare(column, operator, int_value))
    } else {
        number.as_f64().map(|float_value| compare(column, operator, float_value))
    }
}

fn upper<C: ColumnTrait>(column: C) -> SimpleExpr {
    SimpleExpr::FunctionCall(Func::upper(Expr::col(column)))
}

/// Case-insensitive substring match, with the pattern bound as a parameter
fn like_expr<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    upper(column).like(format!("%{}%", needle.to_uppercase()))
}

fn string_expr<T: CRUDResource>(key: &str, value: &str, column: T::ColumnType) -> Option<SimpleExpr> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_FIELD_VALUE_LENGTH {
        return None;
    }
    if T::like_filterable_columns().contains(&key) {
        return Some(like_expr(column, trimmed));
    }
    if let Ok(uuid) = Uuid::parse_str(trimmed) {
        return Some(column.eq(uuid));
    }
    Some(upper(column).eq(trimmed.to_uppercase()))
}

fn array_expr<C: ColumnTrait>(column: C, values: &[Value]) -> Option<SimpleExpr> {
    if values.is_empty() {
        return None;
    }
    let uuids: Option<Vec<Uuid>> = values
        .iter()
        .map(|v| v.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok()))
        .collect();
    if let Some(uuids) = uuids {
        return Some(column.is_in(uuids));
    }
    let strings: Vec<String> = values
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect();
    Some(column.is_in(strings))
}

fn find_column<T: CRUDResource>(name: &str) -> Option<T::ColumnType> {
    T::filterable_columns()
        .into_iter()
        .find(|(col_name, _)| *col_name == name)
        .map(|(_, col)| col)
}

/// Translate the JSON `filter` parameter into a condition over the
/// resource's filterable columns. Unknown keys are ignored.
///
/// # Errors
///
/// `BadRequest` when the filter is not a JSON object.
pub fn apply_filters<T: CRUDResource>(filter: Option<&str>) -> Result<Condition, ApiError> {
    let Some(raw) = filter.map(str::trim).filter(|f| !f.is_empty()) else {
        return Ok(Condition::all());
    };
    let filters: Map<String, Value> = serde_json::from_str(raw)
        .map_err(|e| ApiError::bad_request(format!("Invalid filter JSON: {e}")))?;

    let mut condition = Condition::all();

    if let Some(q) = filters.get("q").and_then(Value::as_str).map(str::trim).filter(|q| !q.is_empty()) {
        let mut any = Condition::any();
        for name in T::like_filterable_columns() {
            if let Some(column) = find_column::<T>(name) {
                any = any.add(like_expr(column, q));
            }
        }
        if !any.is_empty() {
            condition = condition.add(any);
        }
    }

    for (key, value) in &filters {
        if key == "q" {
            continue;
        }

        let expr = if let Some(column) = find_column::<T>(key) {
            match value {
                Value::String(s) => string_expr::<T>(key, s, column),
                Value::Number(n) => number_expr(column, "=", n),
                Value::Bool(b) => Some(column.eq(*b)),
                Value::Array(values) => array_expr(column, values),
                Value::Null => Some(column.is_null()),
                Value::Object(_) => None,
            }
        } else if let Some((base, operator)) = parse_comparison_operator(key) {
            match (find_column::<T>(base), value) {
                (Some(column), Value::Number(n)) => number_expr(column, operator, n),
                (Some(column), Value::String(s)) if s.len() <= MAX_FIELD_VALUE_LENGTH => {
                    Some(compare(column, operator, s.trim().to_string()))
                }
                _ => None,
            }
        } else {
            None
        };

        if let Some(expr) = expr {
            condition = condition.add(expr);
        }
    }

    Ok(condition)
}

/// `[start, end]`, inclusive; malformed input falls back to the first page
#[must_use]
pub fn parse_range(range: &str) -> (u64, u64) {
    serde_json::from_str::<[u64; 2]>(range).map_or((0, DEFAULT_PAGE_SIZE - 1), |[start, end]| (start, end.max(start)))
}

/// `(offset, limit)` from either pagination style
#[must_use]
pub fn parse_pagination(params: &FilterOptions) -> (u64, u64) {
    let (offset, limit) = if let (Some(page), Some(per_page)) = (params.page, params.per_page) {
        let per_page = per_page.clamp(1, MAX_PAGE_SIZE);
        (page.saturating_sub(1).saturating_mul(per_page), per_page)
    } else if let Some(range) = &params.range {
        let (start, end) = parse_range(range);
        (start, end.saturating_sub(start).saturating_add(1))
    } else {
        (0, DEFAULT_PAGE_SIZE)
    };
    (offset, limit.min(MAX_PAGE_SIZE))
}
