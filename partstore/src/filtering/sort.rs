use sea_orm::sea_query::Order;

use super::query::FilterOptions;
use crate::core::CRUDResource;

const DEFAULT_SORT_ORDER: &str = "ASC";

/// `["column", "ASC"]`; missing parts become `None`
fn parse_json_sort(json: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<String> = serde_json::from_str(json).unwrap_or_default();
    let mut parts = parts.into_iter();
    (parts.next(), parts.next())
}

/// Anything other than a case-insensitive `DESC` sorts ascending
fn parse_order(order: &str) -> Order {
    if order.trim().eq_ignore_ascii_case("DESC") {
        Order::Desc
    } else {
        Order::Asc
    }
}

/// Sort column and direction from either the React-Admin or the REST form.
/// Columns the resource does not allow fall back to its default index column.
pub fn parse_sorting<T: CRUDResource>(params: &FilterOptions) -> (T::ColumnType, Order) {
    let (column, order) = if let Some(sort_by) = &params.sort_by {
        (Some(sort_by.clone()), params.order.clone())
    } else if let Some(sort) = params.sort.as_deref().map(str::trim) {
        if sort.starts_with('[') {
            parse_json_sort(sort)
        } else {
            (Some(sort.to_string()), params.order.clone())
        }
    } else {
        (None, params.order.clone())
    };

    let direction = parse_order(order.as_deref().unwrap_or(DEFAULT_SORT_ORDER));
    let column = column
        .and_then(|name| {
            T::sortable_columns()
                .into_iter()
                .find(|(col_name, _)| *col_name == name)
                .map(|(_, col)| col)
        })
        .unwrap_or_else(T::default_index_column);
    (column, direction)
}
