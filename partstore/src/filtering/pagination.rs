use axum::http::{HeaderMap, HeaderValue, header::CONTENT_RANGE};

/// Keep only printable ASCII so the header cannot be split
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// `Content-Range: {resource} {first}-{last}/{total}` for a list response
#[must_use]
pub fn calculate_content_range(offset: u64, limit: u64, total_count: u64, resource_name: &str) -> HeaderMap {
    let last = offset
        .saturating_add(limit)
        .saturating_sub(1)
        .min(total_count.saturating_sub(1));
    let safe_name = sanitize_resource_name(resource_name);

    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("{safe_name} {offset}-{last}/{total_count}"))
        .unwrap_or_else(|_| HeaderValue::from_static("items 0-0/0"));
    headers.insert(CONTENT_RANGE, value);
    headers
}
