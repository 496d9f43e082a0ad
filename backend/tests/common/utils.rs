use axum::response::Response;
use http_body_util::BodyExt;
use regex::Regex;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Matches `YYYY/MM/salt/slug.ext`
pub fn object_key_pattern(slug: &str, extension: &str) -> Regex {
    Regex::new(&format!(
        r"^\d{{4}}/\d{{2}}/[A-Za-z0-9]{{8}}/{}{}$",
        regex::escape(slug),
        regex::escape(extension)
    ))
    .unwrap()
}

/// Query parameters of a URL as owned pairs
pub fn query_pairs(url: &str) -> Vec<(String, String)> {
    url::Url::parse(url)
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Value of one query parameter, panics when absent
pub fn query_param(url: &str, name: &str) -> String {
    query_pairs(url)
        .into_iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
        .unwrap_or_else(|| panic!("{name} missing from {url}"))
}
