use std::collections::HashMap;

/// The request-side inputs a grid reads: its URI and decoded query params.
///
/// ```ignore
/// let request = GridRequest::from_uri("/users?filter=ali&currentPage=2");
/// assert_eq!(request.param("filter"), Some("ali"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRequest {
    request_uri: String,
    params: HashMap<String, String>,
}

impl GridRequest {
    pub fn new(request_uri: impl Into<String>) -> Self {
        Self {
            request_uri: request_uri.into(),
            params: HashMap::new(),
        }
    }

    /// Build from a full request URI, decoding its query string.
    ///
    /// When a key is repeated the last value wins.
    pub fn from_uri(request_uri: impl Into<String>) -> Self {
        let request_uri = request_uri.into();
        let query = request_uri.split_once('?').map(|(_, q)| q);
        let params = parse_query_string(query).into_iter().collect();
        Self { request_uri, params }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// String parameter, or `""` when missing.
    pub fn param_or_empty(&self, key: &str) -> &str {
        self.param(key).unwrap_or("")
    }

    /// Integer parameter; missing or unparsable values yield `default`.
    pub fn int_param(&self, key: &str, default: i64) -> i64 {
        self.param(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

/// Parse a query string into key-value pairs.
pub fn parse_query_string(query: Option<&str>) -> Vec<(String, String)> {
    match query {
        Some(q) => form_urlencoded::parse(q.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_uri_decodes_params() {
        let request = GridRequest::from_uri("/users?filter=jean+paul&users_currentPage=3&x=%C3%A9");
        assert_eq!(request.request_uri(), "/users?filter=jean+paul&users_currentPage=3&x=%C3%A9");
        assert_eq!(request.param("filter"), Some("jean paul"));
        assert_eq!(request.int_param("users_currentPage", 1), 3);
        assert_eq!(request.param("x"), Some("é"));
    }

    #[test]
    fn test_missing_and_invalid_params() {
        let request = GridRequest::from_uri("/users?currentPage=abc");
        assert_eq!(request.param_or_empty("filter"), "");
        assert_eq!(request.int_param("currentPage", 1), 1);
        assert_eq!(request.int_param("other", 7), 7);
    }

    #[test]
    fn test_negative_page_parses() {
        let request = GridRequest::new("/").with_param("currentPage", "-2");
        assert_eq!(request.int_param("currentPage", 1), -2);
    }

    #[test]
    fn test_no_query_string() {
        let request = GridRequest::from_uri("/users");
        assert!(request.param("filter").is_none());
    }
}
