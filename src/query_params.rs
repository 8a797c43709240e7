//! Query parameters taken from the page URL.
//!
//! The URL is parsed once at startup; the result is read-only afterwards.

use std::collections::HashMap;

/// Name of the parameter carrying a GitHub access token.
pub const ACCESS_TOKEN_PARAM: &str = "_T";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    /// Parse the query string of `url`.
    ///
    /// Never fails. A pair without `=` gets an empty value and a component
    /// that does not percent-decode is kept as written.
    pub fn parse(url: &str) -> Self {
        let Some((_, query)) = url.split_once('?') else {
            return Self::default();
        };
        let query = query.split_once('#').map_or(query, |(q, _)| q);

        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();

        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Access token override, if one was given and is non-empty.
    pub fn access_token(&self) -> Option<&str> {
        self.get(ACCESS_TOKEN_PARAM).filter(|t| !t.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_question_mark_is_empty() {
        assert!(QueryParams::parse("http://example.com/page").is_empty());
        assert!(QueryParams::parse("").is_empty());
    }

    #[test]
    fn test_pairs_are_decoded() {
        let params = QueryParams::parse("http://example.com/page?color=red%20blue&sh%C3%A9=x%2Fy");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("color"), Some("red blue"));
        assert_eq!(params.get("shé"), Some("x/y"));
    }

    #[test]
    fn test_split_on_first_equals_only() {
        let params = QueryParams::parse("/?expr=a=b");
        assert_eq!(params.get("expr"), Some("a=b"));
    }

    #[test]
    fn test_malformed_input_degrades() {
        let params = QueryParams::parse("/?flag&bad=%E0%A4&&");
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(params.get("bad"), Some("%E0%A4"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_fragment_ignored() {
        let params = QueryParams::parse("/page?_T=abc#top");
        assert_eq!(params.access_token(), Some("abc"));
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let params = QueryParams::parse("/page?_T=");
        assert_eq!(params.access_token(), None);
    }
}
