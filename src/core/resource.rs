//! Resource identifiers and response payloads shared by every component

use crate::core::upstream::routes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::form_urlencoded;

/// Broad category of a catalog resource.
///
/// The kind is supplied by the caller; it only feeds the importance weight
/// used when ranking access patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Scripture,
    TranslationNotes,
    TranslationWords,
    TranslationQuestions,
    TranslationAcademy,
    WordLinks,
    Catalog,
    #[default]
    Other,
}

impl ResourceKind {
    /// Base priority score used by pattern analysis
    pub fn importance(&self) -> f64 {
        match self {
            ResourceKind::Scripture => 40.0,
            ResourceKind::TranslationNotes => 30.0,
            ResourceKind::TranslationWords => 25.0,
            ResourceKind::TranslationQuestions | ResourceKind::WordLinks => 20.0,
            ResourceKind::TranslationAcademy => 15.0,
            ResourceKind::Catalog => 10.0,
            ResourceKind::Other => 5.0,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Scripture => "scripture",
            ResourceKind::TranslationNotes => "translation_notes",
            ResourceKind::TranslationWords => "translation_words",
            ResourceKind::TranslationQuestions => "translation_questions",
            ResourceKind::TranslationAcademy => "translation_academy",
            ResourceKind::WordLinks => "word_links",
            ResourceKind::Catalog => "catalog",
            ResourceKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Identifies one upstream resource.
///
/// `canonical()` is stable regardless of the order query parameters were
/// added in, which makes it the default coalescing key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    #[serde(default)]
    pub kind: ResourceKind,
    /// Path relative to the catalog base URL
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
}

impl ResourceKey {
    pub fn new<S: Into<String>>(kind: ResourceKind, endpoint: S) -> Self {
        let endpoint = endpoint.into();
        Self {
            kind,
            endpoint: endpoint.trim_start_matches('/').to_string(),
            query: BTreeMap::new(),
        }
    }

    pub fn with_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// `endpoint?k1=v1&k2=v2` with keys in sorted order and pairs
    /// form-urlencoded, so a `&` or `=` inside a value cannot alias
    /// another key.
    pub fn canonical(&self) -> String {
        if self.query.is_empty() {
            return self.endpoint.clone();
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.endpoint, query)
    }

    /// Rebuild a key from its canonical form
    pub fn parse(kind: ResourceKind, canonical: &str) -> Self {
        let (endpoint, query) = match canonical.split_once('?') {
            Some((endpoint, query)) => (endpoint, Some(query)),
            None => (canonical, None),
        };

        let mut key = Self::new(kind, endpoint);
        if let Some(query) = query {
            key.query
                .extend(form_urlencoded::parse(query.as_bytes()).into_owned());
        }
        key
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn catalog_search<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        params.into_iter().fold(
            Self::new(ResourceKind::Catalog, routes::CATALOG_SEARCH),
            |key, (k, v)| key.with_param(k, v),
        )
    }

    pub fn languages() -> Self {
        Self::new(ResourceKind::Catalog, routes::LIST_LANGUAGES)
    }

    pub fn owners() -> Self {
        Self::new(ResourceKind::Catalog, routes::LIST_OWNERS)
    }

    pub fn user_repos(owner: &str) -> Self {
        Self::new(ResourceKind::Catalog, routes::user_repos(owner))
    }

    pub fn contents(kind: ResourceKind, owner: &str, repo: &str, path: &str) -> Self {
        Self::new(kind, routes::contents(owner, repo, path))
    }

    pub fn raw(kind: ResourceKind, owner: &str, repo: &str, git_ref: &str, path: &str) -> Self {
        Self::new(kind, routes::raw(owner, repo, git_ref, path))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Decoded upstream payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }

    /// Approximate payload size in bytes
    pub fn size_bytes(&self) -> usize {
        match self {
            ResponseBody::Text(text) => text.len(),
            ResponseBody::Json(value) => value.to_string().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_is_order_independent() {
        let a = ResourceKey::new(ResourceKind::Catalog, "catalog/search")
            .with_param("lang", "en")
            .with_param("subject", "Bible");
        let b = ResourceKey::new(ResourceKind::Catalog, "/catalog/search")
            .with_param("subject", "Bible")
            .with_param("lang", "en");

        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), "catalog/search?lang=en&subject=Bible");
    }

    #[test]
    fn test_parse_round_trips_canonical() {
        let key = ResourceKey::catalog_search([("lang", "es-419"), ("stage", "prod")]);
        let parsed = ResourceKey::parse(ResourceKind::Catalog, &key.canonical());
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_query_values_cannot_alias_other_keys() {
        let smuggled = ResourceKey::catalog_search([("lang", "en&stage=prod")]);
        let split = ResourceKey::catalog_search([("lang", "en"), ("stage", "prod")]);
        assert_ne!(smuggled.canonical(), split.canonical());

        let parsed = ResourceKey::parse(ResourceKind::Catalog, &smuggled.canonical());
        assert_eq!(parsed, smuggled);
        assert_eq!(parsed.query.len(), 1);
    }

    #[test]
    fn test_parse_decodes_spaces_and_symbols() {
        let key = ResourceKey::catalog_search([("q", "Titus 1:1"), ("subject", "a=b")]);
        let parsed = ResourceKey::parse(ResourceKind::Catalog, &key.canonical());
        assert_eq!(parsed.query["q"], "Titus 1:1");
        assert_eq!(parsed.query["subject"], "a=b");
    }

    #[test]
    fn test_route_constructors() {
        let key = ResourceKey::raw(
            ResourceKind::Scripture,
            "unfoldingWord",
            "en_ult",
            "master",
            "57-TIT.usfm",
        );
        assert_eq!(
            key.canonical(),
            "repos/unfoldingWord/en_ult/raw/master/57-TIT.usfm"
        );
        assert_eq!(ResourceKey::languages().canonical(), "catalog/list/languages");
        assert_eq!(
            ResourceKey::user_repos("unfoldingWord").canonical(),
            "users/unfoldingWord/repos"
        );
    }

    #[test]
    fn test_importance_ordering() {
        assert!(ResourceKind::Scripture.importance() > ResourceKind::TranslationNotes.importance());
        assert!(ResourceKind::Catalog.importance() > ResourceKind::Other.importance());
    }

    #[test]
    fn test_response_body_accessors() {
        let json = ResponseBody::Json(serde_json::json!({"ok": true}));
        assert!(json.as_json().is_some());
        assert!(json.as_text().is_none());

        let text = ResponseBody::Text("\\id TIT".to_string());
        assert_eq!(text.as_text(), Some("\\id TIT"));
        assert_eq!(text.size_bytes(), 7);
    }
}
