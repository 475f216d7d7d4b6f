//! Catalog API routes

use super::client::UpstreamClient;
use super::types::{RequestOptions, ResponseType, UpstreamRequestResult};

/// Endpoint paths relative to the API base URL
pub mod routes {
    pub const CATALOG_SEARCH: &str = "catalog/search";
    pub const LIST_LANGUAGES: &str = "catalog/list/languages";
    pub const LIST_OWNERS: &str = "catalog/list/owners";

    pub fn contents(owner: &str, repo: &str, path: &str) -> String {
        format!("repos/{}/{}/contents/{}", owner, repo, path.trim_start_matches('/'))
    }

    pub fn raw(owner: &str, repo: &str, git_ref: &str, path: &str) -> String {
        format!(
            "repos/{}/{}/raw/{}/{}",
            owner,
            repo,
            git_ref,
            path.trim_start_matches('/')
        )
    }

    pub fn user_repos(owner: &str) -> String {
        format!("users/{}/repos", owner)
    }
}

impl UpstreamClient {
    /// Search the catalog, e.g. `[("lang", "en"), ("subject", "Bible")]`
    pub async fn search_catalog(&self, params: &[(&str, &str)]) -> UpstreamRequestResult {
        let options = params
            .iter()
            .fold(RequestOptions::default(), |options, (k, v)| {
                options.with_query(*k, *v)
            });
        self.request(routes::CATALOG_SEARCH, options).await
    }

    pub async fn list_languages(&self) -> UpstreamRequestResult {
        self.request(routes::LIST_LANGUAGES, RequestOptions::default())
            .await
    }

    pub async fn list_owners(&self) -> UpstreamRequestResult {
        self.request(routes::LIST_OWNERS, RequestOptions::default())
            .await
    }

    pub async fn get_contents(&self, owner: &str, repo: &str, path: &str) -> UpstreamRequestResult {
        self.request(&routes::contents(owner, repo, path), RequestOptions::default())
            .await
    }

    /// Raw file contents, always decoded as text
    pub async fn get_raw(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> UpstreamRequestResult {
        let options = RequestOptions::default().with_response_type(ResponseType::Text);
        self.request(&routes::raw(owner, repo, git_ref, path), options)
            .await
    }

    pub async fn list_user_repos(&self, owner: &str) -> UpstreamRequestResult {
        self.request(&routes::user_repos(owner), RequestOptions::default())
            .await
    }
}
