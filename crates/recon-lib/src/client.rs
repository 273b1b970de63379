//! HTTP client for the inventory/agent search API
//!
//! Drains provider-side pagination page by page and returns fully
//! materialized result sets. No retries here: transport retry policy
//! belongs to whoever owns the HTTP stack configuration.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;
use crate::models::{Provider, RawPage};
use crate::search::{InventorySource, TimeWindow};

const AGENT_SEARCH_PATH: &str = "api/v2/AgentInfo/search";
const INVENTORY_SEARCH_PATH: &str = "api/v2/Inventory/search";
const USER_PROFILE_PATH: &str = "api/v2/UserProfile";

/// Upper bound on pages drained for one search, guarding runaway paging
const MAX_PAGES: usize = 1_000;

/// Search API client with bearer-token auth
pub struct HttpInventorySource {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpInventorySource {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    async fn post_search(&self, path: &str, body: Value) -> Result<Vec<RawPage>> {
        let url = self.base_url.join(path)?;
        let response: SearchResponse = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut next = response.next_page();
        let mut pages = vec![RawPage::new(response.data)];

        while let Some(next_url) = next {
            if pages.len() >= MAX_PAGES {
                warn!(path, pages = pages.len(), "stopping pagination at the page cap");
                break;
            }
            let response: SearchResponse = self
                .client
                .get(&next_url)
                .bearer_auth(&self.token)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            next = response.next_page();
            pages.push(RawPage::new(response.data));
        }

        debug!(path, pages = pages.len(), "search drained");
        Ok(pages)
    }

    fn time_filter(window: TimeWindow) -> Value {
        json!({
            "startTime": window.start_str(),
            "endTime": window.end_str(),
        })
    }
}

#[async_trait]
impl InventorySource for HttpInventorySource {
    async fn search_agents(&self, window: TimeWindow) -> Result<Vec<RawPage>> {
        self.post_search(
            AGENT_SEARCH_PATH,
            json!({ "timeFilter": Self::time_filter(window) }),
        )
        .await
    }

    async fn search_inventory(
        &self,
        provider: Provider,
        window: TimeWindow,
    ) -> Result<Vec<RawPage>> {
        self.post_search(
            INVENTORY_SEARCH_PATH,
            json!({
                "timeFilter": Self::time_filter(window),
                "filters": [
                    {"field": "resourceType", "expression": "eq", "value": provider.resource_type()}
                ],
                "dataset": provider.dataset(),
            }),
        )
        .await
    }

    async fn search_container_tasks(&self, window: TimeWindow) -> Result<Vec<RawPage>> {
        self.post_search(
            INVENTORY_SEARCH_PATH,
            json!({
                "timeFilter": Self::time_filter(window),
                "filters": [
                    {"field": "resourceType", "expression": "eq", "value": "ecs:task"}
                ],
                "dataset": Provider::Aws.dataset(),
            }),
        )
        .await
    }

    async fn subaccounts(&self) -> Result<Vec<String>> {
        let url = self.base_url.join(USER_PROFILE_PATH)?;
        let profile: UserProfileResponse = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut names: Vec<String> = profile
            .data
            .into_iter()
            .flat_map(|entry| entry.accounts)
            .map(|account| account.account_name)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    paging: Option<Paging>,
}

impl SearchResponse {
    fn next_page(&self) -> Option<String> {
        self.paging.as_ref()?.urls.as_ref()?.next_page.clone()
    }
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    urls: Option<PagingUrls>,
}

#[derive(Debug, Deserialize)]
struct PagingUrls {
    #[serde(rename = "nextPage")]
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserProfileResponse {
    #[serde(default)]
    data: Vec<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct UserProfile {
    #[serde(default)]
    accounts: Vec<SubaccountEntry>,
}

#[derive(Debug, Deserialize)]
struct SubaccountEntry {
    #[serde(rename = "accountName")]
    account_name: String,
}
