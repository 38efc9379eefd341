//! Typed Search Console resources on top of [`ApiClient`]

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;
use url::form_urlencoded::byte_serialize;

use crate::batch::{BatchRequestPart, BatchResultEntry};
use crate::client::{ApiClient, CallOptions};
use crate::error::Result;
use crate::report::{SearchAnalyticsQuery, SearchAnalyticsResponse};

const WEBMASTERS_PREFIX: &str = "/webmasters/v3/sites";
const URL_INSPECTION_PATH: &str = "/v1/urlInspection/index:inspect";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteList {
    #[serde(default)]
    pub site_entry: Vec<SiteEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    pub site_url: String,
    #[serde(default)]
    pub permission_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SitemapList {
    #[serde(default)]
    pub sitemap: Vec<Sitemap>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sitemap {
    pub path: String,
    #[serde(default)]
    pub last_submitted: Option<String>,
    #[serde(default)]
    pub last_downloaded: Option<String>,
    #[serde(default)]
    pub is_pending: Option<bool>,
    /// The API sends counts as strings
    #[serde(default)]
    pub errors: Option<String>,
    #[serde(default)]
    pub warnings: Option<String>,
}

/// Index status of one inspected URL
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionSummary {
    pub url: String,
    pub verdict: Option<String>,
    pub coverage_state: Option<String>,
    pub last_crawl_time: Option<String>,
}

impl InspectionSummary {
    fn from_entry(entry: &BatchResultEntry<Value>) -> Self {
        let status = entry.response.pointer("/inspectionResult/indexStatusResult");
        let field = |name: &str| {
            status
                .and_then(|s| s.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            url: entry.request.body["inspectionUrl"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            verdict: field("verdict"),
            coverage_state: field("coverageState"),
            last_crawl_time: field("lastCrawlTime"),
        }
    }
}

/// Percent-encode one path segment (`https://a/` -> `https%3A%2F%2Fa%2F`)
fn encode_segment(segment: &str) -> String {
    byte_serialize(segment.as_bytes()).collect()
}

/// Search Console API facade
#[derive(Clone)]
pub struct SearchConsole {
    client: ApiClient,
}

impl SearchConsole {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Properties the credential can access
    #[instrument(skip(self))]
    pub async fn list_sites(&self) -> Result<SiteList> {
        let sites: Option<SiteList> = self
            .client
            .api_call(WEBMASTERS_PREFIX, CallOptions::get())
            .await?;
        Ok(sites.unwrap_or_default())
    }

    #[instrument(skip(self, query))]
    pub async fn query_search_analytics(
        &self,
        site_url: &str,
        query: &SearchAnalyticsQuery,
    ) -> Result<SearchAnalyticsResponse> {
        let path = format!(
            "{}/{}/searchAnalytics/query",
            WEBMASTERS_PREFIX,
            encode_segment(site_url)
        );
        let response: Option<SearchAnalyticsResponse> = self
            .client
            .api_call(&path, CallOptions::post(serde_json::to_value(query)?))
            .await?;
        Ok(response.unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn list_sitemaps(&self, site_url: &str) -> Result<SitemapList> {
        let path = format!("{}/{}/sitemaps", WEBMASTERS_PREFIX, encode_segment(site_url));
        let sitemaps: Option<SitemapList> = self.client.api_call(&path, CallOptions::get()).await?;
        Ok(sitemaps.unwrap_or_default())
    }

    /// Submit `feedpath` (a sitemap URL) for `site_url`
    #[instrument(skip(self))]
    pub async fn submit_sitemap(&self, site_url: &str, feedpath: &str) -> Result<()> {
        let path = format!(
            "{}/{}/sitemaps/{}",
            WEBMASTERS_PREFIX,
            encode_segment(site_url),
            encode_segment(feedpath)
        );
        // Success body is empty
        let _: Option<Value> = self.client.api_call(&path, CallOptions::put(None)).await?;
        Ok(())
    }

    /// Inspect many URLs through the batch endpoint.
    ///
    /// URLs whose response part could not be decoded are missing from the result.
    #[instrument(skip(self, urls), fields(urls = urls.len()))]
    pub async fn inspect_urls(
        &self,
        site_url: &str,
        urls: &[String],
    ) -> Result<Vec<InspectionSummary>> {
        let parts: Vec<BatchRequestPart> = urls
            .iter()
            .map(|url| {
                BatchRequestPart::post(
                    URL_INSPECTION_PATH,
                    json!({ "inspectionUrl": url, "siteUrl": site_url }),
                )
            })
            .collect();

        let entries: Option<Vec<BatchResultEntry<Value>>> =
            self.client.batch_api_call(&parts).await?;

        Ok(entries
            .unwrap_or_default()
            .iter()
            .map(InspectionSummary::from_entry)
            .collect())
    }
}
