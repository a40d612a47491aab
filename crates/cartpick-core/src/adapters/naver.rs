use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::Upstream;
use crate::circuit_breaker::CircuitState;
use crate::data_source::{AdapterFuture, RawRecord, SourceAdapter, SourceError};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::throttling::Throttle;

const SHOP_ENDPOINT: &str = "https://openapi.naver.com/v1/search/shop.json";
const DISPLAY: &str = "20";

/// Application credentials for the Naver open API.
#[derive(Clone, PartialEq, Eq)]
pub struct NaverCredentials {
    client_id: String,
    client_secret: String,
}

impl NaverCredentials {
    /// Returns `None` when either value is blank.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Option<Self> {
        let client_id = client_id.into().trim().to_owned();
        let client_secret = client_secret.into().trim().to_owned();
        (!client_id.is_empty() && !client_secret.is_empty()).then_some(Self {
            client_id,
            client_secret,
        })
    }
}

impl std::fmt::Debug for NaverCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Naver shopping search client, sorted by lowest price.
#[derive(Debug, Clone)]
pub struct NaverShoppingAdapter {
    upstream: Upstream,
    credentials: Option<NaverCredentials>,
    request_timeout: Duration,
}

impl NaverShoppingAdapter {
    pub fn new(credentials: Option<NaverCredentials>) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), credentials)
    }

    pub fn with_http_client(
        http_client: Arc<dyn HttpClient>,
        credentials: Option<NaverCredentials>,
    ) -> Self {
        Self {
            upstream: Upstream::new("naver", http_client, Throttle::naver()),
            credentials,
            request_timeout: Duration::from_secs(3),
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.upstream = self.upstream.with_retry(retry);
        self
    }

    async fn search(&self, keyword: &str) -> Result<Vec<RawRecord>, SourceError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            SourceError::not_configured("naver client id and secret are not configured")
        })?;

        let request = HttpRequest::get(SHOP_ENDPOINT)
            .with_query("query", keyword)
            .with_query("display", DISPLAY)
            .with_query("sort", "asc")
            .with_header("X-Naver-Client-Id", &credentials.client_id)
            .with_header("X-Naver-Client-Secret", &credentials.client_secret)
            .with_timeout(self.request_timeout);

        let body = self.upstream.get_body(request).await?;
        parse_shop_response(&body)
    }
}

impl SourceAdapter for NaverShoppingAdapter {
    fn name(&self) -> &'static str {
        "naver-shopping-api"
    }

    fn fetch<'a>(&'a self, keyword: &'a str) -> AdapterFuture<'a> {
        Box::pin(self.search(keyword))
    }

    fn circuit_state(&self) -> Option<CircuitState> {
        Some(self.upstream.circuit_state())
    }
}

#[derive(Debug, Deserialize)]
struct ShopResponse {
    #[serde(default)]
    items: Vec<ShopItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShopItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    lprice: String,
    #[serde(default)]
    product_id: Option<String>,
}

fn parse_shop_response(body: &str) -> Result<Vec<RawRecord>, SourceError> {
    let response: ShopResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("naver shopping response: {e}")))?;

    let records = response
        .items
        .into_iter()
        .filter_map(|item| {
            let Ok(price) = item.lprice.trim().parse::<i64>() else {
                debug!(title = %item.title, lprice = %item.lprice, "dropping item with unparseable price");
                return None;
            };
            let mut record = RawRecord::new(item.title, price);
            if let Some(id) = item.product_id.filter(|id| !id.is_empty()) {
                record = record.with_source_id(id);
            }
            if let Some(link) = item.link.filter(|link| !link.is_empty()) {
                record = record.with_url(link);
            }
            Some(record)
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::RecordingHttpClient;
    use crate::http_client::HttpResponse;
    use crate::SourceErrorKind;

    fn credentials() -> Option<NaverCredentials> {
        NaverCredentials::new("client-id", "client-secret")
    }

    #[tokio::test]
    async fn sends_credentials_and_parses_string_prices() {
        let client = Arc::new(RecordingHttpClient::json(
            r#"{"items":[
                {"title":"서울<b>우유</b> 1L","link":"https://smartstore.naver.com/p/1","lprice":"2890","productId":"8812"},
                {"title":"우유 묶음","lprice":"가격문의","productId":"8813"}
            ]}"#,
        ));
        let adapter = NaverShoppingAdapter::with_http_client(client.clone(), credentials());

        let records = adapter.fetch("우유").await.expect("valid response");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, 2890);
        assert_eq!(records[0].source_id.as_deref(), Some("8812"));
        assert_eq!(records[0].url.as_deref(), Some("https://smartstore.naver.com/p/1"));

        let request = &client.recorded_requests()[0];
        assert_eq!(
            request.headers.get("x-naver-client-id").map(String::as_str),
            Some("client-id")
        );
        assert!(request.full_url().contains("display=20&sort=asc"));
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_calling_upstream() {
        let client = Arc::new(RecordingHttpClient::json("{}"));
        let adapter = NaverShoppingAdapter::with_http_client(client.clone(), None);

        let error = adapter.fetch("우유").await.expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::NotConfigured);
        assert!(client.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_response_maps_to_not_configured() {
        let client = Arc::new(RecordingHttpClient::with_responses(vec![Ok(
            HttpResponse::with_status(401, r#"{"errorCode":"024"}"#),
        )]));
        let adapter = NaverShoppingAdapter::with_http_client(client, credentials());

        let error = adapter.fetch("우유").await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::NotConfigured);
    }

    #[test]
    fn blank_credentials_are_rejected_and_secret_is_redacted() {
        assert!(NaverCredentials::new(" ", "secret").is_none());
        let debug = format!("{:?}", credentials());
        assert!(!debug.contains("client-secret"));
    }
}
