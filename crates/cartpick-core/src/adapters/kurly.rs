use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::Upstream;
use crate::circuit_breaker::CircuitState;
use crate::data_source::{AdapterFuture, RawRecord, SourceAdapter, SourceError};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::throttling::Throttle;

const SEARCH_ENDPOINT: &str = "https://api.kurly.com/search/v4/sites/market/normal-search";
const PRODUCT_LIST_SECTION: &str = "PRODUCT_LIST";
const PRODUCT_PAGE: &str = "https://www.kurly.com/goods";
const FIRST_SECTION_LIMIT: usize = 3;

/// Kurly search API client.
#[derive(Debug, Clone)]
pub struct KurlySearchAdapter {
    upstream: Upstream,
    request_timeout: Duration,
}

impl Default for KurlySearchAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl KurlySearchAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            upstream: Upstream::new("kurly", http_client, Throttle::kurly()),
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
        let request = HttpRequest::get(SEARCH_ENDPOINT)
            .with_query("keyword", keyword)
            .with_query("page", "1")
            .with_header("accept", "application/json")
            .with_timeout(self.request_timeout);

        let body = self.upstream.get_body(request).await?;
        parse_search_response(&body)
    }
}

impl SourceAdapter for KurlySearchAdapter {
    fn name(&self) -> &'static str {
        "kurly-search-api"
    }

    fn fetch<'a>(&'a self, keyword: &'a str) -> AdapterFuture<'a> {
        Box::pin(self.search(keyword))
    }

    fn circuit_state(&self) -> Option<CircuitState> {
        Some(self.upstream.circuit_state())
    }
}

#[derive(Debug, Default, Deserialize)]
struct KurlySearchResponse {
    #[serde(default)]
    data: Option<KurlySearchData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KurlySearchData {
    #[serde(default)]
    list_sections: Vec<KurlySection>,
}

#[derive(Debug, Deserialize)]
struct KurlySection {
    #[serde(default)]
    view: Option<KurlySectionView>,
    #[serde(default)]
    data: Option<KurlySectionData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KurlySectionView {
    #[serde(default)]
    section_code: String,
}

#[derive(Debug, Deserialize)]
struct KurlySectionData {
    #[serde(default)]
    items: Vec<KurlyItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KurlyItem {
    #[serde(default)]
    no: Option<serde_json::Value>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sales_price: Option<i64>,
    #[serde(default)]
    discounted_price: Option<i64>,
    #[serde(default)]
    is_sold_out: bool,
}

impl KurlyItem {
    fn into_record(self) -> Option<RawRecord> {
        let price = self
            .discounted_price
            .filter(|price| *price > 0)
            .or(self.sales_price)?;

        let mut record = RawRecord::new(self.name, price).with_in_stock(!self.is_sold_out);
        if let Some(id) = self.no.as_ref().and_then(value_to_id) {
            record = record
                .with_url(format!("{PRODUCT_PAGE}/{id}"))
                .with_source_id(id);
        }
        Some(record)
    }
}

fn value_to_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn parse_search_response(body: &str) -> Result<Vec<RawRecord>, SourceError> {
    let response: KurlySearchResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("kurly search response: {e}")))?;

    let mut sections = response.data.map(|data| data.list_sections).unwrap_or_default();
    let product_list = sections
        .iter()
        .position(|section| {
            section
                .view
                .as_ref()
                .is_some_and(|view| view.section_code == PRODUCT_LIST_SECTION)
        })
        .and_then(|index| sections[index].data.take())
        .map(|data| into_records(data.items))
        .unwrap_or_default();
    if !product_list.is_empty() {
        return Ok(product_list);
    }

    // Without a usable product list, the first section's leading items stand in.
    let items = sections
        .into_iter()
        .next()
        .and_then(|section| section.data)
        .map(|data| data.items.into_iter().take(FIRST_SECTION_LIMIT).collect())
        .unwrap_or_default();
    Ok(into_records(items))
}

fn into_records(items: Vec<KurlyItem>) -> Vec<RawRecord> {
    items
        .into_iter()
        .filter(|item| !item.name.trim().is_empty())
        .filter_map(KurlyItem::into_record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::RecordingHttpClient;
    use crate::SourceErrorKind;

    const BODY: &str = r#"{
        "data": {
            "listSections": [
                { "view": { "sectionCode": "BANNER" }, "data": { "items": [ { "no": 1, "name": "배너", "salesPrice": 1 } ] } },
                { "view": { "sectionCode": "PRODUCT_LIST" }, "data": { "items": [
                    { "no": 5051234, "name": "[서울우유] 나100% 우유 1L", "salesPrice": 3200, "discountedPrice": 2990, "isSoldOut": false },
                    { "no": 5055678, "name": "[매일] 저지방 우유 900mL", "salesPrice": 2750, "discountedPrice": 0, "isSoldOut": true }
                ] } }
            ]
        }
    }"#;

    #[tokio::test]
    async fn reads_the_product_list_section_only() {
        let client = Arc::new(RecordingHttpClient::json(BODY));
        let adapter = KurlySearchAdapter::with_http_client(client.clone());

        let records = adapter.fetch("우유").await.expect("valid response");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].price, 2990);
        assert_eq!(records[0].source_id.as_deref(), Some("5051234"));
        assert_eq!(records[1].price, 2750, "falls back to the sales price");
        assert_eq!(records[1].in_stock, Some(false));

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].full_url().starts_with(SEARCH_ENDPOINT));
        assert!(requests[0].full_url().ends_with("&page=1"));
    }

    #[tokio::test]
    async fn missing_product_list_falls_back_to_the_first_section() {
        let body = r#"{
            "data": {
                "listSections": [
                    { "view": { "sectionCode": "RECOMMEND" }, "data": { "items": [
                        { "no": 1, "name": "우유 A", "salesPrice": 1000 },
                        { "no": 2, "name": "우유 B", "salesPrice": 1100 },
                        { "no": 3, "name": "우유 C", "salesPrice": 1200 },
                        { "no": 4, "name": "우유 D", "salesPrice": 1300 }
                    ] } },
                    { "view": { "sectionCode": "PRODUCT_LIST" }, "data": { "items": [] } }
                ]
            }
        }"#;
        let adapter = KurlySearchAdapter::with_http_client(Arc::new(RecordingHttpClient::json(body)));

        let records = adapter.fetch("우유").await.expect("valid response");

        assert_eq!(
            records.iter().map(|record| record.name.as_str()).collect::<Vec<_>>(),
            vec!["우유 A", "우유 B", "우유 C"]
        );
    }

    #[tokio::test]
    async fn empty_payload_yields_no_records() {
        let adapter = KurlySearchAdapter::with_http_client(Arc::new(RecordingHttpClient::json("{}")));
        assert_eq!(adapter.fetch("우유").await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let adapter =
            KurlySearchAdapter::with_http_client(Arc::new(RecordingHttpClient::json("<html>")));
        let error = adapter.fetch("우유").await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
    }
}
