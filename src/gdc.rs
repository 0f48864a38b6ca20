use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::IdMapError;

/// GDC search endpoint a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Cases,
    Files,
}

impl Entity {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Entity::Cases => "cases",
            Entity::Files => "files",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}

/// GDC filter expression; only `in` is needed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "content")]
pub enum Filter {
    #[serde(rename = "in")]
    In { field: String, value: Vec<String> },
}

impl Filter {
    pub fn any_of(field: impl Into<String>, values: &[String]) -> Self {
        Filter::In {
            field: field.into(),
            value: values.to_vec(),
        }
    }
}

/// One search: endpoint, filter, projected fields and archive scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GdcQuery {
    pub entity: Entity,
    pub filter: Filter,
    pub fields: Vec<String>,
    pub legacy: bool,
}

/// Search capability of the GDC: every hit matching the query, as raw JSON.
pub trait GdcClient: Send + Sync {
    fn query(&self, query: &GdcQuery) -> Result<Vec<Value>, IdMapError>;
}

#[derive(Serialize)]
struct SearchBody<'a> {
    filters: &'a Filter,
    fields: String,
    format: &'static str,
    size: usize,
    from: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    data: SearchData,
}

#[derive(Deserialize)]
struct SearchData {
    #[serde(default)]
    hits: Vec<Value>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct Pagination {
    total: usize,
}

#[derive(Clone)]
pub struct GdcHttpClient {
    client: Client,
    config: ClientConfig,
}

impl GdcHttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, IdMapError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("tcga-idmap/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| IdMapError::RemoteService(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| IdMapError::RemoteService(err.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn search_url(&self, entity: Entity, legacy: bool) -> String {
        let base = if legacy {
            &self.config.legacy_api_url
        } else {
            &self.config.api_url
        };
        format!("{base}/{}", entity.endpoint())
    }

    fn fetch_page(
        &self,
        url: &str,
        query: &GdcQuery,
        from: usize,
    ) -> Result<SearchData, IdMapError> {
        let body = SearchBody {
            filters: &query.filter,
            fields: query.fields.join(","),
            format: "JSON",
            size: self.config.page_size,
            from,
        };
        let response = self.send_with_retries(|| self.client.post(url).json(&body))?;
        let response = Self::handle_status(response)?;
        let parsed: SearchResponse = response
            .json()
            .map_err(|err| IdMapError::RemoteService(err.to_string()))?;
        Ok(parsed.data)
    }

    fn send_with_retries<F>(
        &self,
        mut make_req: F,
    ) -> Result<reqwest::blocking::Response, IdMapError>
    where
        F: FnMut() -> reqwest::blocking::RequestBuilder,
    {
        const BASE_DELAY_MS: u64 = 200;
        let max_retries = self.config.max_retries;
        let mut attempt = 0usize;
        loop {
            match make_req().send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < max_retries && is_retryable_status(status) {
                        tracing::warn!(status, attempt, "retrying GDC request");
                        std::thread::sleep(Duration::from_millis(
                            BASE_DELAY_MS * (attempt as u64 + 1),
                        ));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < max_retries && is_retryable_error(&err) {
                        tracing::warn!(error = %err, attempt, "retrying GDC request");
                        std::thread::sleep(Duration::from_millis(
                            BASE_DELAY_MS * (attempt as u64 + 1),
                        ));
                        attempt += 1;
                        continue;
                    }
                    return Err(IdMapError::RemoteService(err.to_string()));
                }
            }
        }
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, IdMapError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "GDC request failed".to_string());
        Err(IdMapError::RemoteStatus { status, message })
    }
}

impl GdcClient for GdcHttpClient {
    fn query(&self, query: &GdcQuery) -> Result<Vec<Value>, IdMapError> {
        let url = self.search_url(query.entity, query.legacy);
        let hits = collect_pages(|from| self.fetch_page(&url, query, from))?;
        tracing::debug!(%url, hits = hits.len(), "GDC query");
        Ok(hits)
    }
}

/// Requests pages at increasing `from` offsets until the reported total is
/// collected. An empty page or a page without pagination ends the scan.
fn collect_pages<F>(mut fetch: F) -> Result<Vec<Value>, IdMapError>
where
    F: FnMut(usize) -> Result<SearchData, IdMapError>,
{
    let mut hits = Vec::new();
    loop {
        let page = fetch(hits.len())?;
        let received = page.hits.len();
        let total = page.pagination.map(|p| p.total);
        hits.extend(page.hits);
        tracing::debug!(received, collected = hits.len(), ?total, "GDC page");
        match total {
            Some(total) if received > 0 && hits.len() < total => continue,
            _ => break,
        }
    }
    Ok(hits)
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
