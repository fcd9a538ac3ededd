//! Harbor HTTP client
//!
//! A thin, stateless wrapper over `reqwest`:
//! - One HTTP call per operation, no retries
//! - Non-2xx responses become [`HarborError::Api`] carrying status and body
//! - Listing follows `Link: <...>; rel="next"` until exhausted
//! - Every call races a cancellation token

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, AUTHORIZATION, LINK, LOCATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::credentials::Credentials;
use crate::error::{HarborError, Result};

/// API prefix appended to the connection's base URL
pub const API_PREFIX: &str = "api/v2.0";

/// Default wall-clock timeout for a single request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size requested when listing
pub const PAGE_SIZE: usize = 100;

/// Upper bound on pages followed for one listing
pub const MAX_PAGES: usize = 1000;

/// Harbor API client bound to one instance and one set of credentials
#[derive(Debug, Clone)]
pub struct HarborClient {
    http: reqwest::Client,
    base_url: Url,
    api_base: Url,
    credentials: Option<Credentials>,
    cancel: CancellationToken,
}

impl HarborClient {
    /// Create a client with its own HTTP connection pool
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        let http = Self::http_client(DEFAULT_TIMEOUT)?;
        Self::with_http_client(http, base_url, credentials)
    }

    /// Create a client sharing an existing HTTP connection pool
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let api_base = api_base(&base_url)?;

        Ok(Self {
            http,
            base_url,
            api_base,
            credentials,
            cancel: CancellationToken::new(),
        })
    }

    /// Abort in-flight and future calls when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Build the HTTP client shared by Harbor clients
    pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarborError::NetworkError {
                message: e.to_string(),
            })
    }

    /// Base address of the Harbor instance
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether calls carry credentials
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Resolve an API path (e.g. `projects/3/members`) against the API base
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.api_base.join(path.trim_start_matches('/'))?)
    }

    /// Resolve a pagination link
    ///
    /// Harbor behind a path-stripping proxy emits links rooted at
    /// `/api/v2.0/`; those are re-rooted onto the configured API base.
    fn page_url(&self, link: &str) -> Result<Url> {
        let rooted = format!("/{}/", API_PREFIX);
        match link.strip_prefix(&rooted) {
            Some(rest) => Ok(self.api_base.join(rest)?),
            None => Ok(self.base_url.join(link)?),
        }
    }

    fn request(&self, method: Method, url: Url, authenticated: bool) -> RequestBuilder {
        let mut request = self.http.request(method, url);
        if authenticated {
            if let Some(creds) = &self.credentials {
                request = request.header(AUTHORIZATION, creds.auth_header());
            }
        }
        request
    }

    /// Run a future unless the cancellation token fires first
    async fn guard<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(HarborError::Cancelled),
            result = fut => result,
        }
    }

    /// Send a request without classifying the status
    pub(crate) async fn send_raw(&self, request: RequestBuilder) -> Result<Response> {
        self.guard(async { Ok(request.send().await?) }).await
    }

    /// Send a request, turning non-2xx responses into errors
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.send_raw(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = self
            .guard(async { Ok(response.text().await.unwrap_or_default()) })
            .await?;
        Err(HarborError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let bytes = self.guard(async { Ok(response.bytes().await?) }).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET a single JSON document
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let response = self.send(self.request(Method::GET, url, true)).await?;
        self.read_json(response).await
    }

    /// GET every page of a collection
    pub(crate) async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .append_pair("page", "1")
            .append_pair("page_size", &PAGE_SIZE.to_string());

        let mut items = Vec::new();
        let mut next = Some(url);
        let mut pages = 0;

        while let Some(current) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                return Err(HarborError::TooManyPages {
                    path: path.to_string(),
                    max: MAX_PAGES,
                });
            }

            let response = self.send(self.request(Method::GET, current, true)).await?;
            next = next_page(response.headers())
                .map(|link| self.page_url(&link))
                .transpose()?;

            let page: Vec<T> = self.read_json(response).await?;
            items.extend(page);
        }

        Ok(items)
    }

    /// POST a JSON body and return the ID of the created entity
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        resource: &str,
    ) -> Result<i64> {
        let url = self.endpoint(path)?;
        let response = self
            .send(self.request(Method::POST, url, true).json(body))
            .await?;

        if let Some(id) = id_from_location(response.headers()) {
            return Ok(id);
        }

        // Some endpoints return the entity inline instead of a Location header
        let bytes = self.guard(async { Ok(response.bytes().await?) }).await?;
        id_from_body(&bytes).ok_or_else(|| HarborError::MissingId {
            resource: resource.to_string(),
        })
    }

    /// PUT a JSON body
    pub(crate) async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.endpoint(path)?;
        self.send(self.request(Method::PUT, url, true).json(body))
            .await?;
        Ok(())
    }

    /// DELETE a resource
    pub(crate) async fn delete_path(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        self.send(self.request(Method::DELETE, url, true)).await?;
        Ok(())
    }

    /// GET without credentials, returning only the status code
    pub(crate) async fn probe(&self, path: &str) -> Result<StatusCode> {
        let url = self.endpoint(path)?;
        let response = self.send_raw(self.request(Method::GET, url, false)).await?;
        Ok(response.status())
    }
}

/// Validate a connection base URL; the scheme is mandatory
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| HarborError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(HarborError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            });
        }
    }

    if url.host_str().is_none() {
        return Err(HarborError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// `{base}/api/v2.0/`, without doubling the prefix if the base already has it
fn api_base(base: &Url) -> Result<Url> {
    let path = base.path().trim_end_matches('/');
    let api_path = if path.ends_with(API_PREFIX) {
        format!("{}/", path)
    } else {
        format!("{}/{}/", path, API_PREFIX)
    };

    let mut url = base.clone();
    url.set_path(&api_path);
    url.set_query(None);
    Ok(url)
}

/// Extract the `rel="next"` target from a `Link` header
fn next_page(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;

    link.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|param| {
            let param = param.trim().replace(' ', "");
            param == "rel=\"next\"" || param == "rel=next"
        });

        if is_next {
            Some(target.trim_start_matches('<').trim_end_matches('>').to_string())
        } else {
            None
        }
    })
}

/// Parse the numeric ID from the final path segment of `Location`
fn id_from_location(headers: &HeaderMap) -> Option<i64> {
    let location = headers.get(LOCATION)?.to_str().ok()?;
    let path = location.split('?').next()?;
    path.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

fn id_from_body(bytes: &[u8]) -> Option<i64> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    value.get("id").and_then(serde_json::Value::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(name: reqwest::header::HeaderName, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_parse_base_url_requires_scheme() {
        assert!(parse_base_url("https://harbor.example.com").is_ok());
        assert!(parse_base_url("http://localhost:8080").is_ok());

        let err = parse_base_url("harbor.example.com").unwrap_err();
        assert!(matches!(err, HarborError::InvalidUrl { .. }));

        let err = parse_base_url("ftp://harbor.example.com").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_api_base() {
        let base = Url::parse("https://harbor.example.com").unwrap();
        assert_eq!(api_base(&base).unwrap().as_str(), "https://harbor.example.com/api/v2.0/");

        let base = Url::parse("https://example.com/harbor/").unwrap();
        assert_eq!(api_base(&base).unwrap().as_str(), "https://example.com/harbor/api/v2.0/");

        let base = Url::parse("https://harbor.example.com/api/v2.0").unwrap();
        assert_eq!(api_base(&base).unwrap().as_str(), "https://harbor.example.com/api/v2.0/");
    }

    #[test]
    fn test_endpoint() {
        let client = HarborClient::new("https://harbor.example.com", None).unwrap();
        assert_eq!(
            client.endpoint("projects/3/members").unwrap().as_str(),
            "https://harbor.example.com/api/v2.0/projects/3/members"
        );
        assert_eq!(
            client.endpoint("/registries").unwrap().as_str(),
            "https://harbor.example.com/api/v2.0/registries"
        );
    }

    #[test]
    fn test_page_url_keeps_subpath() {
        let client = HarborClient::new("https://example.com/harbor", None).unwrap();
        assert_eq!(
            client.page_url("/api/v2.0/projects?page=2&page_size=100").unwrap().as_str(),
            "https://example.com/harbor/api/v2.0/projects?page=2&page_size=100"
        );
        assert_eq!(
            client.page_url("/harbor/api/v2.0/projects?page=2").unwrap().as_str(),
            "https://example.com/harbor/api/v2.0/projects?page=2"
        );
        assert_eq!(
            client.page_url("https://mirror.example.com/api/v2.0/projects?page=2").unwrap().as_str(),
            "https://mirror.example.com/api/v2.0/projects?page=2"
        );
    }

    #[test]
    fn test_next_page() {
        let map = headers(
            LINK,
            r#"</api/v2.0/projects?page=1&page_size=10>; rel="prev" , </api/v2.0/projects?page=3&page_size=10>; rel="next""#,
        );
        assert_eq!(
            next_page(&map).as_deref(),
            Some("/api/v2.0/projects?page=3&page_size=10")
        );

        let last = headers(LINK, r#"</api/v2.0/projects?page=2&page_size=10>; rel="prev""#);
        assert_eq!(next_page(&last), None);
        assert_eq!(next_page(&HeaderMap::new()), None);
    }

    #[test]
    fn test_id_from_location() {
        assert_eq!(id_from_location(&headers(LOCATION, "/api/v2.0/registries/42")), Some(42));
        assert_eq!(
            id_from_location(&headers(LOCATION, "https://harbor.example.com/api/v2.0/users/7/")),
            Some(7)
        );
        assert_eq!(id_from_location(&headers(LOCATION, "/api/v2.0/projects/abc")), None);
        assert_eq!(id_from_location(&HeaderMap::new()), None);
    }

    #[test]
    fn test_id_from_body() {
        assert_eq!(id_from_body(br#"{"id": 12, "name": "x"}"#), Some(12));
        assert_eq!(id_from_body(b""), None);
    }
}
