use crate::extractor::default::DEFAULT_UA;

use super::{super::media::media_info::MediaInfo, error::ExtractorError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Base extractor shared by every platform.
///
/// Holds the target URL, the HTTP client and the headers and cookies that must
/// accompany every request made on behalf of the platform.
///
/// ```rust,no_run
/// # use reqwest::Client;
/// # use pandalive_parser::extractor::{install_rustls_provider, platform_extractor::Extractor};
/// install_rustls_provider();
/// let mut extractor = Extractor::new("Platform", "https://example.com", Client::new());
/// extractor.set_cookies_from_string("token=xyz789; user_id=12345");
/// let request = extractor.post("https://api.example.com/data");
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    // url to extract from, e.g., "https://www.pandalive.co.kr/live/play/foryoung65"
    pub url: String,
    // name of the platform, e.g., "PandaLive"
    pub platform_name: String,
    pub client: Client,
    platform_headers: HeaderMap,
    /// Cookies sent with every request made through [`Extractor::request`].
    pub cookies: FxHashMap<String, String>,
}

impl Extractor {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        platform_name: S1,
        platform_url: S2,
        client: Client,
    ) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_UA),
        );
        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        // Do not set `Accept-Encoding` here.
        // Reqwest adds it (and decompresses) when the gzip/deflate features are on.

        Self {
            platform_name: platform_name.into(),
            url: platform_url.into(),
            client,
            platform_headers: default_headers,
            cookies: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn set_origin_and_referer_static(&mut self, base_url: &'static str) {
        let v = HeaderValue::from_static(base_url);
        self.add_header_owned(reqwest::header::ORIGIN, v.clone());
        self.add_header_owned(reqwest::header::REFERER, v);
    }

    pub fn add_header_owned<K: Into<HeaderName>, V: Into<HeaderValue>>(
        &mut self,
        key: K,
        value: V,
    ) {
        self.platform_headers.insert(key.into(), value.into());
    }

    pub fn add_header_typed<K: Into<HeaderName>, V: AsRef<str>>(&mut self, key: K, value: V) {
        match HeaderValue::from_str(value.as_ref()) {
            Ok(value) => {
                self.platform_headers.insert(key.into(), value);
            }
            Err(e) => {
                debug!(error = %e, "Invalid header value; skipping");
            }
        }
    }

    /// Set cookies from a cookie string (format: "name1=value1; name2=value2").
    pub fn set_cookies_from_string(&mut self, cookie_string: &str) {
        // Accept ';' from Cookie headers and '\n' from copy/paste.
        for part in cookie_string.split(&[';', '\n'][..]).map(str::trim) {
            let Some((name, value)) = part.split_once('=') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }

            self.cookies.insert(name.to_owned(), value.to_owned());
        }
    }

    fn build_cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        let cookie_string = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");

        Some(cookie_string)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Create an HTTP request carrying the platform headers and stored cookies.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .headers(self.get_platform_headers())
    }

    /// Platform headers plus a `Cookie` header built from the stored cookies.
    /// Every request to the platform and its CDN needs the same set.
    pub fn get_platform_headers(&self) -> HeaderMap {
        let mut headers = self.platform_headers.clone();

        if let Some(cookie_header) = self.build_cookie_header() {
            match HeaderValue::from_str(&cookie_header) {
                Ok(value) => {
                    headers.insert(reqwest::header::COOKIE, value);
                }
                Err(e) => {
                    debug!(error = %e, "Failed to build Cookie header");
                }
            }
        }

        headers
    }

    pub fn get_platform_headers_map(&self) -> FxHashMap<String, String> {
        let headers = self.get_platform_headers();
        let mut headers_map =
            FxHashMap::with_capacity_and_hasher(headers.len(), Default::default());

        for (key, value) in &headers {
            if let Ok(value) = value.to_str() {
                headers_map.insert(key.as_str().to_owned(), value.to_owned());
            }
        }

        headers_map
    }
}

/// Send `request` and turn any non-success status into
/// [`ExtractorError::HttpStatus`], so callers can match on the status directly.
pub async fn send_checked(request: RequestBuilder) -> Result<Response, ExtractorError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        debug!(%status, url = %response.url(), "Request rejected");
        return Err(ExtractorError::HttpStatus {
            status,
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

#[async_trait]
pub trait PlatformExtractor: Send + Sync {
    fn get_extractor(&self) -> &Extractor;

    fn platform_name(&self) -> &str {
        &self.get_extractor().platform_name
    }

    async fn extract(&self) -> Result<MediaInfo, ExtractorError>;
}
