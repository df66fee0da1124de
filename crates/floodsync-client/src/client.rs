//! Blocking HTTP client for the FloodSync API.
//!
//! Each operation is one request/response exchange. There are no retries
//! and no caching; every failure is returned to the caller as a
//! [`ClientError`].

use crate::telemetry::record_request;
use crate::types::{decode_countries, decode_flood_map, FloodMapOutcome};
use crate::{ClientError, CountryList, FloodMapRequest, FloodMapResult, Result, ServiceError};
use reqwest::blocking::{RequestBuilder, Response};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const COUNTRIES_PATH: &str = "/countries";
const FLOOD_MAP_PATH: &str = "/flood_map";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Default timeout applied to every call. `None` means calls wait for
    /// the backend indefinitely.
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: concat!("floodsync-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set a default timeout for every call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Client for the flood-mapping backend.
///
/// Holds only immutable configuration and a connection pool, so it can be
/// shared between threads and used for concurrent calls.
#[derive(Debug, Clone)]
pub struct FloodServiceClient {
    base_url: String,
    config: ClientConfig,
    http: reqwest::blocking::Client,
}

impl FloodServiceClient {
    /// Create a client for `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(base_url))
    }

    /// Create a client from a full configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;

        // reqwest's blocking client cuts calls off at 30s unless told otherwise
        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url,
            config,
            http,
        })
    }

    /// Create a client for [`DEFAULT_BASE_URL`].
    pub fn with_defaults() -> Result<Self> {
        Self::from_config(ClientConfig::default())
    }

    /// A client with the same settings pointed at another backend.
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        Ok(Self {
            base_url: normalize_base_url(&base_url)?,
            config: ClientConfig {
                base_url,
                ..self.config.clone()
            },
            http: self.http.clone(),
        })
    }

    /// The normalized base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the list of countries the backend can map.
    pub fn list_countries(&self) -> Result<CountryList> {
        self.list_countries_inner(None)
    }

    /// [`list_countries`](Self::list_countries) with a deadline for this call.
    pub fn list_countries_with_timeout(&self, timeout: Duration) -> Result<CountryList> {
        self.list_countries_inner(Some(timeout))
    }

    /// Ask the backend to compute a flood map.
    ///
    /// The request is forwarded as given; use
    /// [`FloodMapRequest::validate`] beforehand to reject inverted date
    /// windows locally.
    pub fn generate_flood_map(&self, request: &FloodMapRequest) -> Result<FloodMapResult> {
        self.generate_flood_map_inner(request, None)
    }

    /// [`generate_flood_map`](Self::generate_flood_map) with a deadline for
    /// this call.
    pub fn generate_flood_map_with_timeout(
        &self,
        request: &FloodMapRequest,
        timeout: Duration,
    ) -> Result<FloodMapResult> {
        self.generate_flood_map_inner(request, Some(timeout))
    }

    fn list_countries_inner(&self, timeout: Option<Duration>) -> Result<CountryList> {
        let request = self.http.get(self.url(COUNTRIES_PATH));
        let started = Instant::now();

        let result = self.execute(COUNTRIES_PATH, request, timeout).and_then(|(_, body)| {
            decode_countries(&body).map_err(|reason| ClientError::Decode {
                endpoint: COUNTRIES_PATH,
                reason,
            })
        });

        finish(COUNTRIES_PATH, started, &result);
        if let Ok(countries) = &result {
            debug!(count = countries.len(), "Received country list");
        }
        result
    }

    fn generate_flood_map_inner(
        &self,
        request: &FloodMapRequest,
        timeout: Option<Duration>,
    ) -> Result<FloodMapResult> {
        debug!(
            country = %request.country,
            layer = %request.layer_type,
            start_date = ?request.start_date,
            end_date = ?request.end_date,
            "Requesting flood map"
        );
        let builder = self.http.post(self.url(FLOOD_MAP_PATH)).json(request);
        let started = Instant::now();

        let result = self
            .execute(FLOOD_MAP_PATH, builder, timeout)
            .and_then(|(status, body)| match decode_flood_map(&body) {
                Ok(FloodMapOutcome::Map(map)) => Ok(map),
                Ok(FloodMapOutcome::Rejected) => Err(ClientError::Service(ServiceError {
                    endpoint: FLOOD_MAP_PATH,
                    status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                })),
                Err(reason) => Err(ClientError::Decode {
                    endpoint: FLOOD_MAP_PATH,
                    reason,
                }),
            });

        finish(FLOOD_MAP_PATH, started, &result);
        if let Ok(map) = &result {
            debug!(
                area_sqkm = map.area_sqkm,
                features = map.feature_count(),
                "Received flood map"
            );
        }
        result
    }

    /// Send a request and return the status and body of a 2xx response.
    fn execute(
        &self,
        endpoint: &'static str,
        mut request: RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<(u16, Vec<u8>)> {
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .map_err(|source| ClientError::Transport { endpoint, source })?;
        let status = response.status();
        let body = read_body(endpoint, response)?;

        if !status.is_success() {
            return Err(ClientError::Service(ServiceError {
                endpoint,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }));
        }
        Ok((status.as_u16(), body))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Read the body as raw bytes; JSON decoding checks the encoding itself.
fn read_body(endpoint: &'static str, response: Response) -> Result<Vec<u8>> {
    response
        .bytes()
        .map(|bytes| bytes.to_vec())
        .map_err(|source| ClientError::Transport { endpoint, source })
}

fn finish<T>(endpoint: &'static str, started: Instant, result: &Result<T>) {
    let elapsed = started.elapsed();
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => {
            match e {
                ClientError::Service(s) => {
                    warn!(endpoint, status = s.status, detail = ?s.detail(), "Backend reported failure")
                }
                other => warn!(endpoint, error = %other, "Request failed"),
            }
            e.kind()
        }
    };
    debug!(endpoint, outcome, elapsed = ?elapsed, "Request finished");
    record_request(endpoint, outcome, elapsed.as_secs_f64());
}

/// Check that `base_url` is an absolute http(s) URL and strip trailing
/// slashes.
fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
    }

    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ClientError::InvalidBaseUrl(format!(
            "{}: expected an http or https URL",
            base_url
        )));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ClientError::InvalidBaseUrl(format!(
            "{}: query strings and fragments are not allowed",
            base_url
        )));
    }

    Ok(trimmed.to_string())
}

/// Fetch the country list from `base_url` with a one-shot client.
pub fn list_countries(base_url: &str) -> Result<CountryList> {
    FloodServiceClient::new(base_url)?.list_countries()
}

/// Generate a flood map from `base_url` with a one-shot client.
pub fn generate_flood_map(request: &FloodMapRequest, base_url: &str) -> Result<FloodMapResult> {
    FloodServiceClient::new(base_url)?.generate_flood_map(request)
}
