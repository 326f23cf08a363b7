use std::collections::{BTreeMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One outgoing GET call. Header names are lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: 8_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Response returned by a transport. Header names are lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body.into().into_bytes())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Server-directed delay from a numeric `Retry-After` header.
    ///
    /// Only the delta-seconds form is honored; HTTP-date values yield `None`.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after")
            .map(str::trim)
            .filter(|value| !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    timeout: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_timeout(&self) -> bool {
        self.timeout
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract shared by every provider adapter.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production HTTP client using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self.client.get(&request.url);

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            builder = builder.timeout(Duration::from_millis(request.timeout_ms));

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::timeout(format!("request timeout: {}", e))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {}", e))
                } else {
                    HttpError::new(format!("request failed: {}", e))
                }
            })?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_ascii_lowercase(), value.to_owned()))
                })
                .collect();
            let body = response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::timeout(format!("body read timeout: {}", e))
                } else {
                    HttpError::new(format!("failed to read response body: {}", e))
                }
            })?;

            Ok(HttpResponse {
                status,
                headers,
                body: body.to_vec(),
            })
        })
    }
}

/// In-memory transport replaying scripted replies by URL fragment.
///
/// The first route whose fragment occurs in the request URL answers. Replies
/// are consumed in order and the last one repeats. Unmatched URLs get a 404.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<ScriptedRoute>>,
    requests: Mutex<Vec<HttpRequest>>,
}

#[derive(Debug)]
struct ScriptedRoute {
    fragment: String,
    replies: VecDeque<Result<HttpResponse, HttpError>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `reply` to the route for `fragment`.
    pub fn on(self, fragment: impl Into<String>, reply: Result<HttpResponse, HttpError>) -> Self {
        let fragment = fragment.into();
        if let Ok(mut routes) = self.routes.lock() {
            match routes.iter_mut().find(|route| route.fragment == fragment) {
                Some(route) => route.replies.push_back(reply),
                None => routes.push(ScriptedRoute {
                    fragment,
                    replies: VecDeque::from([reply]),
                }),
            }
        }
        self
    }

    pub fn on_json(self, fragment: impl Into<String>, body: impl Into<String>) -> Self {
        self.on(fragment, Ok(HttpResponse::ok_json(body)))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of requests whose URL contains `fragment`.
    pub fn calls_to(&self, fragment: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.contains(fragment))
            .count()
    }

    fn next_reply(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let Ok(mut routes) = self.routes.lock() else {
            return Err(HttpError::new("scripted routes poisoned"));
        };

        let Some(route) = routes
            .iter_mut()
            .find(|route| url.contains(route.fragment.as_str()))
        else {
            return Ok(HttpResponse::new(404, format!("no scripted reply for {url}")));
        };

        if route.replies.len() > 1 {
            route
                .replies
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::new("scripted replies exhausted")))
        } else {
            route
                .replies
                .front()
                .cloned()
                .unwrap_or_else(|| Err(HttpError::new("scripted replies exhausted")))
        }
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let reply = self.next_reply(&request.url);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        Box::pin(std::future::ready(reply))
    }
}
