//! Gateway to the ordering backend's REST API.
//!
//! Every backend call goes through [`ApiClient`]. Before dispatch it attaches
//! the bearer token from the [`SessionStore`]; after a failed response it
//! classifies the failure, performs the one side effect that failure calls
//! for (a notification, or ending the session on a 401) and hands the
//! classified [`ApiError`] back to the caller.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::error::SESSION_EXPIRED_MESSAGE;
use super::ApiError;
use crate::auth::{NoopObserver, SessionEvent, SessionObserver, SessionStore};
use crate::models::{
    AdminProfile, Dashboard, DashboardStats, Order, OrderStatus, OrderStatusUpdate, Product,
    ProductInput,
};
use crate::notify::{Notification, Notifier};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Number of orders shown on the dashboard
pub const RECENT_ORDERS_LIMIT: usize = 5;

const LOGIN_PATH: &str = "/api/v1/admin/login";
const HEALTH_PATH: &str = "/health";
const DASHBOARD_STATS_PATH: &str = "/api/v1/admin/dashboard/stats";
const ORDERS_PATH: &str = "/api/v1/admin/orders";
const PRODUCTS_PATH: &str = "/api/v1/admin/products";

const JSON_MIME: &str = "application/json";

// ============================================================================
// Configuration and wire types
// ============================================================================

/// Settings fixed when the gateway is built
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// One outbound request after the outbound phase has run
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// Whether a 401 answer means the stored session is no longer valid.
    /// False only for the credential exchange itself.
    pub expires_session: bool,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub admin: AdminProfile,
}

/// Result of probing `GET /health`
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected(Value),
    Unreachable(String),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected(_))
    }
}

// ============================================================================
// Client
// ============================================================================

/// API client for the ordering backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    observer: Arc<dyn SessionObserver>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(
        config: &GatewayConfig,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).with_context(|| format!("Invalid backend URL: {}", base_url))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            session,
            notifier,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Report session transitions to the given observer
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_MIME));
        headers.insert(header::ACCEPT, HeaderValue::from_static(JSON_MIME));
        headers
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Outbound phase: resolve headers for a request.
    /// Method and body pass through untouched.
    pub fn outbound(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<RequestEnvelope, ApiError> {
        let mut headers = Self::default_headers();
        if let Some(token) = self.session.current_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::Local("stored token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        debug!(method = %method, path = path, "Making request");

        Ok(RequestEnvelope {
            method,
            path: path.to_string(),
            body,
            headers,
            expires_session: true,
        })
    }

    /// Send the envelope and turn non-2xx answers into classified errors
    async fn dispatch(&self, envelope: &RequestEnvelope) -> Result<Response, ApiError> {
        let mut request = self
            .client
            .request(envelope.method.clone(), self.url(&envelope.path))
            .headers(envelope.headers.clone());
        if let Some(ref body) = envelope.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            debug!(path = %envelope.path, status = status.as_u16(), "Response received");
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &envelope.path, &body))
        }
    }

    /// Inbound phase for failures: exactly one reaction, then the error goes
    /// back to the caller.
    fn inbound_failure(
        &self,
        method: &Method,
        path: &str,
        expires_session: bool,
        err: ApiError,
    ) -> ApiError {
        error!(method = %method, path = path, status = ?err.status(), error = %err, "API request failed");

        match err {
            ApiError::Unauthorized if expires_session => self.expire_session(),
            // Rejected credentials on login are reported by the login flow
            ApiError::Unauthorized => {}
            _ => {
                if let Some(message) = err.notification_message() {
                    self.notifier.notify(Notification::error(message));
                }
            }
        }
        err
    }

    fn expire_session(&self) {
        let had_session = self.session.is_authenticated();
        self.session.clear();
        // Concurrent requests rejected with the same token report it once
        if !had_session {
            debug!("Session already cleared, not reporting expiry again");
            return;
        }
        if !self.observer.on_login_view() {
            self.observer.on_session_event(&SessionEvent::Expired);
            self.notifier
                .notify(Notification::error(SESSION_EXPIRED_MESSAGE));
        }
    }

    /// Run a prepared envelope through dispatch and the inbound phase
    pub async fn execute(&self, envelope: RequestEnvelope) -> Result<Response, ApiError> {
        self.dispatch(&envelope).await.map_err(|e| {
            self.inbound_failure(&envelope.method, &envelope.path, envelope.expires_session, e)
        })
    }

    async fn send_envelope<T: DeserializeOwned>(
        &self,
        envelope: RequestEnvelope,
    ) -> Result<T, ApiError> {
        let method = envelope.method.clone();
        let path = envelope.path.clone();
        let expires_session = envelope.expires_session;

        let response = self.execute(envelope).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.inbound_failure(&method, &path, expires_session, ApiError::from_transport(e)))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            self.inbound_failure(
                &method,
                &path,
                expires_session,
                ApiError::InvalidResponse(format!("{}: {}", path, e)),
            )
        })
    }

    fn prepare<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<RequestEnvelope, ApiError> {
        let body = match body {
            Some(b) => Some(serde_json::to_value(b).map_err(|e| {
                self.inbound_failure(&method, path, true, ApiError::Local(e.to_string()))
            })?),
            None => None,
        };
        self.outbound(method.clone(), path, body)
            .map_err(|e| self.inbound_failure(&method, path, true, e))
    }

    /// GET a path and decode the JSON answer
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let envelope = self.prepare::<Value>(Method::GET, path, None)?;
        self.send_envelope(envelope).await
    }

    /// Send a write. Once the backend has answered 2xx the write counts as
    /// done; the body is returned only if it decodes as the written record.
    async fn send_write<T: DeserializeOwned>(
        &self,
        envelope: RequestEnvelope,
    ) -> Result<Option<T>, ApiError> {
        let path = envelope.path.clone();
        let response = self.execute(envelope).await?;
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path, error = %e, "Write accepted but answer body was lost");
                return Ok(None);
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                debug!(path = %path, error = %e, "Write acknowledged without a record");
                Ok(None)
            }
        }
    }

    /// POST a JSON body; `None` when the answer is not a `T`
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ApiError> {
        let envelope = self.prepare(Method::POST, path, Some(body))?;
        self.send_write(envelope).await
    }

    /// PUT a JSON body; `None` when the answer is not a `T`
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ApiError> {
        let envelope = self.prepare(Method::PUT, path, Some(body))?;
        self.send_write(envelope).await
    }

    /// DELETE a path, ignoring whatever body comes back
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let envelope = self.prepare::<Value>(Method::DELETE, path, None)?;
        self.execute(envelope).await?;
        Ok(())
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Exchange credentials for a token. The session store is not touched;
    /// persisting the result is the login flow's job.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let mut envelope = self.prepare(Method::POST, LOGIN_PATH, Some(&LoginRequest { email, password }))?;
        // A 401 here rejects the submitted credentials, not the stored
        // token: a failed login leaves the current session as it was.
        envelope.expires_session = false;
        self.send_envelope(envelope).await
    }

    // ========================================================================
    // Health
    // ========================================================================

    pub async fn health(&self) -> Result<Value, ApiError> {
        self.get(HEALTH_PATH).await
    }

    /// Probe the backend, folding failure into the status value
    pub async fn test_connection(&self) -> ConnectionStatus {
        match self.health().await {
            Ok(data) => ConnectionStatus::Connected(data),
            Err(e) => ConnectionStatus::Unreachable(e.to_string()),
        }
    }

    // ========================================================================
    // Dashboard
    // ========================================================================

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get(DASHBOARD_STATS_PATH).await
    }

    pub async fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, ApiError> {
        self.get(&format!("{}?limit={}", ORDERS_PATH, limit)).await
    }

    /// Stats and recent orders, fetched concurrently
    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        let (stats, recent_orders) = futures::future::try_join(
            self.dashboard_stats(),
            self.recent_orders(RECENT_ORDERS_LIMIT),
        )
        .await?;
        Ok(Dashboard {
            stats,
            recent_orders,
        })
    }

    // ========================================================================
    // Orders
    // ========================================================================

    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get(&format!("{}/", ORDERS_PATH)).await
    }

    pub async fn order(&self, order_id: i64) -> Result<Order, ApiError> {
        self.get(&format!("{}/{}", ORDERS_PATH, order_id)).await
    }

    pub async fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Option<Order>, ApiError> {
        self.put(
            &format!("{}/{}", ORDERS_PATH, order_id),
            &OrderStatusUpdate { status },
        )
        .await
    }

    // ========================================================================
    // Products
    // ========================================================================

    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.get(&format!("{}/", PRODUCTS_PATH)).await
    }

    pub async fn product(&self, product_id: i64) -> Result<Product, ApiError> {
        self.get(&format!("{}/{}", PRODUCTS_PATH, product_id)).await
    }

    pub async fn create_product(
        &self,
        input: &ProductInput,
    ) -> Result<Option<Product>, ApiError> {
        self.post(&format!("{}/", PRODUCTS_PATH), input).await
    }

    pub async fn update_product(
        &self,
        product_id: i64,
        input: &ProductInput,
    ) -> Result<Option<Product>, ApiError> {
        self.put(&format!("{}/{}", PRODUCTS_PATH, product_id), input)
            .await
    }

    pub async fn delete_product(&self, product_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("{}/{}", PRODUCTS_PATH, product_id))
            .await
    }
}
