use std::time::Duration;

use coupon_core::{DispatchReceipt, DispatchRequest, Product};
use coupon_logging::{coupon_debug, coupon_warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ApiError, FailureKind};

const PRODUCTS_PATH: &str = "api/products";
const DISPATCHES_PATH: &str = "api/dispatches";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8089".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Backend the form talks to: product search and dispatch creation.
#[async_trait::async_trait]
pub trait DispatchApi: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError>;

    async fn create_dispatch(&self, request: &DispatchRequest)
        -> Result<DispatchReceipt, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    base_url: reqwest::Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        // A trailing slash makes `join` append rather than replace the last segment.
        let mut base = settings.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = reqwest::Url::parse(&base)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
impl DispatchApi for ReqwestApi {
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint(PRODUCTS_PATH)?;
        coupon_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn create_dispatch(
        &self,
        request: &DispatchRequest,
    ) -> Result<DispatchReceipt, ApiError> {
        let url = self.endpoint(DISPATCHES_PATH)?;
        let body = serde_json::to_vec(request)
            .map_err(|err| ApiError::new(FailureKind::InvalidBody, err.to_string()))?;
        coupon_debug!("POST {} ({} recipients)", url, request.recipients.len());
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        let detail = extract_detail(&body);
        coupon_warn!("Server answered {} (detail: {:?})", status, detail);
        return Err(ApiError {
            kind: FailureKind::HttpStatus(status.as_u16()),
            message: status.to_string(),
            detail,
        });
    }
    serde_json::from_slice(&body)
        .map_err(|err| ApiError::new(FailureKind::InvalidBody, err.to_string()))
}

/// Pull `detail` out of an error body. Non-string details are rendered as
/// compact JSON so validation error lists are still readable.
fn extract_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::InvalidBody, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
