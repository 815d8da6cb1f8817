use crate::config::ApiConfig;
use crate::domain::model::{
    CatalogItem, MessageResponse, PrescriptionRecord, RefillSuggestion, ResetTicket,
};
use crate::domain::ports::{CatalogSource, DeliveryAccountService, PrescriptionSource, RefillSource};
use crate::utils::error::{Result, StoreError};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

/// 藥局後端 REST API 的用戶端
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
    session_cookie: Option<String>,
}

impl StorefrontClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            StoreError::InvalidConfigValueError {
                field: "api.base_url".to_string(),
                value: config.base_url.clone(),
                reason: e.to_string(),
            }
        })?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidConfigValueError {
                field: "api.base_url".to_string(),
                value: self.base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn with_bearer(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn with_cookie(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => request.header(header::COOKIE, cookie),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, label: &str) -> Result<serde_json::Value> {
        let response = request.send().await?;
        tracing::debug!("📡 {}: API response status: {}", label, response.status());
        read_json(response).await
    }

    /// `GET /api/medicines`
    pub async fn medicines(&self) -> Result<Vec<CatalogItem>> {
        let url = self.endpoint(&["api", "medicines"])?;
        tracing::debug!("📡 Making API request to: {}", url);

        let body = self.send(self.client.get(url), "medicines").await?;
        let items = expect_array(body, "medicine", "medicines")?
            .iter()
            .map(CatalogItem::from_payload)
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("🧾 Fetched {} medicines", items.len());
        Ok(items)
    }

    /// `GET /api/orders/refill-suggestions`（需登入）
    pub async fn refills(&self) -> Result<Vec<RefillSuggestion>> {
        let url = self.endpoint(&["api", "orders", "refill-suggestions"])?;
        let request = self.with_bearer(self.client.get(url));

        let body = self.send(request, "refill-suggestions").await?;
        expect_array(body, "refill suggestion", "suggestions")?
            .into_iter()
            .map(|v| decode(v, "refill suggestion"))
            .collect()
    }

    /// `GET /api/prescriptions/my-prescriptions`（以 cookie 驗證）
    pub async fn prescriptions(&self) -> Result<Vec<PrescriptionRecord>> {
        let url = self.endpoint(&["api", "prescriptions", "my-prescriptions"])?;
        let request = self.with_bearer(self.with_cookie(self.client.get(url)));

        let body = self.send(request, "my-prescriptions").await?;
        expect_array(body, "prescription", "prescriptions")?
            .iter()
            .map(PrescriptionRecord::from_payload)
            .collect()
    }

    /// `POST /api/delivery-boy/forget-password`
    pub async fn forget_password(&self, email: &str) -> Result<ResetTicket> {
        let url = self.endpoint(&["api", "delivery-boy", "forget-password"])?;
        let request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "email": email }));

        let body = self.send(request, "forget-password").await?;
        decode(body, "password reset")
    }

    /// `POST /api/delivery-boy/reset-password/:token`
    pub async fn reset_delivery_password(
        &self,
        token: &str,
        otp: &str,
        password: &str,
    ) -> Result<MessageResponse> {
        let url = self.endpoint(&["api", "delivery-boy", "reset-password", token])?;
        let request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "otp": otp, "password": password }));

        let body = self.send(request, "reset-password").await?;
        decode(body, "password reset")
    }
}

/// 非 2xx 回應轉為 `ServiceError`，訊息優先取自回應 JSON 的 `message`
async fn read_json(response: Response) -> Result<serde_json::Value> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<serde_json::Value>().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    tracing::warn!("📡 Service error {}: {}", status.as_u16(), message);
    Err(StoreError::ServiceError {
        status: status.as_u16(),
        message,
    })
}

/// 接受裸陣列，或以 `wrapper_key` / `data` 包裝的陣列
fn expect_array(
    body: serde_json::Value,
    entity: &str,
    wrapper_key: &str,
) -> Result<Vec<serde_json::Value>> {
    match body {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut obj) => {
            match obj.remove(wrapper_key).or_else(|| obj.remove("data")) {
                Some(serde_json::Value::Array(items)) => Ok(items),
                _ => Err(StoreError::malformed(entity, "expected a JSON array")),
            }
        }
        _ => Err(StoreError::malformed(entity, "expected a JSON array")),
    }
}

fn decode<T: DeserializeOwned>(value: serde_json::Value, entity: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| StoreError::malformed(entity, e.to_string()))
}

#[async_trait]
impl CatalogSource for StorefrontClient {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>> {
        self.medicines().await
    }

    fn source_name(&self) -> &str {
        "remote"
    }
}

#[async_trait]
impl PrescriptionSource for StorefrontClient {
    async fn my_prescriptions(&self) -> Result<Vec<PrescriptionRecord>> {
        self.prescriptions().await
    }
}

#[async_trait]
impl RefillSource for StorefrontClient {
    async fn refill_suggestions(&self) -> Result<Vec<RefillSuggestion>> {
        self.refills().await
    }
}

#[async_trait]
impl DeliveryAccountService for StorefrontClient {
    async fn forgot_password(&self, email: &str) -> Result<ResetTicket> {
        self.forget_password(email).await
    }

    async fn reset_password(
        &self,
        token: &str,
        otp: &str,
        password: &str,
    ) -> Result<MessageResponse> {
        self.reset_delivery_password(token, otp, password).await
    }
}
