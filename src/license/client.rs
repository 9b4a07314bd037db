//! HTTP client of the license server

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::device::DeviceInfo;
use super::{LicenseData, LicenseRequest, LicenseVerifier, VerificationResult, key_prefix};
use crate::config::PluginConfig;
use crate::core::error::MarkResult;

/// Envelope of every license server response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiResponse {
    fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown error")
    }

    /// `data` of a successful response, decoded
    fn into_data<T: DeserializeOwned>(self) -> Option<T> {
        if !self.success {
            return None;
        }
        self.data.and_then(|data| serde_json::from_value(data).ok())
    }
}

/// [`LicenseVerifier`] talking JSON to `{server}/api/licenses/...`
#[derive(Clone)]
pub struct HttpLicenseVerifier {
    http: Client,
    base_url: String,
    plugin_name: String,
    product_name: String,
    device: DeviceInfo,
}

impl HttpLicenseVerifier {
    pub fn new(config: &PluginConfig) -> MarkResult<Self> {
        Self::with_device(config, DeviceInfo::detect())
    }

    pub fn with_device(config: &PluginConfig, device: DeviceInfo) -> MarkResult<Self> {
        let http = Client::builder()
            .timeout(config.license.timeout())
            .user_agent(device.user_agent.clone())
            .build()?;

        let base_url = config.license.server_url.trim_end_matches('/').to_string();
        info!(base_url = %base_url, device_id = %device.device_id, "license client initialized");

        Ok(Self {
            http,
            base_url,
            plugin_name: config.plugin_name.clone(),
            product_name: config.product_name.clone(),
            device,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/licenses/{}", self.base_url, path)
    }

    async fn post(&self, path: &str, mut body: Value) -> reqwest::Result<ApiResponse> {
        if let Some(object) = body.as_object_mut() {
            object.insert("pluginName".into(), json!(self.plugin_name));
            object.insert("productName".into(), json!(self.product_name));
        }
        self.http
            .post(self.url(path))
            .json(&body)
            .send()
            .await?
            .json::<ApiResponse>()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<ApiResponse> {
        self.http.get(self.url(path)).send().await?.json().await
    }
}

#[async_trait]
impl LicenseVerifier for HttpLicenseVerifier {
    async fn create(&self, request: &LicenseRequest) -> Option<LicenseData> {
        let body = json!({
            "email": request.email,
            "firstName": request.first_name,
            "lastName": request.last_name,
            "deviceName": self.device.device_name,
            "deviceId": self.device.device_id,
            "ipAddress": self.device.ip_address,
            "userAgent": self.device.user_agent,
        });

        match self.post("create", body).await {
            Ok(response) if response.success => {
                let data = response.into_data::<LicenseData>();
                match &data {
                    Some(license) => {
                        info!(key = key_prefix(&license.license_key), "license created")
                    }
                    None => warn!("license server returned no usable license data"),
                }
                data
            }
            Ok(response) => {
                error!(message = response.message(), "license creation failed");
                None
            }
            Err(e) => {
                error!(error = %e, "error creating license");
                None
            }
        }
    }

    async fn verify(&self, key: &str, allow_grace: bool) -> VerificationResult {
        let prefix = key_prefix(key);

        match self.post("verify", json!({ "licenseKey": key })).await {
            Ok(response) if response.success => match response.into_data::<LicenseData>() {
                Some(data) => {
                    info!(key = prefix, status = data.status_label(), "license verified online");
                    VerificationResult::from_data(data)
                }
                None => {
                    warn!(key = prefix, "license verification returned no data");
                    VerificationResult::invalid()
                }
            },
            Ok(response) => {
                warn!(key = prefix, message = response.message(), "license verification failed");
                VerificationResult::invalid()
            }
            Err(e) if allow_grace => {
                warn!(key = prefix, error = %e, "cannot verify license online, grace period active");
                VerificationResult::grace()
            }
            Err(e) => {
                error!(key = prefix, error = %e, "error verifying license");
                VerificationResult::invalid()
            }
        }
    }

    async fn ping(&self, key: &str) -> Option<Value> {
        let prefix = key_prefix(key);

        match self.post("ping", json!({ "licenseKey": key })).await {
            Ok(response) if response.success => {
                debug!(key = prefix, "license ping successful");
                Some(response.data.unwrap_or(Value::Null))
            }
            Ok(response) => {
                debug!(key = prefix, message = response.message(), "license ping failed");
                None
            }
            Err(e) => {
                debug!(key = prefix, error = %e, "license ping error");
                None
            }
        }
    }

    async fn fetch(&self, key: &str) -> Option<LicenseData> {
        let path = format!("key/{}", urlencoding::encode(key));
        match self.get(&path).await {
            Ok(response) => response.into_data(),
            Err(e) => {
                error!(key = key_prefix(key), error = %e, "error fetching license by key");
                None
            }
        }
    }

    async fn online_stats(&self) -> Option<Value> {
        match self.get("stats/online").await {
            Ok(response) => response.into_data(),
            Err(e) => {
                error!(error = %e, "error fetching online stats");
                None
            }
        }
    }
}
