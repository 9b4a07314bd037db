//! License activation and verification
//!
//! The plugin works against a remote license server. [`LicenseVerifier`] is
//! the seam to that server ([`HttpLicenseVerifier`] in production, fakes in
//! tests); [`LicenseGuard`] holds the activated key on this instance, keeps it
//! alive with periodic pings and answers access checks.

pub mod client;
pub mod device;
pub mod guard;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::HttpLicenseVerifier;
pub use device::DeviceInfo;
pub use guard::LicenseGuard;

/// License record as returned by the license server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseData {
    pub license_key: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_expired: bool,
    pub is_online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ping_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub feature_premium: bool,
    pub feature_advanced: bool,
    pub feature_enterprise: bool,
    pub feature_custom: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_devices: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_devices: Option<u32>,
}

impl LicenseData {
    /// Active and not expired
    pub fn is_valid(&self) -> bool {
        self.is_active && !self.is_expired
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_expired {
            "EXPIRED"
        } else if self.is_active {
            "ACTIVE"
        } else {
            "INACTIVE"
        }
    }
}

/// Who a new license is issued to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl LicenseRequest {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub valid: bool,
    pub data: Option<LicenseData>,
    /// Accepted without reaching the server
    pub grace_period: bool,
}

impl VerificationResult {
    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn grace() -> Self {
        Self {
            valid: true,
            data: None,
            grace_period: true,
        }
    }

    pub fn from_data(data: LicenseData) -> Self {
        Self {
            valid: data.is_valid(),
            data: Some(data),
            grace_period: false,
        }
    }
}

/// License state of this instance as reported to the admin panel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseStatus {
    pub valid: bool,
    /// No key activated; the plugin runs with limited functionality
    pub demo: bool,
    pub grace_period: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<LicenseData>,
}

impl LicenseStatus {
    pub fn demo() -> Self {
        Self {
            demo: true,
            ..Default::default()
        }
    }
}

/// Client of the remote license server
///
/// Transport failures are not errors here: they surface as `None` or an
/// invalid result, except that `verify` with `allow_grace` reports them as
/// a grace-period acceptance.
#[async_trait]
pub trait LicenseVerifier: Send + Sync {
    async fn create(&self, request: &LicenseRequest) -> Option<LicenseData>;

    async fn verify(&self, key: &str, allow_grace: bool) -> VerificationResult;

    async fn ping(&self, key: &str) -> Option<serde_json::Value>;

    async fn fetch(&self, key: &str) -> Option<LicenseData>;

    async fn online_stats(&self) -> Option<serde_json::Value>;
}

/// First 8 characters of a key, the only part that is ever logged
pub fn key_prefix(key: &str) -> &str {
    match key.char_indices().nth(8) {
        Some((end, _)) => &key[..end],
        None => key,
    }
}
