//! Activated license of this instance

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{LicenseData, LicenseRequest, LicenseStatus, LicenseVerifier, key_prefix};
use crate::config::LicenseSettings;
use crate::core::error::{LicenseError, MarkError, MarkResult, StorageError};

#[derive(Debug, Default)]
struct GuardState {
    key: Option<String>,
    last_validated: Option<DateTime<Utc>>,
    data: Option<LicenseData>,
}

fn poisoned(e: impl std::fmt::Display) -> MarkError {
    StorageError::LockPoisoned {
        message: e.to_string(),
    }
    .into()
}

/// Holds the license key, its last successful validation and the ping task
///
/// A key that was validated less than `grace_period_hours` ago survives a
/// failed verification at startup.
pub struct LicenseGuard {
    verifier: Arc<dyn LicenseVerifier>,
    settings: LicenseSettings,
    state: RwLock<GuardState>,
    ping_task: Mutex<Option<JoinHandle<()>>>,
}

impl LicenseGuard {
    pub fn new(verifier: Arc<dyn LicenseVerifier>, settings: LicenseSettings) -> Self {
        Self {
            verifier,
            settings,
            state: RwLock::new(GuardState::default()),
            ping_task: Mutex::new(None),
        }
    }

    /// Restore a key persisted by a previous run
    pub fn with_stored_key(
        self,
        key: impl Into<String>,
        last_validated: Option<DateTime<Utc>>,
    ) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.key = Some(key.into());
            state.last_validated = last_validated;
        }
        self
    }

    pub fn settings(&self) -> &LicenseSettings {
        &self.settings
    }

    pub fn stored_key(&self) -> Option<String> {
        self.state.read().ok().and_then(|s| s.key.clone())
    }

    pub fn has_key(&self) -> bool {
        self.stored_key().is_some()
    }

    pub fn last_validated(&self) -> Option<DateTime<Utc>> {
        self.state.read().ok().and_then(|s| s.last_validated)
    }

    pub fn within_grace_period(&self, now: DateTime<Utc>) -> bool {
        self.last_validated()
            .is_some_and(|at| now - at < self.settings.grace_period())
    }

    /// Verify the stored key at startup and begin pinging when it holds
    pub async fn initialize(&self) -> LicenseStatus {
        info!("initializing license guard");

        let Some(key) = self.stored_key() else {
            warn!("no license key stored, running in demo mode");
            return LicenseStatus::demo();
        };
        let within_grace = self.within_grace_period(Utc::now());

        // the license server may not be reachable yet, so grace is always allowed here
        let verification = self.verifier.verify(&key, true).await;
        if verification.valid {
            if verification.grace_period {
                info!(key = key_prefix(&key), "license accepted in grace period");
            } else {
                info!(key = key_prefix(&key), "license is valid and active");
            }
            if let Err(e) = self.record_validation(&verification.data, !verification.grace_period) {
                warn!(error = %e, "failed to record license validation");
            }
            self.start_pinging(key.clone());
            return LicenseStatus {
                valid: true,
                demo: false,
                grace_period: verification.grace_period,
                license_key: Some(key),
                data: verification.data,
            };
        }

        warn!(key = key_prefix(&key), within_grace, "stored license is invalid or expired");
        if !within_grace && let Ok(mut state) = self.state.write() {
            *state = GuardState::default();
        }
        LicenseStatus::demo()
    }

    fn record_validation(&self, data: &Option<LicenseData>, touch: bool) -> MarkResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if touch {
            state.last_validated = Some(Utc::now());
        }
        if data.is_some() {
            state.data = data.clone();
        }
        Ok(())
    }

    fn activate(&self, key: &str, data: Option<LicenseData>) -> MarkResult<()> {
        {
            let mut state = self.state.write().map_err(poisoned)?;
            state.key = Some(key.to_string());
            state.last_validated = Some(Utc::now());
            state.data = data;
        }
        self.start_pinging(key.to_string());
        info!(key = key_prefix(key), "license key stored and activated");
        Ok(())
    }

    /// Activate an existing key after checking it belongs to `email`
    pub async fn store_key(&self, key: &str, email: &str) -> MarkResult<LicenseData> {
        let key = key.trim();
        let email = email.trim().to_lowercase();
        if key.is_empty() {
            return Err(MarkError::field("licenseKey", "License key is required"));
        }
        if email.is_empty() {
            return Err(MarkError::field("email", "Email address is required"));
        }
        let prefix = key_prefix(key).to_string();

        let verification = self.verifier.verify(key, false).await;
        if !verification.valid {
            warn!(key = %prefix, "invalid license key attempted");
            return Err(LicenseError::Invalid { key_prefix: prefix }.into());
        }

        let license = self
            .verifier
            .fetch(key)
            .await
            .ok_or_else(|| LicenseError::Rejected {
                operation: "lookup".to_string(),
                message: "License not found".to_string(),
            })?;

        if license.email.to_lowercase() != email {
            warn!(key = %prefix, "email mismatch for license key");
            return Err(LicenseError::EmailMismatch { key_prefix: prefix }.into());
        }

        let data = verification.data.unwrap_or_else(|| license.clone());
        self.activate(key, Some(data.clone()))?;
        Ok(data)
    }

    /// Issue a new license and activate it on this instance
    pub async fn create_and_activate(&self, request: &LicenseRequest) -> MarkResult<LicenseData> {
        if request.email.trim().is_empty()
            || request.first_name.trim().is_empty()
            || request.last_name.trim().is_empty()
        {
            return Err(MarkError::field(
                "email",
                "Email, firstName, and lastName are required",
            ));
        }

        let license = self
            .verifier
            .create(request)
            .await
            .ok_or_else(|| LicenseError::Rejected {
                operation: "creation".to_string(),
                message: "Failed to create license".to_string(),
            })?;

        self.activate(&license.license_key, Some(license.clone()))?;
        Ok(license)
    }

    /// Forget the key and stop pinging
    pub fn deactivate(&self) -> MarkResult<()> {
        self.stop_pinging();
        let mut state = self.state.write().map_err(poisoned)?;
        if let Some(key) = state.key.take() {
            info!(key = key_prefix(&key), "license deactivated");
        }
        *state = GuardState::default();
        Ok(())
    }

    /// Live status: verifies the key and fetches its record
    pub async fn status(&self) -> LicenseStatus {
        let Some(key) = self.stored_key() else {
            return LicenseStatus::demo();
        };

        let verification = self.verifier.verify(&key, false).await;
        let data = match self.verifier.fetch(&key).await {
            Some(data) => Some(data),
            None => verification.data.clone(),
        };

        LicenseStatus {
            valid: verification.valid,
            demo: false,
            grace_period: verification.grace_period,
            license_key: Some(key),
            data,
        }
    }

    /// Whether licensed routes may be served right now
    pub async fn check_access(&self) -> bool {
        let Some(key) = self.stored_key() else {
            return false;
        };
        let verification = self.verifier.verify(&key, true).await;
        if verification.valid
            && !verification.grace_period
            && let Err(e) = self.record_validation(&verification.data, true)
        {
            warn!(error = %e, "failed to record license validation");
        }
        if verification.grace_period {
            return self.within_grace_period(Utc::now());
        }
        verification.valid
    }

    pub async fn ping(&self) -> MarkResult<Value> {
        let key = self.stored_key().ok_or(LicenseError::NoKey)?;
        self.verifier.ping(&key).await.ok_or_else(|| {
            LicenseError::Rejected {
                operation: "ping".to_string(),
                message: "Ping failed".to_string(),
            }
            .into()
        })
    }

    pub async fn online_stats(&self) -> MarkResult<Value> {
        self.verifier.online_stats().await.ok_or_else(|| {
            LicenseError::Rejected {
                operation: "stats".to_string(),
                message: "Online statistics unavailable".to_string(),
            }
            .into()
        })
    }

    /// Ping `key` now and then every `ping_interval_minutes`
    ///
    /// Replaces a previously running ping task.
    pub fn start_pinging(&self, key: String) {
        let verifier = Arc::clone(&self.verifier);
        let period = self.settings.ping_interval();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                ping_once(verifier.as_ref(), &key).await;
            }
        });

        if let Ok(mut slot) = self.ping_task.lock()
            && let Some(previous) = slot.replace(handle)
        {
            previous.abort();
        }
        info!(
            interval_minutes = self.settings.ping_interval_minutes,
            "started pinging license"
        );
    }

    pub fn stop_pinging(&self) {
        if let Ok(mut slot) = self.ping_task.lock()
            && let Some(handle) = slot.take()
        {
            handle.abort();
            info!("license pinging stopped");
        }
    }

    pub fn is_pinging(&self) -> bool {
        self.ping_task
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    pub fn shutdown(&self) {
        self.stop_pinging();
    }
}

/// One periodic ping; a failure is logged and the loop carries on
async fn ping_once(verifier: &dyn LicenseVerifier, key: &str) -> bool {
    let answered = verifier.ping(key).await.is_some();
    if !answered {
        warn!(key = key_prefix(key), "periodic license ping failed");
    }
    answered
}

impl Drop for LicenseGuard {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.ping_task.lock()
            && let Some(handle) = slot.take()
        {
            handle.abort();
        }
    }
}
