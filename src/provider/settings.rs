//! Validated construction-time settings for the provider pipeline: the
//! infrastructure credential, the poller interval, and transport knobs.

use crate::rpc::options::TransportOptions;
use anyhow::{bail, Context, Result};
use std::time::Duration;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 20;

/// Settings shared by every pipeline a controller activates.
///
/// Construct via [`ProviderSettings::builder`] so invariants are validated
/// before any consumer observes the values.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    credential: String,
    poll_interval: Duration,
    transport: TransportOptions,
}

impl ProviderSettings {
    pub fn builder() -> ProviderSettingsBuilder {
        ProviderSettingsBuilder::default()
    }

    /// Project id / API credential substituted into managed endpoint
    /// templates.
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Interval between latest-block probes.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn transport(&self) -> &TransportOptions {
        &self.transport
    }

    fn validate(&self) -> Result<()> {
        if self.credential.is_empty() {
            bail!("credential cannot be empty");
        }
        if self.poll_interval.is_zero() {
            bail!("poll_interval must be greater than 0");
        }
        self.transport.validate()
    }
}

#[derive(Debug, Default, Clone)]
pub struct ProviderSettingsBuilder {
    credential: Option<String>,
    poll_interval: Option<Duration>,
    transport: Option<TransportOptions>,
}

impl ProviderSettingsBuilder {
    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn transport(mut self, options: TransportOptions) -> Self {
        self.transport = Some(options);
        self
    }

    pub fn build(self) -> Result<ProviderSettings> {
        let settings = ProviderSettings {
            credential: self
                .credential
                .map(|value| value.trim().to_owned())
                .context("credential is required")?,
            poll_interval: self
                .poll_interval
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)),
            transport: self.transport.unwrap_or_default(),
        };

        settings.validate()?;
        Ok(settings)
    }
}
