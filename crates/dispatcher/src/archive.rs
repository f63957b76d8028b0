//! History archive clients

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use contracts::{ArchiveConfig, ArchiveEntry, ContractError, HistoryArchive};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Client;
use tracing::{debug, instrument};

/// `POST {base_url}/store` with a fixed header credential
#[derive(Debug, Clone)]
pub struct HttpHistoryArchive {
    client: Client,
    endpoint: String,
    header: HeaderName,
    api_key: HeaderValue,
}

impl HttpHistoryArchive {
    pub fn new(
        base_url: &str,
        api_key_header: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ContractError> {
        let header = HeaderName::from_bytes(api_key_header.as_bytes())
            .map_err(|e| {
                ContractError::config_validation("archive.api_key_header", e.to_string())
            })?;
        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|e| ContractError::config_validation("archive.api_key", e.to_string()))?;
        api_key.set_sensitive(true);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContractError::archive(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/store", base_url.trim_end_matches('/')),
            header,
            api_key,
        })
    }

    pub fn from_config(config: &ArchiveConfig) -> Result<Self, ContractError> {
        Self::new(
            &config.base_url,
            &config.api_key_header,
            &config.api_key,
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl HistoryArchive for HttpHistoryArchive {
    #[instrument(
        name = "http_archive_store",
        skip(self, entry),
        fields(phone = %entry.phone, endpoint = %self.endpoint)
    )]
    async fn archive(&self, entry: &ArchiveEntry) -> Result<(), ContractError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(self.header.clone(), self.api_key.clone())
            .json(entry)
            .send()
            .await
            .map_err(|e| ContractError::archive(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::archive(format!(
                "archive service returned {status}"
            )));
        }
        debug!(%status, "Chat history stored");
        Ok(())
    }
}

/// Archive selected by configuration
#[derive(Debug, Clone)]
pub enum ConfiguredArchive {
    Http(HttpHistoryArchive),
    /// Archiving switched off; every call succeeds without I/O
    Disabled,
}

impl ConfiguredArchive {
    pub fn from_config(config: &ArchiveConfig) -> Result<Self, ContractError> {
        if !config.enabled {
            return Ok(Self::Disabled);
        }
        HttpHistoryArchive::from_config(config).map(Self::Http)
    }
}

impl HistoryArchive for ConfiguredArchive {
    async fn archive(&self, entry: &ArchiveEntry) -> Result<(), ContractError> {
        match self {
            ConfiguredArchive::Http(archive) => archive.archive(entry).await,
            ConfiguredArchive::Disabled => Ok(()),
        }
    }
}

/// Records entries in memory, optionally failing every call
#[derive(Debug, Default)]
pub struct MemoryArchive {
    entries: Mutex<Vec<ArchiveEntry>>,
    fail: bool,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archive that rejects every entry (after recording it)
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn entries(&self) -> Vec<ArchiveEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HistoryArchive for MemoryArchive {
    async fn archive(&self, entry: &ArchiveEntry) -> Result<(), ContractError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        if self.fail {
            return Err(ContractError::archive("archive unavailable"));
        }
        Ok(())
    }
}
