//! Record store adapters for [`CheckpointSource`].

use std::collections::HashMap;

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::model::Checkpoint;
use crate::traits::CheckpointSource;

/// Checkpoints held in memory, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    checkpoints: HashMap<String, Checkpoint>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, checkpoint: Checkpoint) {
        self.checkpoints.insert(checkpoint.id.clone(), checkpoint);
    }
}

impl FromIterator<Checkpoint> for InMemoryStore {
    fn from_iter<I: IntoIterator<Item = Checkpoint>>(iter: I) -> Self {
        let mut store = Self::new();
        for checkpoint in iter {
            store.insert(checkpoint);
        }
        store
    }
}

impl CheckpointSource for InMemoryStore {
    fn checkpoint(&self, id: &str) -> Result<Checkpoint> {
        self.checkpoints
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("checkpoint {} not found", id)))
    }

    fn vehicle_checkpoints(&self, vehicle_id: &str) -> Result<Vec<Checkpoint>> {
        Ok(self
            .checkpoints
            .values()
            .filter(|checkpoint| checkpoint.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct RecordStoreConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Reads checkpoints from a record store over HTTP.
///
/// Expects `GET {base}/checkpoints/{id}` and
/// `GET {base}/vehicles/{vehicle_id}/checkpoints` to return JSON.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    config: RecordStoreConfig,
    client: reqwest::blocking::Client,
}

impl HttpRecordStore {
    pub fn new(config: RecordStoreConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Appends `segments` to the base URL, each percent-encoded as a single
    /// path segment. Empty, `.` and `..` segments are rejected.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url> {
        if let Some(bad) = segments.iter().find(|s| s.is_empty() || **s == "." || **s == "..") {
            return Err(EngineError::Validation(format!(
                "record identifier {:?} is not a valid path segment",
                bad
            )));
        }

        let mut url = reqwest::Url::parse(&self.config.base_url).map_err(|err| {
            EngineError::Validation(format!(
                "invalid record store base_url {}: {}",
                self.config.base_url, err
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                EngineError::Validation(format!(
                    "record store base_url {} cannot carry a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn checkpoint_url(&self, id: &str) -> Result<reqwest::Url> {
        self.endpoint(&["checkpoints", id])
    }

    fn vehicle_url(&self, vehicle_id: &str) -> Result<reqwest::Url> {
        self.endpoint(&["vehicles", vehicle_id, "checkpoints"])
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: reqwest::Url, what: &str) -> Result<T> {
        debug!(%url, "fetching from record store");
        let response = self.client.get(url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(EngineError::NotFound(format!("{} not found", what)));
        }
        let body = response.error_for_status()?.text()?;
        serde_json::from_str(&body).map_err(|err| {
            EngineError::Execution(format!("record store returned malformed {}: {}", what, err))
        })
    }
}

impl CheckpointSource for HttpRecordStore {
    fn checkpoint(&self, id: &str) -> Result<Checkpoint> {
        self.get_json(self.checkpoint_url(id)?, &format!("checkpoint {}", id))
    }

    fn vehicle_checkpoints(&self, vehicle_id: &str) -> Result<Vec<Checkpoint>> {
        self.get_json(
            self.vehicle_url(vehicle_id)?,
            &format!("checkpoints of vehicle {}", vehicle_id),
        )
    }
}
