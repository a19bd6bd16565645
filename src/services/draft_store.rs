// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Persisted onboarding draft store.
//!
//! Drafts are keyed by the verified phone number of the onboarding flow,
//! so concurrent applicants on one deployment never collide. Every
//! mutation persists the whole draft; callers validate sections before
//! writing them here.

use std::sync::Arc;

use crate::db::KvStore;
use crate::error::AppError;
use crate::models::{Draft, DraftSection};

pub struct DraftStore {
    kv: Arc<dyn KvStore>,
}

impl DraftStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn storage_key(key: &str) -> String {
        format!("draft:{key}")
    }

    /// Current draft aggregate; empty if nothing is stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Draft, AppError> {
        match self.kv.get(&Self::storage_key(key)).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Corrupt draft for {}: {}", key, e))
            }),
            None => Ok(Draft::default()),
        }
    }

    /// Replace one section wholesale and persist the entire draft.
    ///
    /// No validation happens here; steps validate before calling.
    pub async fn set_section(&self, key: &str, section: DraftSection) -> Result<Draft, AppError> {
        let mut draft = self.get(key).await?;
        draft.set_section(section);

        let raw = serde_json::to_string(&draft)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize draft: {}", e)))?;
        self.kv.put(&Self::storage_key(key), raw).await?;

        Ok(draft)
    }

    /// Clear all sections and remove the persisted state.
    pub async fn reset(&self, key: &str) -> Result<(), AppError> {
        self.kv.remove(&Self::storage_key(key)).await
    }
}
