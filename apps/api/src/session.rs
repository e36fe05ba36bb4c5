//! Per-session state: the uploaded catalog override and the last generation
//! result, plus the store that owns every live session.
//!
//! Sessions never share mutable state. Access goes through closures so the
//! store lock is never held across an `.await`.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::trends::models::TrendCatalog;

pub const EXPORT_FILE_NAME: &str = "ideias.md";
pub const EXPORT_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// The last successful generation of a session.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub text: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SessionState {
    pub created_at: DateTime<Utc>,
    uploaded_catalog: Option<TrendCatalog>,
    last_result: Option<GenerationResult>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            uploaded_catalog: None,
            last_result: None,
        }
    }

    /// Overwrites the held result.
    pub fn record_result(&mut self, text: impl Into<String>, model: impl Into<String>) {
        self.last_result = Some(GenerationResult {
            text: text.into(),
            model: model.into(),
            generated_at: Utc::now(),
        });
    }

    pub fn last_result(&self) -> Option<&GenerationResult> {
        self.last_result.as_ref()
    }

    /// UTF-8 bytes of the last result, or `None` when there is nothing to export.
    pub fn export(&self) -> Option<Bytes> {
        self.last_result
            .as_ref()
            .filter(|r| !r.text.is_empty())
            .map(|r| Bytes::from(r.text.clone()))
    }

    pub fn uploaded_catalog(&self) -> Option<&TrendCatalog> {
        self.uploaded_catalog.as_ref()
    }

    pub fn set_uploaded_catalog(&mut self, catalog: TrendCatalog) {
        self.uploaded_catalog = Some(catalog);
    }

    /// Drops the upload; returns whether there was one.
    pub fn clear_uploaded_catalog(&mut self) -> bool {
        self.uploaded_catalog.take().is_some()
    }
}

/// Owns all live sessions, keyed by a random id.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, SessionState::new());
        info!("Session {id} started");
        id
    }

    /// Ends a session, discarding its result and upload.
    pub async fn end(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Session {id} ended"))
            .ok_or_else(|| not_found(id))
    }

    pub async fn read<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&SessionState) -> T,
    ) -> Result<T, AppError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(f(session))
    }

    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut SessionState) -> T,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        Ok(f(session))
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
