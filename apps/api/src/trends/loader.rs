//! Dataset loader: parses a CSV trends catalog into validated `TrendRecord`s.
//!
//! Parsing is a pure function of the source bytes, so results are memoized in
//! a bounded LRU keyed by the SHA-256 of the content. Two uploads with the same
//! bytes share one parsed record set.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use lru::LruCache;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::trends::models::{DatasetSource, TrendCatalog, TrendRecord, TREND_COLUMNS};

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("source has no header row")]
    MissingHeader,
}

/// Parses CSV bytes into trend records.
///
/// Unknown columns are ignored, absent known columns become empty strings, and
/// rows whose name is empty or whitespace are dropped. Row order is preserved.
pub fn parse_trends(bytes: &[u8]) -> Result<Vec<TrendRecord>, DataSourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DataSourceError::MissingHeader);
    }

    // Column index per known field; None when the column is absent.
    let columns = TREND_COLUMNS.map(|column| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == column)
    });

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |i: usize| {
            columns[i]
                .and_then(|idx| row.get(idx))
                .unwrap_or_default()
                .to_string()
        };

        let record = TrendRecord {
            name: cell(0),
            description: cell(1),
            why_now: cell(2),
            opportunities: cell(3),
            examples: cell(4),
        };
        if record.name.trim().is_empty() {
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Loads catalogs from disk or from uploaded bytes, reusing parsed results.
pub struct TrendLoader {
    cache: Mutex<LruCache<String, Arc<[TrendRecord]>>>,
}

impl TrendLoader {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Loads the catalog stored at `path`. Used for the configured default.
    pub async fn load_path(&self, path: &Path) -> Result<TrendCatalog, DataSourceError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DataSourceError::Io {
                path: path.display().to_string(),
                source,
            })?;
        self.load_bytes(
            DatasetSource::Default {
                path: path.to_path_buf(),
            },
            &bytes,
        )
        .await
    }

    pub async fn load_bytes(
        &self,
        source: DatasetSource,
        bytes: &[u8],
    ) -> Result<TrendCatalog, DataSourceError> {
        let content_hash = content_hash(bytes);

        if let Some(records) = self.cache.lock().await.get(&content_hash).cloned() {
            debug!("Trend catalog cache hit ({content_hash})");
            return Ok(TrendCatalog {
                source,
                content_hash,
                records,
            });
        }

        let records: Arc<[TrendRecord]> = parse_trends(bytes)?.into();
        info!(
            "Loaded {} trends from {:?} ({content_hash})",
            records.len(),
            source
        );

        self.cache
            .lock()
            .await
            .put(content_hash.clone(), records.clone());

        Ok(TrendCatalog {
            source,
            content_hash,
            records,
        })
    }
}
