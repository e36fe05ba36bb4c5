use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// CSV column names, in the order they are serialized and displayed.
pub const TREND_COLUMNS: [&str; 5] = [
    "trend_nome",
    "descricao",
    "porque_agora",
    "oportunidades",
    "exemplos",
];

/// One trend entry of the catalog.
///
/// Field names on the wire (CSV headers, prompt JSON, API responses) are the
/// catalog's Portuguese column names. Absent columns deserialize as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendRecord {
    #[serde(rename = "trend_nome", default)]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "porque_agora", default)]
    pub why_now: String,
    #[serde(rename = "oportunidades", default)]
    pub opportunities: String,
    #[serde(rename = "exemplos", default)]
    pub examples: String,
}

impl TrendRecord {
    /// The five fields in column order.
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.name,
            &self.description,
            &self.why_now,
            &self.opportunities,
            &self.examples,
        ]
    }
}

/// Where a catalog came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetSource {
    Default { path: PathBuf },
    Upload { file_name: String },
}

/// A loaded, validated catalog. Records are shared and never mutated.
#[derive(Debug, Clone)]
pub struct TrendCatalog {
    pub source: DatasetSource,
    pub content_hash: String,
    pub records: Arc<[TrendRecord]>,
}

