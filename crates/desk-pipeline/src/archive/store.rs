//! Append-only report store with vector similarity search
//!
//! Reports live in a JSON-lines text file; embeddings live in a sibling
//! vector file keyed by record id. The two files are written best-effort in
//! that order: a report may exist without a vector (then it is invisible to
//! similarity search), but a vector never exists without its report.

use crate::error::{DeskError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::warn;

const REPORTS_FILE: &str = "reports.jsonl";
const VECTORS_FILE: &str = "vectors.jsonl";

/// One archived report record; never mutated after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: u64,
    pub ticker: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VectorRecord {
    id: u64,
    embedding: Vec<f32>,
}

#[derive(Default)]
struct StoreIndex {
    records: Vec<ReportRecord>,
    vectors: HashMap<u64, Vec<f32>>,
    next_id: u64,
}

/// File-backed report store shared by all concurrent runs
///
/// Writers only ever append their own new records, so a single RwLock is
/// enough to keep concurrent runs consistent.
pub struct ReportStore {
    report_path: PathBuf,
    vector_path: PathBuf,
    index: RwLock<StoreIndex>,
}

impl ReportStore {
    /// Open (or create) a store in the given directory
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let report_path = dir.join(REPORTS_FILE);
        let vector_path = dir.join(VECTORS_FILE);

        let mut index = StoreIndex::default();

        if let Ok(data) = tokio::fs::read_to_string(&report_path).await {
            for line in data.lines().filter(|l| !l.trim().is_empty()) {
                match serde_json::from_str::<ReportRecord>(line) {
                    Ok(record) => {
                        index.next_id = index.next_id.max(record.id + 1);
                        index.records.push(record);
                    }
                    Err(e) => warn!(error = %e, "Skipping corrupt report record"),
                }
            }
        }

        if let Ok(data) = tokio::fs::read_to_string(&vector_path).await {
            for line in data.lines().filter(|l| !l.trim().is_empty()) {
                match serde_json::from_str::<VectorRecord>(line) {
                    Ok(record) => {
                        index.vectors.insert(record.id, record.embedding);
                    }
                    Err(e) => warn!(error = %e, "Skipping corrupt vector record"),
                }
            }
        }

        Ok(Self {
            report_path,
            vector_path,
            index: RwLock::new(index),
        })
    }

    /// Append a report's text record; returns the new record id
    pub async fn append(&self, ticker: &str, content: &str) -> Result<u64> {
        let mut index = self.index.write().await;

        let record = ReportRecord {
            id: index.next_id,
            ticker: ticker.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };

        append_line(&self.report_path, &record).await?;
        index.next_id += 1;
        index.records.push(record.clone());
        Ok(record.id)
    }

    /// Attach an embedding to a previously appended record
    pub async fn attach_embedding(&self, id: u64, embedding: Vec<f32>) -> Result<()> {
        let mut index = self.index.write().await;

        if !index.records.iter().any(|r| r.id == id) {
            return Err(DeskError::Archive(format!("no report record with id {id}")));
        }

        let record = VectorRecord { id, embedding };
        append_line(&self.vector_path, &record).await?;
        index.vectors.insert(record.id, record.embedding);
        Ok(())
    }

    /// Nearest-neighbor search over records that carry an embedding
    ///
    /// Returns up to `k` records in descending cosine similarity; ties are
    /// broken most-recent first. Records without an embedding never match.
    pub async fn search(&self, query: &[f32], k: usize) -> Result<Vec<ReportRecord>> {
        let index = self.index.read().await;

        let mut scored: Vec<(f32, &ReportRecord)> = index
            .records
            .iter()
            .filter_map(|record| {
                let embedding = index.vectors.get(&record.id)?;
                Some((cosine_similarity(query, embedding), record))
            })
            .collect();

        scored.sort_by(|(sim_a, rec_a), (sim_b, rec_b)| {
            sim_b
                .partial_cmp(sim_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| rec_b.created_at.cmp(&rec_a.created_at))
                .then_with(|| rec_b.id.cmp(&rec_a.id))
        });

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, record)| record.clone())
            .collect())
    }

    /// Number of stored report records
    pub async fn len(&self) -> usize {
        self.index.read().await.records.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

async fn append_line<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Cosine similarity; zero for mismatched dimensions or zero vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
