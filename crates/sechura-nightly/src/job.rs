//! Job registry and progress reporting contracts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::coordinator::UpdateSummary;

/// Unique identifier for an update job.
pub type JobId = Uuid;

/// Coarse pipeline phase of one symbol's update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePhase {
    /// Queued, waiting on the concurrency gate.
    #[default]
    Pending,
    /// Completeness validation running.
    Validating,
    /// Gap recovery and source refresh running.
    Downloading,
    /// Derived timeframes being rebuilt.
    Resampling,
    /// Pipeline finished clean.
    Completed,
    /// Pipeline aborted with an error.
    Failed,
}

impl UpdatePhase {
    /// Nominal completion percentage when a symbol enters this phase.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Validating => 10,
            Self::Downloading => 45,
            Self::Resampling => 75,
            Self::Completed | Self::Failed => 100,
        }
    }

    /// Returns true if the phase is terminal.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns the phase as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validating => "validating",
            Self::Downloading => "downloading",
            Self::Resampling => "resampling",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of one symbol's progress through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolProgress {
    /// Symbol being processed.
    pub symbol: String,
    /// Current phase.
    pub phase: UpdatePhase,
    /// Completion percentage, 0 to 100.
    pub percent: u8,
    /// Free-text description of the current step.
    pub current_step: String,
    /// Error text when the phase is [`UpdatePhase::Failed`].
    pub error_message: Option<String>,
}

/// Receiver of per-symbol progress snapshots.
///
/// Implementations belong to the caller (API layer, CLI, test harness);
/// the coordinator only pushes. One snapshot per phase transition, single
/// writer per symbol.
pub trait ProgressSink: Send + Sync {
    /// Receives one progress snapshot.
    fn report(&self, progress: SymbolProgress);
}

/// Sink that discards all snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn report(&self, _progress: SymbolProgress) {}
}

/// Lifecycle state of a registered job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job identifier.
    pub id: JobId,
    /// Symbols the job covers.
    pub symbols: Vec<String>,
    /// When the job was registered.
    pub started_at: DateTime<Utc>,
    /// Summary, present once the job finished.
    pub summary: Option<UpdateSummary>,
    /// Error text when the job aborted before producing a summary.
    pub error_message: Option<String>,
}

impl JobRecord {
    /// Returns true if the job reached a terminal state.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.summary.is_some() || self.error_message.is_some()
    }
}

/// In-process registry of running and finished jobs.
///
/// An explicit object handed to whoever needs visibility, not process
/// state; two registries never observe each other's jobs.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, JobRecord>>>,
}

impl JobRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new job and returns its identifier.
    pub async fn create(&self, symbols: Vec<String>) -> JobId {
        let id = Uuid::new_v4();
        let record = JobRecord {
            id,
            symbols,
            started_at: Utc::now(),
            summary: None,
            error_message: None,
        };
        self.jobs.write().await.insert(id, record);
        id
    }

    /// Marks a job finished with its summary.
    pub async fn complete(&self, id: JobId, summary: UpdateSummary) {
        if let Some(record) = self.jobs.write().await.get_mut(&id) {
            record.summary = Some(summary);
        }
    }

    /// Marks a job aborted with an error.
    pub async fn fail(&self, id: JobId, message: String) {
        if let Some(record) = self.jobs.write().await.get_mut(&id) {
            record.error_message = Some(message);
        }
    }

    /// Returns a snapshot of the job, if registered.
    pub async fn get(&self, id: JobId) -> Option<JobRecord> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Drops a job's record, returning it if present.
    pub async fn remove(&self, id: JobId) -> Option<JobRecord> {
        self.jobs.write().await.remove(&id)
    }

    /// Returns snapshots of all unfinished jobs.
    pub async fn active(&self) -> Vec<JobRecord> {
        self.jobs
            .read()
            .await
            .values()
            .filter(|r| !r.is_finished())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_percentages_monotonic() {
        let order = [
            UpdatePhase::Pending,
            UpdatePhase::Validating,
            UpdatePhase::Downloading,
            UpdatePhase::Resampling,
            UpdatePhase::Completed,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].percent() < pair[1].percent());
        }
        assert!(UpdatePhase::Failed.is_finished());
        assert!(!UpdatePhase::Resampling.is_finished());
    }

    #[tokio::test]
    async fn test_registry_lifecycle() {
        let registry = JobRegistry::new();
        let id = registry.create(vec!["AAPL".to_string()]).await;

        let record = registry.get(id).await.unwrap();
        assert!(!record.is_finished());
        assert_eq!(registry.active().await.len(), 1);

        registry.fail(id, "vendor offline".to_string()).await;
        let record = registry.get(id).await.unwrap();
        assert!(record.is_finished());
        assert!(registry.active().await.is_empty());

        let removed = registry.remove(id).await.unwrap();
        assert_eq!(removed.id, id);
        assert!(registry.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_registries_are_isolated() {
        let a = JobRegistry::new();
        let b = JobRegistry::new();
        let id = a.create(vec!["AAPL".to_string()]).await;
        assert!(b.get(id).await.is_none());
    }
}
