//! Batch executor.
//!
//! Partitions an operation's rows into fixed-size batches and runs them
//! strictly one after another. Each batch is one entity-store transaction;
//! rows inside it are applied sequentially by the kind's [`RecordHandler`].
//! After each committed batch the snapshot is republished as `PROCESSING`.

use std::sync::Arc;
use std::time::Duration;

use catalog_core::bulk::{
    batch_count, OperationKind, OperationSnapshot, OperationStatus, RecordResult,
    DEFAULT_BATCH_SIZE, DEFAULT_PROGRESS_TTL,
};
use catalog_core::tabular::TabularRow;

use super::progress::{load_snapshot, save_snapshot, ProgressStore};
use super::record_handlers::{
    CategoryAssignmentHandler, ImportHandler, PriceUpdateHandler, RecordHandler,
    StatusUpdateHandler, VariantCreationHandler,
};
use super::store::{CatalogStore, StoreError};

/// Default bound on one batch transaction.
const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
pub struct ExecutorSettings {
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub progress_ttl: Duration,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            progress_ttl: DEFAULT_PROGRESS_TTL,
        }
    }
}

pub struct BatchExecutor {
    store: Arc<dyn CatalogStore>,
    progress: Arc<dyn ProgressStore>,
    settings: ExecutorSettings,
}

impl BatchExecutor {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        progress: Arc<dyn ProgressStore>,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            store,
            progress,
            settings,
        }
    }

    /// Run every batch of `rows`, starting from `snapshot`, and return the
    /// terminal snapshot (`COMPLETED` or `FAILED`).
    pub async fn run(
        &self,
        operation_id: &str,
        snapshot: OperationSnapshot,
        rows: Vec<TabularRow>,
    ) -> OperationSnapshot {
        match snapshot.kind {
            OperationKind::Import => {
                self.run_with(&ImportHandler, operation_id, snapshot, &rows)
                    .await
            }
            OperationKind::StatusUpdate => {
                self.run_with(&StatusUpdateHandler, operation_id, snapshot, &rows)
                    .await
            }
            OperationKind::CategoryAssignment => {
                self.run_with(&CategoryAssignmentHandler, operation_id, snapshot, &rows)
                    .await
            }
            OperationKind::PriceUpdate => {
                self.run_with(&PriceUpdateHandler, operation_id, snapshot, &rows)
                    .await
            }
            OperationKind::VariantCreation => {
                self.run_with(&VariantCreationHandler, operation_id, snapshot, &rows)
                    .await
            }
        }
    }

    async fn run_with<H: RecordHandler>(
        &self,
        handler: &H,
        operation_id: &str,
        mut snapshot: OperationSnapshot,
        rows: &[TabularRow],
    ) -> OperationSnapshot {
        let batch_size = self.settings.batch_size.max(1);
        let batches = batch_count(rows.len(), batch_size);
        tracing::debug!(total = rows.len(), batches, "Bulk operation started");

        for (index, chunk) in rows.chunks(batch_size).enumerate() {
            let batch = index + 1;
            let outcome =
                tokio::time::timeout(self.settings.batch_timeout, self.run_batch(handler, chunk))
                    .await
                    .unwrap_or_else(|_| {
                        Err(StoreError::Unavailable(format!(
                            "batch {batch} timed out after {:?}",
                            self.settings.batch_timeout
                        )))
                    });

            match outcome {
                Ok(results) => {
                    snapshot.processed += results.len();
                    snapshot.results.extend(results);
                    snapshot.updated_at = chrono::Utc::now();
                    tracing::debug!(
                        batch,
                        processed = snapshot.processed,
                        total = snapshot.total,
                        "Batch committed",
                    );
                    self.publish(operation_id, &snapshot).await;
                }
                Err(e) => {
                    tracing::error!(
                        batch,
                        processed = snapshot.processed,
                        error = %e,
                        "Bulk operation failed",
                    );
                    snapshot.status = OperationStatus::Failed;
                    snapshot.error = Some(e.to_string());
                    snapshot.updated_at = chrono::Utc::now();
                    self.publish(operation_id, &snapshot).await;
                    return snapshot;
                }
            }
        }

        snapshot.status = OperationStatus::Completed;
        snapshot.updated_at = chrono::Utc::now();
        self.publish(operation_id, &snapshot).await;
        tracing::info!(
            processed = snapshot.processed,
            failed = snapshot.failed_count(),
            "Bulk operation completed",
        );
        snapshot
    }

    /// One transaction: every row is attempted, then the batch commits.
    async fn run_batch<H: RecordHandler>(
        &self,
        handler: &H,
        rows: &[TabularRow],
    ) -> Result<Vec<RecordResult>, StoreError> {
        let mut tx = self.store.begin().await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(handler.handle(tx.as_mut(), row).await?);
        }
        tx.commit().await?;
        Ok(results)
    }

    /// Most recent snapshot written for `operation_id`, if still readable.
    pub async fn last_snapshot(&self, operation_id: &str) -> Option<OperationSnapshot> {
        load_snapshot(self.progress.as_ref(), operation_id)
            .await
            .ok()
            .flatten()
    }

    /// Write the snapshot. Failures are logged and otherwise ignored.
    pub async fn publish(&self, operation_id: &str, snapshot: &OperationSnapshot) {
        if let Err(e) = save_snapshot(
            self.progress.as_ref(),
            operation_id,
            snapshot,
            self.settings.progress_ttl,
        )
        .await
        {
            tracing::warn!(
                operation_id,
                status = ?snapshot.status,
                error = %e,
                "Failed to write progress snapshot",
            );
        }
    }
}
