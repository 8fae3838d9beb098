//! Bulk operation dispatcher.
//!
//! Assigns the operation id, writes the initial `PROCESSING` snapshot and
//! hands the rows to the [`BatchExecutor`] on a detached Tokio task. The
//! caller gets the id back immediately; everything after that is reported
//! only through the progress store.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use catalog_core::bulk::{new_operation_id, OperationKind, OperationSnapshot, OperationStatus};
use catalog_core::tabular::TabularRow;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use super::executor::BatchExecutor;
use super::tabular::{parse_rows, TabularError};

/// A dispatched operation. Dropping `handle` does not stop the work.
#[derive(Debug)]
pub struct DispatchedOperation {
    pub operation_id: String,
    pub total: usize,
    pub handle: JoinHandle<OperationSnapshot>,
}

#[derive(Clone)]
pub struct BulkDispatcher {
    executor: Arc<BatchExecutor>,
    tracker: TaskTracker,
}

impl BulkDispatcher {
    pub fn new(executor: Arc<BatchExecutor>) -> Self {
        Self {
            executor,
            tracker: TaskTracker::new(),
        }
    }

    /// Parse an uploaded file and dispatch its rows.
    pub async fn dispatch_upload(
        &self,
        kind: OperationKind,
        file: &[u8],
    ) -> Result<DispatchedOperation, TabularError> {
        let rows = parse_rows(file)?;
        Ok(self.dispatch(kind, rows).await)
    }

    /// Start an operation over already-parsed rows.
    pub async fn dispatch(&self, kind: OperationKind, rows: Vec<TabularRow>) -> DispatchedOperation {
        let operation_id = new_operation_id(kind);
        let total = rows.len();
        let snapshot = OperationSnapshot::processing(kind, total);

        self.executor.publish(&operation_id, &snapshot).await;

        let span = tracing::info_span!(
            "bulk_operation",
            operation_id = %operation_id,
            kind = kind.as_str(),
        );
        let executor = Arc::clone(&self.executor);
        let id = operation_id.clone();

        let handle = self.tracker.spawn(
            async move {
                let initial = snapshot.clone();
                match AssertUnwindSafe(executor.run(&id, snapshot, rows))
                    .catch_unwind()
                    .await
                {
                    Ok(terminal) => terminal,
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        tracing::error!(error = %message, "Bulk operation panicked");

                        let mut failed = executor.last_snapshot(&id).await.unwrap_or(initial);
                        failed.status = OperationStatus::Failed;
                        failed.error = Some(format!("Bulk operation panicked: {message}"));
                        failed.updated_at = chrono::Utc::now();
                        executor.publish(&id, &failed).await;
                        failed
                    }
                }
            }
            .instrument(span),
        );

        tracing::info!(
            operation_id = %operation_id,
            kind = kind.as_str(),
            total,
            "Bulk operation dispatched",
        );

        DispatchedOperation {
            operation_id,
            total,
            handle,
        }
    }

    /// Number of operations still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting work and wait up to `timeout` for running operations.
    pub async fn shutdown(&self, timeout: Duration) {
        self.tracker.close();
        if tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                in_flight = self.tracker.len(),
                "Shutdown timeout reached with bulk operations still running",
            );
        } else {
            tracing::info!("All bulk operations drained");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
