//! Best-effort storage cleanup.
//!
//! Some storage deletes never fail the surrounding operation: removing an
//! oversize upload, removing a promoted draft object, removing the object of a
//! deleted image. Their failures go to a [`BestEffortReporter`] instead.

use imagery_storage::{ObjectStorage, StorageError};

/// Sink for swallowed cleanup failures.
pub trait BestEffortReporter: Send + Sync {
    fn report(&self, operation: &'static str, key: &str, error: &StorageError);
}

/// Default reporter: a structured `warn` log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl BestEffortReporter for TracingReporter {
    fn report(&self, operation: &'static str, key: &str, error: &StorageError) {
        tracing::warn!(
            error = %error,
            operation,
            storage_key = %key,
            "Best-effort storage delete failed, continuing"
        );
    }
}

/// Delete `key`, reporting instead of returning any failure.
pub(crate) async fn delete_object(
    storage: &dyn ObjectStorage,
    reporter: &dyn BestEffortReporter,
    operation: &'static str,
    key: &str,
) {
    match storage.delete(key).await {
        Ok(()) => {
            tracing::debug!(operation, storage_key = %key, "Deleted object from storage");
        }
        Err(e) => reporter.report(operation, key, &e),
    }
}
