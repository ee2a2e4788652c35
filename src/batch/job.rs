use crate::batch::orchestrator::{BatchOrchestrator, BatchProgress, BatchReport};
use crate::TransposeError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};

/// A batch running on its own worker thread.
pub struct BatchJob {
    result: oneshot::Receiver<Result<BatchReport, TransposeError>>,
    progress: watch::Receiver<BatchProgress>,
    cancel: Arc<AtomicBool>,
}

impl BatchJob {
    /// Starts `orchestrator` on a background thread.
    pub fn spawn(orchestrator: BatchOrchestrator) -> Result<Self, TransposeError> {
        let (result_sender, result) = oneshot::channel();
        let (progress_sender, progress) = watch::channel(BatchProgress::default());
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = cancel.clone();
        std::thread::Builder::new()
            .name("batch-worker".to_string())
            .spawn(move || {
                let report = orchestrator.run_with(&worker_cancel, |progress| {
                    progress_sender.send_replace(progress.clone());
                });
                if result_sender.send(report).is_err() {
                    log::debug!("Batch result dropped, nobody is waiting");
                }
            })?;
        Ok(Self {
            result,
            progress,
            cancel,
        })
    }

    /// Watch the progress of the batch.
    pub fn progress(&self) -> watch::Receiver<BatchProgress> {
        self.progress.clone()
    }

    /// Stop before the next file, files already written are kept.
    pub fn cancel(&self) {
        log::info!("Cancelling batch");
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Blocks until the batch is over. Must not be called from an async context.
    pub fn wait(self) -> Result<BatchReport, TransposeError> {
        self.result
            .blocking_recv()
            .map_err(|err| TransposeError::WorkerError(err.to_string()))?
    }

    /// Awaits the end of the batch.
    pub async fn join(self) -> Result<BatchReport, TransposeError> {
        self.result
            .await
            .map_err(|err| TransposeError::WorkerError(err.to_string()))?
    }
}
