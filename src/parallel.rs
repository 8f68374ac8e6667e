use crate::error::{DocsError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Executes tasks in parallel with a specified concurrency limit
#[derive(Clone)]
pub struct ParallelProcessor {
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
}

/// Aborts whatever is still running if the caller stops waiting
struct AbortOnDrop<T>(Vec<JoinHandle<T>>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

impl ParallelProcessor {
    /// Creates a new parallel processor with the specified concurrency limit
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// The concurrency limit
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Runs the tasks with bounded concurrency and returns their results in
    /// submission order
    pub async fn process<F, T>(&self, tasks: Vec<F>) -> Vec<Result<T>>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut handles = AbortOnDrop(Vec::with_capacity(tasks.len()));

        for task in tasks {
            let semaphore = Arc::clone(&self.semaphore);
            handles.0.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| DocsError::Task(e.to_string()))?;
                task.await
            }));
        }

        let mut results = Vec::with_capacity(handles.0.len());
        for handle in handles.0.iter_mut() {
            results.push(
                handle
                    .await
                    .unwrap_or_else(|e| Err(DocsError::Task(e.to_string()))),
            );
        }
        results
    }
}
