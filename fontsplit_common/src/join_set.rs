use anyhow::Result;
use std::sync::Arc;
use tokio::{sync::Semaphore, task::JoinHandle};
use tracing::Instrument;

/// Runs blocking jobs on the tokio blocking pool with at most `limit` running at once.
///
/// Results are returned in the order the jobs were spawned, regardless of completion order.
/// Must be used from within a tokio runtime.
pub struct JoinSet<T> {
    permits: Arc<Semaphore>,
    joins: Vec<JoinHandle<Result<T>>>,
}
impl<T: Send + 'static> JoinSet<T> {
    pub fn new(limit: usize) -> Self {
        JoinSet { permits: Arc::new(Semaphore::new(limit.max(1))), joins: Vec::new() }
    }

    pub fn spawn_blocking(&mut self, func: impl FnOnce() -> Result<T> + Send + 'static) {
        let permits = self.permits.clone();
        self.joins.push(tokio::spawn(
            async move {
                let _permit = permits.acquire_owned().await?;
                tokio::task::spawn_blocking(func).await?
            }
            .in_current_span(),
        ));
    }

    pub async fn join(self) -> Result<Vec<T>> {
        let mut result = Vec::new();
        for join in self.joins {
            result.push(join.await??)
        }
        Ok(result)
    }
}
