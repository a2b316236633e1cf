use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use tokio::task::AbortHandle;
use tracing::debug;

use crate::stops::{self, StopGroup, StopIndex};

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// The query was too short, any shown results should go.
    Cleared,
    Results(Vec<StopGroup>),
    /// A newer search replaced this one.
    Superseded,
    Failed(Arc<stops::Error>),
}

/// Type-ahead stop search where the latest query wins. Starting a search
/// aborts the previous one and results of replaced searches are dropped.
pub struct StopSearch {
    index: StopIndex,
    limit: usize,
    min_query_len: usize,
    generation: AtomicU64,
    running: Mutex<Option<AbortHandle>>,
}

impl StopSearch {
    pub fn new(index: StopIndex, limit: usize, min_query_len: usize) -> Self {
        Self {
            index,
            limit,
            min_query_len,
            generation: AtomicU64::new(0),
            running: Mutex::new(None),
        }
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.lock().take() {
            previous.abort();
        }

        let query = query.trim().to_string();
        if query.chars().count() < self.min_query_len {
            return SearchOutcome::Cleared;
        }

        let index = self.index.clone();
        let limit = self.limit;
        let task = tokio::spawn(async move { index.search(&query, limit).await });
        {
            let mut running = self.lock();
            // A newer search may have started while this one was spawning.
            if self.generation.load(Ordering::SeqCst) == generation {
                *running = Some(task.abort_handle());
            } else {
                task.abort();
            }
        }

        let result = task.await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Dropping superseded stop search");
            return SearchOutcome::Superseded;
        }
        match result {
            Ok(Ok(groups)) => SearchOutcome::Results(groups),
            Ok(Err(err)) => SearchOutcome::Failed(err),
            Err(_) => SearchOutcome::Superseded,
        }
    }

    /// Aborts whatever search is running.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.lock().take() {
            previous.abort();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<AbortHandle>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
