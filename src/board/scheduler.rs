use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::board::Board;

/// Periodic refresh trigger. The interval is read from the board before
/// every tick so a changed setting applies on the next one.
#[derive(Default)]
pub struct Scheduler {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Default::default()
    }

    /// Starts ticking. Does nothing when already started.
    pub fn start(&self, board: Board) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }
        info!(
            "Refreshing departures every {:?}",
            board.refresh_interval()
        );
        *task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(board.refresh_interval()).await;
                debug!("Scheduled refresh");
                board.refresh().await;
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
            info!("Stopped scheduled refresh");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

pub(crate) fn interval(seconds: u32) -> Duration {
    Duration::from_secs(u64::from(seconds.max(crate::settings::MIN_REFRESH_SECONDS)))
}
