use thiserror::Error;
use tracing::info;

use crate::alerts::AlertEvent;

#[derive(Error, Debug)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers alert events, e.g. as desktop or push notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError>;
}

/// Writes alerts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        info!("{}: {}", event.title(), event.message());
        Ok(())
    }
}
