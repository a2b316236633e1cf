use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
struct Flags {
    running: bool,
    pending: bool,
}

/// Lets one refresh cycle run at a time. Triggers arriving while a cycle runs
/// collapse into a single follow-up cycle.
#[derive(Debug, Default)]
pub struct RefreshGate {
    flags: Mutex<Flags>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Default::default()
    }

    /// True when the caller should run a cycle. Otherwise a follow-up is
    /// recorded for whoever is running.
    pub fn try_begin(&self) -> bool {
        let mut flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        if flags.running {
            flags.pending = true;
            false
        } else {
            flags.running = true;
            true
        }
    }

    /// Ends a cycle. True means a trigger came in meanwhile and the caller
    /// keeps the gate for one more cycle.
    pub fn finish(&self) -> bool {
        let mut flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        if flags.pending {
            flags.pending = false;
            true
        } else {
            flags.running = false;
            false
        }
    }

    /// Opens the gate after a cycle died without finishing.
    pub fn reset(&self) {
        let mut flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        *flags = Flags::default();
    }

    pub fn is_running(&self) -> bool {
        self.flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .running
    }
}
