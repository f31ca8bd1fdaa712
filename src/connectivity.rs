use std::sync::atomic::{AtomicBool, Ordering};

/// Platform network state, asked synchronously before any remote call.
pub trait Connectivity: Send + Sync {
    fn is_connected(&self) -> bool;
}

/// Connectivity flag flipped by whoever observes the network (the platform layer, or tests).
pub struct NetworkMonitor {
    connected: AtomicBool,
}

impl NetworkMonitor {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        if self.connected.swap(connected, Ordering::SeqCst) != connected {
            log::info!(
                "network is now {}",
                if connected { "available" } else { "unavailable" }
            );
        }
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for NetworkMonitor {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
