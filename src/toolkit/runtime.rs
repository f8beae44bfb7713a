//! Process-wide toolkit state.
//!
//! The toolkit is initialized once per process, before the first window is
//! constructed, by whichever backend starts first. There is no teardown: the
//! state lives until the process exits.

use std::sync::OnceLock;
use std::time::Instant;

use tracing::{debug, info};

/// Facts recorded by the first toolkit initialization.
#[derive(Debug)]
pub struct Runtime {
    backend: &'static str,
    started_at: Instant,
}

impl Runtime {
    /// Name of the backend that performed the initialization.
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Initializes the process-wide toolkit state; later calls are no-ops that
/// return the state recorded by the first one.
pub fn initialize(backend: &'static str) -> &'static Runtime {
    let mut first = false;
    let runtime = RUNTIME.get_or_init(|| {
        first = true;
        Runtime {
            backend,
            started_at: Instant::now(),
        }
    });
    if first {
        info!(backend, "toolkit initialized");
    } else {
        debug!(backend, initialized_by = runtime.backend, "toolkit already initialized");
    }
    runtime
}

pub fn is_initialized() -> bool {
    RUNTIME.get().is_some()
}

pub fn get() -> Option<&'static Runtime> {
    RUNTIME.get()
}
