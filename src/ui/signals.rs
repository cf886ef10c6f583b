use crate::error::{DumpError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct ShutdownFlags {
    stopping: AtomicBool,
    in_batch: AtomicBool,
    shutdown_message_shown: AtomicBool,
}

/// What a Ctrl+C press should do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Let the running dump stop after its current chunk.
    StopAfterChunk,
    /// Leave the process immediately.
    Exit,
}

impl ShutdownFlags {
    fn interrupt(&self) -> InterruptAction {
        self.stopping.store(true, Ordering::SeqCst);

        // Outside a batch (at a prompt) nothing needs to finish.
        if !self.in_batch.load(Ordering::SeqCst) {
            return InterruptAction::Exit;
        }

        if self.shutdown_message_shown.swap(true, Ordering::SeqCst) {
            InterruptAction::Exit
        } else {
            InterruptAction::StopAfterChunk
        }
    }
}

pub struct GracefulShutdown {
    flags: Arc<ShutdownFlags>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let shutdown = Self::new_for_test();
        let flags = shutdown.flags.clone();

        ctrlc::set_handler(move || match flags.interrupt() {
            InterruptAction::StopAfterChunk => {
                eprintln!("\n🛑 Stopping after the current chunk... (press Ctrl+C again to force exit)");
            }
            InterruptAction::Exit => {
                if flags.in_batch.load(Ordering::SeqCst) {
                    eprintln!("\n💀 Force stopping...");
                } else {
                    eprintln!();
                }
                std::process::exit(130);
            }
        })
        .map_err(|e| DumpError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(shutdown)
    }

    /// Create a GracefulShutdown instance for testing (no signal handler registration)
    pub fn new_for_test() -> Self {
        Self {
            flags: Arc::new(ShutdownFlags::default()),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.flags.stopping.load(Ordering::SeqCst)
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if !self.is_running() {
            return Err(DumpError::Cancelled);
        }
        Ok(())
    }

    pub fn request_shutdown(&self) {
        self.flags.stopping.store(true, Ordering::SeqCst);
    }

    /// Marks a batch as running until the guard is dropped. Ctrl+C during a
    /// batch stops gracefully; anywhere else it exits at once.
    pub fn enter_batch(&self) -> BatchGuard<'_> {
        self.flags.in_batch.store(true, Ordering::SeqCst);
        BatchGuard { shutdown: self }
    }

    pub fn in_batch(&self) -> bool {
        self.flags.in_batch.load(Ordering::SeqCst)
    }

    /// Applies a Ctrl+C press to the shared state and says what the handler does next.
    pub fn interrupt(&self) -> InterruptAction {
        self.flags.interrupt()
    }
}

pub struct BatchGuard<'a> {
    shutdown: &'a GracefulShutdown,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.shutdown.flags.in_batch.store(false, Ordering::SeqCst);
    }
}
