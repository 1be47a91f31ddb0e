//! Shutdown signalling for the ingestion loop.
//!
//! The controller wraps a cancellation token that the loop hands to every poll.
//! Triggering it from any thread or task makes an in-flight poll return
//! promptly, after which the loop releases its clients and exits.

use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// External, cross-task shutdown trigger.
#[derive(Debug, Clone, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Token observed by the ingestion loop.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Request shutdown. Safe to call concurrently and more than once.
    pub fn trigger(&self) {
        if !self.token.is_cancelled() {
            info!("Shutdown requested");
        }
        self.token.cancel();
    }

    /// Trigger shutdown on SIGINT or SIGTERM.
    ///
    /// The returned task ends once a signal arrives or the token is cancelled
    /// by other means.
    pub fn register_signal_handlers(&self) -> JoinHandle<()> {
        let controller = self.clone();

        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(e) = signal::ctrl_c().await {
                    error!(error = %e, "Failed to install SIGINT handler");
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut stream) => {
                        stream.recv().await;
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to install SIGTERM handler");
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {
                    info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                }
                _ = terminate => {
                    info!("Received SIGTERM, initiating graceful shutdown");
                }
                _ = controller.token.cancelled() => return,
            }

            controller.trigger();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_cancels_token() {
        let controller = ShutdownController::new();
        let token = controller.token();
        assert!(!token.is_cancelled());

        controller.trigger();

        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_trigger_is_idempotent() {
        let controller = ShutdownController::new();
        controller.trigger();
        controller.trigger();
        assert!(controller.token().is_cancelled());
    }

    #[tokio::test]
    async fn test_trigger_from_another_thread_wakes_waiter() {
        let controller = ShutdownController::new();
        let token = controller.token();

        let trigger = controller.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            trigger.trigger();
        });

        tokio::time::timeout(Duration::from_secs(5), token.cancelled())
            .await
            .expect("token should be cancelled by the other thread");
    }

    #[tokio::test]
    async fn test_signal_task_ends_on_cancel() {
        let controller = ShutdownController::new();
        let handle = controller.register_signal_handlers();

        controller.trigger();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("signal task should finish")
            .unwrap();
    }
}
