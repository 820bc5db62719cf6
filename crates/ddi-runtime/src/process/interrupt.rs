//! Session-wide Ctrl+C handling.

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Token cancelled on the first Ctrl+C for as long as the runtime lives.
///
/// Install it once, before the first fold: the listener then also covers
/// the gaps between two child processes.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let watched = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = signal::ctrl_c() => match result {
                Ok(()) => {
                    warn!("Ctrl+C received, stopping");
                    watched.cancel();
                }
                Err(e) => warn!(error = %e, "Cannot listen for Ctrl+C"),
            },
            () = watched.cancelled() => debug!("Ctrl+C listener released"),
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_starts_live_and_cancels_on_demand() {
        let token = cancel_on_ctrl_c();
        assert!(!token.is_cancelled());

        token.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), token.cancelled())
            .await
            .unwrap();
    }
}
