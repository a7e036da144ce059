use log::{debug, error, info};
use std::time::Duration;
use tokio::{select, time::sleep};
use tokio_util::sync::CancellationToken;

use crate::status::StatusReporter;

/// Periodically writes the player and game counts returned by `source` until
/// `token` is cancelled.
///
/// A failed write is logged and retried on the next tick.
pub async fn report_status<F>(
    reporter: StatusReporter,
    interval: Duration,
    mut source: F,
    token: CancellationToken,
) where
    F: FnMut() -> (u32, u32),
{
    info!("Starting status reporting for {}...", reporter.game_id());
    info!("Status file: {}", reporter.path().display());
    info!("Report interval: {} seconds", interval.as_secs());

    loop {
        // Check if we should shutdown before writing
        if token.is_cancelled() {
            info!("Shutdown requested, stopping status reporter");
            break;
        }

        let (players, games) = source();
        match reporter.update(players, games) {
            Ok(()) => debug!("{}: {players} players, {games} games", reporter.game_id()),
            Err(e) => error!("Error writing status for {}: {e}", reporter.game_id()),
        }

        // Interruptible sleep
        select! {
            () = sleep(interval) => {},
            () = token.cancelled() => {
                info!("Shutdown requested during sleep");
                break;
            }
        }
    }

    info!("Status reporting stopped gracefully");
}
