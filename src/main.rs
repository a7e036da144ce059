use std::process::ExitCode;
use std::time::Duration;

use dcnet_util::{Dispatcher, Notification, Paths};
use log::{error, info, warn};
use tokio::time::{sleep, timeout};

const USAGE: &str = "usage: dcnet-notify <game-id> <content> [embed-title] [embed-text]";
const DRAIN_TIMEOUT: Duration = Duration::from_secs(35);

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [game_id, content, rest @ ..] = args.as_slice() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let title = rest.first().map_or("", String::as_str);
    let text = rest.get(1).map_or("", String::as_str);

    let dispatcher = match Dispatcher::new(Paths::from_env()) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = dispatcher.notify(game_id, &Notification::new(content.as_str(), title, text)) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    // Posts run in the background; keep the runtime alive until they finish.
    let drained = timeout(DRAIN_TIMEOUT, async {
        while dispatcher.in_flight() > 0 {
            sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    if drained.is_err() {
        warn!("Gave up waiting for the Discord webhook after {DRAIN_TIMEOUT:?}");
        return ExitCode::FAILURE;
    }
    info!("Done");
    ExitCode::SUCCESS
}
