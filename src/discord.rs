//! Discord webhook notifications for game servers.
//!
//! A [`Dispatcher`] loads the game catalog and `discord.conf` once, on first use,
//! then turns each [`Dispatcher::notify`] call into a fire-and-forget POST on the
//! Tokio runtime it was created on. At most [`MAX_CONCURRENT`] posts are in flight;
//! anything beyond that is dropped with [`Error::CapacityExceeded`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::runtime::Handle;
use url::Url;

use crate::catalog::GameCatalog;
use crate::config::{DiscordSettings, Paths};
use crate::error::Error;
use crate::http::{DEFAULT_TIMEOUT_SECS, HttpClient, WebhookTransport};

/// Maximum number of webhook posts in flight at once.
pub const MAX_CONCURRENT: usize = 5;
/// Accent color of the notification embed.
pub const EMBED_COLOR: u32 = 9_118_205;

const CONTENT_TYPE_JSON: &str = "application/json";

/// A message to post. Text fields are sent as is; see [`escape`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    pub content: String,
    pub embed_title: String,
    pub embed_text: String,
}

impl Notification {
    #[must_use]
    pub fn new(
        content: impl Into<String>,
        embed_title: impl Into<String>,
        embed_text: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            embed_title: embed_title.into(),
            embed_text: embed_text.into(),
        }
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    embeds: Vec<Embed<'a>>,
}

#[derive(Serialize)]
struct Embed<'a> {
    author: Author<'a>,
    title: &'a str,
    description: &'a str,
    color: u32,
}

#[derive(Serialize)]
struct Author<'a> {
    name: &'a str,
    icon_url: &'a str,
}

fn build_payload(catalog: &GameCatalog, game_id: &str, notif: &Notification) -> Result<String, Error> {
    let game = catalog.lookup(game_id);
    let payload = WebhookPayload {
        content: &notif.content,
        embeds: vec![Embed {
            author: Author {
                name: game.display_name,
                icon_url: game.thumbnail_url,
            },
            title: &notif.embed_title,
            description: &notif.embed_text,
            color: EMBED_COLOR,
        }],
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Escapes Discord markdown characters with a backslash.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '_' | '`' | '~' | '<' | '>' | ':' | '[' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Everything loaded by the one-time initialization.
struct State {
    catalog: GameCatalog,
    webhook: RwLock<String>,
    disabled_games: HashSet<String>,
}

impl State {
    fn load(paths: &Paths) -> Result<Self, String> {
        let catalog = GameCatalog::load(&paths.catalog)
            .map_err(|e| format!("Can't open {}: {e}", paths.catalog.display()))?;
        info!(
            "Loaded {} games from {}",
            catalog.len(),
            paths.catalog.display()
        );

        let settings = DiscordSettings::load(&paths.discord_config).unwrap_or_else(|e| {
            warn!("{e}");
            DiscordSettings::default()
        });

        let webhook = match settings.webhook {
            Some(webhook) => match Url::parse(&webhook) {
                Ok(_) => webhook,
                Err(e) => {
                    warn!("Invalid Discord webhook in {}: {e}", paths.discord_config.display());
                    String::new()
                }
            },
            None => String::new(),
        };
        if webhook.is_empty() {
            warn!("Webhook is not set, no Discord notifications will be sent");
        } else {
            info!("Webhook is set, Discord notifications enabled");
        }
        if !settings.disabled_games.is_empty() {
            info!(
                "Discord notifications disabled for {} games",
                settings.disabled_games.len()
            );
        }

        Ok(Self {
            catalog,
            webhook: RwLock::new(webhook),
            disabled_games: settings.disabled_games,
        })
    }
}

/// One admitted dispatch. Releases its slot when dropped, whatever the outcome.
struct InFlightSlot(Arc<AtomicUsize>);

impl InFlightSlot {
    fn acquire(counter: &Arc<AtomicUsize>) -> Result<Self, Error> {
        if counter.fetch_add(1, Ordering::SeqCst) >= MAX_CONCURRENT {
            counter.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::CapacityExceeded);
        }
        Ok(Self(Arc::clone(counter)))
    }
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Posts game notifications to a Discord webhook.
///
/// Create one per process and share it by reference (or `Arc`). Initialization
/// happens at most once, on the first call to [`configure`](Self::configure),
/// [`init`](Self::init) or [`notify`](Self::notify); concurrent first calls
/// wait for the same load.
pub struct Dispatcher<T = HttpClient> {
    paths: Paths,
    transport: Arc<T>,
    runtime: Handle,
    state: OnceLock<Result<State, String>>,
    in_flight: Arc<AtomicUsize>,
}

impl Dispatcher<HttpClient> {
    /// Creates a dispatcher posting with [`HttpClient`] on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails if called outside a Tokio runtime or if the HTTP client can't be built.
    pub fn new(paths: Paths) -> Result<Self, Error> {
        Self::with_transport(paths, HttpClient::new(DEFAULT_TIMEOUT_SECS)?)
    }
}

impl<T: WebhookTransport> Dispatcher<T> {
    /// # Errors
    ///
    /// Fails if called outside a Tokio runtime.
    pub fn with_transport(paths: Paths, transport: T) -> Result<Self, Error> {
        Ok(Self::with_runtime(paths, transport, Handle::try_current()?))
    }

    /// Creates a dispatcher spawning its posts on `runtime`, so it can be used
    /// from threads outside any runtime.
    pub fn with_runtime(paths: Paths, transport: T, runtime: Handle) -> Self {
        Self {
            paths,
            transport: Arc::new(transport),
            runtime,
            state: OnceLock::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn state(&self) -> Result<&State, Error> {
        self.state
            .get_or_init(|| State::load(&self.paths))
            .as_ref()
            .map_err(|e| Error::InitializationFailed(e.clone()))
    }

    /// Loads the game catalog and Discord settings if not done yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitializationFailed`] if the catalog can't be loaded.
    /// The failure is permanent for this dispatcher.
    pub fn init(&self) -> Result<(), Error> {
        self.state().map(|_| ())
    }

    /// Initializes the dispatcher and, if `webhook_url` isn't empty, makes it the
    /// webhook target. The catalog and disabled games are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitializationFailed`] if the catalog can't be loaded, or
    /// [`Error::UrlParse`] if `webhook_url` isn't a valid URL.
    pub fn configure(&self, webhook_url: &str) -> Result<(), Error> {
        let state = self.state()?;
        if webhook_url.is_empty() {
            return Ok(());
        }
        Url::parse(webhook_url)?;
        *state.webhook.write().unwrap_or_else(PoisonError::into_inner) = webhook_url.to_string();
        Ok(())
    }

    /// Sends `notif` for `game_id` in the background and returns immediately.
    ///
    /// Does nothing if no webhook is set or the game is disabled. Delivery
    /// failures are logged by the background task and never reported here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExceeded`] if [`MAX_CONCURRENT`] posts are already
    /// in flight, or [`Error::InitializationFailed`] if the catalog can't be loaded.
    pub fn notify(&self, game_id: &str, notif: &Notification) -> Result<(), Error> {
        let state = self.state()?;
        let webhook = state
            .webhook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if webhook.is_empty() || state.disabled_games.contains(game_id) {
            debug!("Discord notification for {game_id} suppressed");
            return Ok(());
        }

        let slot = InFlightSlot::acquire(&self.in_flight)?;
        let body = build_payload(&state.catalog, game_id, notif)?;
        let transport = Arc::clone(&self.transport);

        self.runtime.spawn(async move {
            let _slot = slot;
            if let Err(e) = transport.post(&webhook, body, CONTENT_TYPE_JSON).await {
                error!("Discord: {e}");
            }
        });
        Ok(())
    }

    /// Number of posts currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}
