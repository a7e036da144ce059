use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::Error;

const USER_AGENT: &str = "DCNet-DiscordWebhook";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Delivers a request body to a URL. Implementations succeed only on a 2xx response.
pub trait WebhookTransport: Send + Sync + 'static {
    fn post(
        &self,
        url: &str,
        body: String,
        content_type: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns an error if the TLS backend can't be initialized.
    pub fn new(timeout_secs: u64) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl WebhookTransport for HttpClient {
    async fn post(&self, url: &str, body: String, content_type: &str) -> Result<(), Error> {
        let mut request = self.client.post(url).body(body);
        if !content_type.is_empty() {
            request = request.header(CONTENT_TYPE, content_type);
        }

        let status = request.send().await?.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}
