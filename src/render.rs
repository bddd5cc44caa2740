use std::time::Duration;

use crate::Error;

pub const DEFAULT_BASE_URL: &str = "https://chrome.browserless.io";

/// Deadline passed to the rendering service, and to our own request.
const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the headless-browser content API.
///
/// One GET per scrape: the service loads the page, waits for network
/// idle, and returns the rendered HTML.
#[derive(Debug, Clone)]
pub struct RenderClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RenderClient {
    /// Fails if the underlying HTTP client cannot be built with its
    /// timeout attached.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(RENDER_TIMEOUT).build()?;
        Ok(RenderClient {
            client,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    /// Fetch the fully rendered HTML for `url`.
    ///
    /// A non-success upstream status becomes [`Error::Upstream`] so the
    /// handler can forward it verbatim.
    pub async fn fetch_rendered(&self, url: &str) -> Result<String, Error> {
        let endpoint = format!("{}/content", self.base_url);
        tracing::debug!(url, "fetching rendered page");

        let response = self
            .client
            .get(&endpoint)
            .query(&[
                ("token", self.token.as_str()),
                ("url", url),
                ("gotoWaitUntil", "networkidle0"),
                ("timeout", "30000"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "rendering service error");
            return Err(Error::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}
