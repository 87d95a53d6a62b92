//! Browser session: explicit ownership of the CDP client and pages.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cdp::{CdpClient, CdpError, Page};
use crate::grounding::GroundingConfig;
use crate::tools::BrowserTools;

/// Browser connection settings.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// DevTools debugging port of the running browser.
    pub debug_port: u16,
    /// Budget for selector waits in the tool surface.
    pub wait_timeout_ms: u64,
    /// Default grounding options for `ground_and_screenshot`.
    pub grounding: GroundingConfig,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            wait_timeout_ms: 30_000,
            grounding: GroundingConfig::default(),
        }
    }
}

impl BrowserConfig {
    /// DevTools HTTP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }

    /// Selector wait budget as a duration.
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

/// An open connection to a browser.
///
/// Owns the CDP client; pages are opened and closed through it, so
/// there is no global browser or page state anywhere in the crate.
pub struct Browser {
    config: BrowserConfig,
    client: CdpClient,
}

impl Browser {
    /// Connect to the browser at the configured debug endpoint.
    ///
    /// The browser must already be running with remote debugging
    /// enabled; this crate does not manage the browser process.
    pub async fn connect(config: BrowserConfig) -> Result<Self, CdpError> {
        let client = CdpClient::connect(&config.endpoint()).await?;
        info!("Connected to browser at {}", config.endpoint());
        Ok(Self { config, client })
    }

    /// Open a new tab, optionally at a URL.
    pub async fn open_page(&self, url: Option<&str>) -> Result<Arc<Page>, CdpError> {
        let page = self.client.open_page(url).await?;
        Ok(Arc::new(page))
    }

    /// Attach to an already-open tab by target id.
    pub async fn attach(&self, target_id: &str) -> Result<Arc<Page>, CdpError> {
        let page = self.client.attach(target_id).await?;
        Ok(Arc::new(page))
    }

    /// Close a tab.
    pub async fn close_page(&self, page: &Page) -> Result<(), CdpError> {
        self.client.close_target(page.target_id()).await?;
        info!("Closed page {}", page.target_id());
        Ok(())
    }

    /// Build the tool surface for a page, using this browser's
    /// configured defaults.
    pub fn tools(&self, page: Arc<Page>) -> BrowserTools {
        BrowserTools::new(page, self.config.wait_timeout(), self.config.grounding.clone())
    }

    /// Access the underlying CDP client.
    pub fn client(&self) -> &CdpClient {
        &self.client
    }
}
