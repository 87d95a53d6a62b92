//! Visual element grounding for LLM browser agents.
//!
//! Connects to a running Chrome via the DevTools Protocol (CDP) and
//! turns a live page into an indexed inventory of interactable and
//! text-bearing elements, correlated with a screenshot in which each
//! element is boxed and labeled with its index. An agent can then say
//! "click element 4" instead of guessing at selectors.
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │  Rust backend   │ ◄──────────────► │   Chrome/Edge    │
//! │  (this crate)   │       CDP        │                  │
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! ## Setup
//!
//! Start Chrome with remote debugging enabled:
//!
//! ```bash
//! google-chrome --remote-debugging-port=9222
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pageground::{Browser, BrowserConfig};
//!
//! let browser = Browser::connect(BrowserConfig::default()).await?;
//! let page = browser.open_page(Some("https://example.com")).await?;
//! let tools = browser.tools(page.clone());
//!
//! let reply = tools.ground_and_screenshot().await;
//! // reply.data: { "screenshot": <base64 png>, "elements": [...] }
//!
//! tools.click("#submit").await;
//! browser.close_page(&page).await?;
//! ```
//!
//! ## Tool surface
//!
//! - `navigate` - Go to a URL (bare hostnames get `https://`)
//! - `type_into` - Type text into an element
//! - `click` - Click an element
//! - `press_key` / `press_enter` - Keyboard input
//! - `scroll` - Scroll by a pixel delta
//! - `read_dom` - Full serialized HTML
//! - `ground_and_screenshot` - Indexed elements + labeled screenshot
//!
//! Every tool returns a uniform `{status, message?, data?}` reply and
//! never raises; the grounding flow guarantees its overlay is removed
//! before the call returns, on success and on failure alike.

mod browser;
pub mod cdp;
pub mod grounding;
pub mod tools;

pub use browser::{Browser, BrowserConfig};
pub use cdp::{CdpClient, CdpError, Page};
pub use grounding::{
    BoundingBox, ElementAttributes, ElementRecord, GroundablePage, GroundingConfig,
    GroundingError, GroundingResult, GroundingSession, UNBOUNDED_VIEWPORT,
};
pub use tools::{BrowserTools, ToolError, ToolReply, ToolStatus};
