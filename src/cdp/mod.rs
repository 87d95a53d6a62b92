//! Chrome DevTools Protocol transport and page sessions.
//!
//! One WebSocket connection to the browser carries commands for every
//! attached page; responses are routed back to callers by request id.
//! Events are not subscribed to; waits are implemented by polling,
//! which keeps the transport a plain request/response channel.

mod client;
mod error;
mod page;
mod protocol;

pub use client::CdpClient;
pub use error::CdpError;
pub use page::Page;
pub use protocol::{BoxModel, BrowserVersion, DomNode, ScreenshotFormat, TargetSummary};
