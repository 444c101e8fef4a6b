//! The engine boundary.
//!
//! Rendering, DOM access, and input simulation belong to an external
//! automation engine; the session controller only ever talks to these traits.
//! [`crate::cdp`] drives a real Chromium over CDP, [`crate::noop`] records
//! operations in memory for tests.

use std::path::Path;

use async_trait::async_trait;

use crate::{
    error::BrowserError,
    types::{LaunchOptions, WaitUntil},
};

/// Launches engine sessions.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn launch(&self, options: &LaunchOptions)
        -> Result<Box<dyn EngineSession>, BrowserError>;
}

/// One live browsing context owning a set of pages.
#[async_trait]
pub trait EngineSession: Send + Sync {
    /// Open a new blank page.
    async fn open_page(&mut self) -> Result<Box<dyn EnginePage>, BrowserError>;

    /// Tear down the underlying browser.
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// A single page the controller can drive.
#[async_trait]
pub trait EnginePage: Send + Sync {
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> Result<(), BrowserError>;

    async fn url(&self) -> Result<String, BrowserError>;

    async fn title(&self) -> Result<String, BrowserError>;

    /// Full page markup.
    async fn html(&self) -> Result<String, BrowserError>;

    /// Visible text of the document body.
    async fn inner_text(&self) -> Result<String, BrowserError>;

    /// Run a script in page context, returning its result as opaque JSON.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    /// Capture the page as PNG, writing the file to `path` and returning the
    /// raw bytes.
    async fn screenshot(&self, full_page: bool, path: &Path) -> Result<Vec<u8>, BrowserError>;

    async fn click(&self, selector: &str) -> Result<(), BrowserError>;

    /// Fill an element with text. A `selector` of `None` targets the
    /// currently focused element.
    async fn fill(&self, selector: Option<&str>, text: &str) -> Result<(), BrowserError>;

    /// Send a key press. A `selector` of `None` targets the currently focused
    /// element.
    async fn press(&self, selector: Option<&str>, key: &str) -> Result<(), BrowserError>;

    async fn bring_to_front(&self) -> Result<(), BrowserError>;

    async fn close(&mut self) -> Result<(), BrowserError>;
}
