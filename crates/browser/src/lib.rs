//! One remote-controllable browser session: a registry of tabs, an active-tab
//! pointer, and an append-only navigation history, all funneled through
//! [`SessionController`].
//!
//! The actual browser automation lives behind the [`engine`] traits: the
//! production implementation talks to Chromium over CDP ([`cdp`]), and an
//! in-memory recording implementation backs the tests ([`noop`]).
//!
//! # Example
//!
//! ```ignore
//! use veer_browser::{cdp::CdpEngine, LaunchOptions, SessionController, WaitUntil};
//!
//! let mut controller = SessionController::new(Box::new(CdpEngine::new()), LaunchOptions::default());
//! let page = controller.navigate("https://example.com", WaitUntil::default()).await?;
//! println!("{} — {}", page.url, page.title);
//! ```

pub mod cdp;
pub mod engine;
pub mod error;
pub mod noop;
pub mod session;
pub mod snapshot;
pub mod types;

pub use {
    engine::{Engine, EnginePage, EngineSession},
    error::BrowserError,
    session::SessionController,
    types::{LaunchOptions, ProxyConfig, WaitUntil},
};
