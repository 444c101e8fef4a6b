//! Browser error types.

use thiserror::Error;

/// Errors that can occur during browser operations.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("no active tab")]
    NoActiveTab,

    #[error("no tab to close")]
    NoTabToClose,

    #[error("tab {0} not found")]
    TabNotFound(String),

    #[error("Either selector, text, or ref is required")]
    MissingLocator,

    #[error("text is required")]
    MissingText,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript evaluation failed: {0}")]
    JsEvalFailed(String),

    #[error("screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("engine error: {0}")]
    Engine(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
