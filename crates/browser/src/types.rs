//! Session, tab, and request/response structures.

use serde::{Deserialize, Serialize};

/// User agent presented by launched browsers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Page readiness to wait for after navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    Load,
    #[default]
    DomContentLoaded,
    NetworkIdle,
}

/// Upstream proxy applied to the browsing context.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub server: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Read `PROXY_SERVER` / `PROXY_USERNAME` / `PROXY_PASSWORD` from the
    /// environment. Returns `None` when no server is configured.
    pub fn from_env() -> Option<Self> {
        let server = std::env::var("PROXY_SERVER").ok().filter(|s| !s.is_empty())?;
        Some(Self {
            server,
            username: std::env::var("PROXY_USERNAME").ok(),
            password: std::env::var("PROXY_PASSWORD").ok(),
        })
    }
}

/// Fixed configuration handed to the engine when a session launches.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
    pub headless: bool,
    /// Additional engine arguments.
    pub args: Vec<String>,
    pub proxy: Option<ProxyConfig>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headless: true,
            args: vec![
                "--no-sandbox".into(),
                "--disable-setuid-sandbox".into(),
                "--disable-dev-shm-usage".into(),
                "--disable-gpu".into(),
            ],
            proxy: None,
        }
    }
}

/// Locator for a click. Exactly one of the fields must be set; `ref` resolves
/// the same way as `selector`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClickOptions {
    pub selector: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "ref")]
    pub ref_: Option<String>,
}

/// Target and payload for typing. With neither `selector` nor `ref` the
/// currently focused element receives the text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeOptions {
    pub selector: Option<String>,
    #[serde(rename = "ref")]
    pub ref_: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub submit: bool,
}

/// What to wait for: a selector, visible text, or a plain timeout. Selector
/// takes precedence over text, text over the timeout sleep.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaitOptions {
    pub selector: Option<String>,
    pub text: Option<String>,
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotOptions {
    #[serde(default)]
    pub full_page: bool,
    pub path: Option<String>,
}

/// Resulting location after a completed navigation.
#[derive(Debug, Clone, Serialize)]
pub struct NavigateResult {
    pub url: String,
    pub title: String,
}

/// Metadata for one open tab.
#[derive(Debug, Clone, Serialize)]
pub struct TabInfo {
    pub id: String,
    pub url: String,
    pub title: String,
    pub active: bool,
}

/// Session introspection snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub start_time: String,
    pub current_url: String,
    pub tabs: usize,
    pub history: Vec<String>,
}

/// Full page markup plus visible text.
#[derive(Debug, Clone, Serialize)]
pub struct PageContent {
    pub html: String,
    pub text: String,
    pub url: String,
    pub title: String,
}

/// One node in the element-structure snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageNode {
    pub tag: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<PageNode>,
}

/// Depth-bounded element structure of the current page.
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub elements: Vec<PageNode>,
}
