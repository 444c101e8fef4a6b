//! Session controller: the single authoritative owner of browser-session
//! state. Owns the engine session, the tab registry, the active-tab pointer,
//! and the navigation history; every browser interaction funnels through it.

use std::{
    collections::HashMap,
    path::PathBuf,
    time::{Duration, Instant},
};

use {
    base64::{Engine as _, engine::general_purpose::STANDARD as BASE64},
    chrono::{DateTime, Utc},
    tracing::{debug, info},
    uuid::Uuid,
};

use crate::{
    engine::{Engine, EnginePage, EngineSession},
    error::BrowserError,
    snapshot,
    types::{
        ClickOptions, LaunchOptions, NavigateResult, PageContent, PageSnapshot, ProxyConfig,
        ScreenshotOptions, SessionInfo, TabInfo, TypeOptions, WaitOptions, WaitUntil,
    },
};

/// Default timeout for selector/text waits.
const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default sleep when waiting without a selector or text.
const DEFAULT_SLEEP_MS: u64 = 1_000;

/// Poll interval for selector/text waits.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// JavaScript to click the first element whose text contains the needle.
/// Deepest matching elements win so a wrapping `<div>` never swallows the
/// click meant for a button inside it.
const CLICK_BY_TEXT_JS: &str = r#"
((needle) => {
    const matches = [];
    for (const el of document.querySelectorAll('body *')) {
        const tag = el.tagName.toLowerCase();
        if (tag === 'script' || tag === 'style' || tag === 'noscript') continue;
        if (!(el.textContent || '').includes(needle)) continue;
        let deepest = true;
        for (const child of el.children) {
            if ((child.textContent || '').includes(needle)) { deepest = false; break; }
        }
        if (deepest) matches.push(el);
    }
    if (matches.length === 0) return false;
    matches[0].click();
    return true;
})
"#;

/// One open page with its cached metadata. The engine page handle is owned
/// exclusively by the tab.
struct Tab {
    id: String,
    page: Box<dyn EnginePage>,
    url: String,
    title: String,
}

/// Owns one browser session end to end.
///
/// The session identifier and start time are fixed at construction; the
/// underlying engine session is created lazily and may be closed and
/// re-created without changing either.
pub struct SessionController {
    engine: Box<dyn Engine>,
    options: LaunchOptions,
    session: Option<Box<dyn EngineSession>>,
    tabs: HashMap<String, Tab>,
    active_tab: Option<String>,
    session_id: String,
    started_at: DateTime<Utc>,
    history: Vec<String>,
    ready: bool,
}

impl SessionController {
    pub fn new(engine: Box<dyn Engine>, options: LaunchOptions) -> Self {
        Self {
            engine,
            options,
            session: None,
            tabs: HashMap::new(),
            active_tab: None,
            session_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            history: Vec::new(),
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Launch the engine session if none is live. Idempotent.
    pub async fn initialize(&mut self) -> Result<(), BrowserError> {
        if self.session.is_some() {
            return Ok(());
        }

        let mut options = self.options.clone();
        if options.proxy.is_none() {
            options.proxy = ProxyConfig::from_env();
        }

        let mut session = self.engine.launch(&options).await?;

        let page = session.open_page().await?;
        let tab_id = Uuid::new_v4().to_string();
        self.tabs.insert(
            tab_id.clone(),
            Tab {
                id: tab_id.clone(),
                page,
                url: "about:blank".to_string(),
                title: "New Tab".to_string(),
            },
        );
        self.active_tab = Some(tab_id);
        self.session = Some(session);
        self.ready = true;

        info!(session_id = %self.session_id, "browser session initialized");
        Ok(())
    }

    /// Drive the active tab to `url` and record the resulting location in the
    /// session history.
    pub async fn navigate(
        &mut self,
        url: &str,
        wait_until: WaitUntil,
    ) -> Result<NavigateResult, BrowserError> {
        validate_url(url)?;
        self.ensure_initialized().await?;

        let tab_id = self.active_tab.clone().ok_or(BrowserError::NoActiveTab)?;
        let tab = self.tabs.get(&tab_id).ok_or(BrowserError::NoActiveTab)?;

        tab.page.goto(url, wait_until).await?;
        let current_url = tab.page.url().await?;
        let title = tab.page.title().await?;

        self.history.push(current_url.clone());
        if let Some(tab) = self.tabs.get_mut(&tab_id) {
            tab.url = current_url.clone();
            tab.title = title.clone();
        }

        info!(url = %current_url, "navigated");
        Ok(NavigateResult {
            url: current_url,
            title,
        })
    }

    /// Capture the active tab as PNG, writing the file to the requested path
    /// (or a generated temp path) and returning it base64-encoded.
    pub async fn screenshot(
        &mut self,
        options: ScreenshotOptions,
    ) -> Result<String, BrowserError> {
        self.ensure_initialized().await?;
        let page = self.active_page()?;

        let path = options
            .path
            .map(PathBuf::from)
            .unwrap_or_else(default_screenshot_path);
        let bytes = page.screenshot(options.full_page, &path).await?;

        debug!(path = %path.display(), bytes = bytes.len(), "captured screenshot");
        Ok(BASE64.encode(bytes))
    }

    /// Depth-bounded element structure of the active tab.
    pub async fn snapshot(&mut self) -> Result<PageSnapshot, BrowserError> {
        self.ensure_initialized().await?;
        let page = self.active_page()?;

        let url = page.url().await?;
        let title = page.title().await?;
        let value = page.evaluate(snapshot::EXTRACT_TREE_JS).await?;

        Ok(PageSnapshot {
            url,
            title,
            elements: snapshot::parse_nodes(&value),
        })
    }

    /// Click an element located by selector, visible text, or ref.
    pub async fn click(&mut self, options: ClickOptions) -> Result<(), BrowserError> {
        if options.selector.is_none() && options.text.is_none() && options.ref_.is_none() {
            return Err(BrowserError::MissingLocator);
        }
        self.ensure_initialized().await?;
        let page = self.active_page()?;

        match (
            options.selector.as_deref(),
            options.text.as_deref(),
            options.ref_.as_deref(),
        ) {
            (Some(selector), _, _) | (None, None, Some(selector)) => page.click(selector).await,
            (None, Some(text), _) => click_by_text(page, text).await,
            (None, None, None) => Err(BrowserError::MissingLocator),
        }
    }

    /// Fill the target element (selector, ref, or the focused element) and
    /// optionally submit with an Enter keypress.
    pub async fn type_text(&mut self, options: TypeOptions) -> Result<(), BrowserError> {
        let text = options.text.ok_or(BrowserError::MissingText)?;
        self.ensure_initialized().await?;

        let selector = options.selector.or(options.ref_);
        let page = self.active_page()?;

        page.fill(selector.as_deref(), &text).await?;
        if options.submit {
            page.press(selector.as_deref(), "Enter").await?;
        }
        Ok(())
    }

    /// Full markup, visible text, URL, and title of the active tab.
    pub async fn content(&mut self) -> Result<PageContent, BrowserError> {
        self.ensure_initialized().await?;
        let page = self.active_page()?;

        Ok(PageContent {
            html: page.html().await?,
            text: page.inner_text().await?,
            url: page.url().await?,
            title: page.title().await?,
        })
    }

    /// Run a script in the active tab, returning its result as opaque JSON.
    pub async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, BrowserError> {
        self.ensure_initialized().await?;
        self.active_page()?.evaluate(script).await
    }

    /// Wait for a selector or text to appear, or sleep for the given timeout
    /// when neither is supplied.
    pub async fn wait(&mut self, options: WaitOptions) -> Result<(), BrowserError> {
        self.ensure_initialized().await?;
        let page = self.active_page()?;

        let timeout_ms = options.timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT_MS);
        if let Some(selector) = options.selector.as_deref() {
            let check = format!(
                "document.querySelector({}) !== null",
                js_string(selector)?
            );
            poll_until(page, &check, timeout_ms).await
        } else if let Some(text) = options.text.as_deref() {
            let check = format!(
                "(document.body ? document.body.innerText : '').includes({})",
                js_string(text)?
            );
            poll_until(page, &check, timeout_ms).await
        } else {
            let ms = options.timeout.unwrap_or(DEFAULT_SLEEP_MS);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(())
        }
    }

    /// Metadata for every open tab, refreshing each tab's cached URL/title.
    pub async fn tabs(&mut self) -> Result<Vec<TabInfo>, BrowserError> {
        self.ensure_initialized().await?;

        let ids: Vec<String> = self.tabs.keys().cloned().collect();
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            self.refresh_tab(&id).await?;
            if let Some(tab) = self.tabs.get(&id) {
                out.push(TabInfo {
                    id: tab.id.clone(),
                    url: tab.url.clone(),
                    title: tab.title.clone(),
                    active: self.active_tab.as_deref() == Some(tab.id.as_str()),
                });
            }
        }
        Ok(out)
    }

    /// Open a new tab, optionally navigating it, and make it the active tab.
    pub async fn new_tab(&mut self, url: Option<&str>) -> Result<String, BrowserError> {
        if let Some(url) = url {
            validate_url(url)?;
        }
        self.ensure_initialized().await?;

        let session = self
            .session
            .as_mut()
            .ok_or_else(|| BrowserError::Engine("browser session not initialized".into()))?;
        let page = session.open_page().await?;

        let tab_id = Uuid::new_v4().to_string();
        self.tabs.insert(
            tab_id.clone(),
            Tab {
                id: tab_id.clone(),
                page,
                url: url.unwrap_or("about:blank").to_string(),
                title: "New Tab".to_string(),
            },
        );

        if let Some(url) = url {
            if let Some(tab) = self.tabs.get(&tab_id) {
                tab.page.goto(url, WaitUntil::default()).await?;
            }
            self.refresh_tab(&tab_id).await?;
        }

        self.active_tab = Some(tab_id.clone());
        info!(tab_id = %tab_id, "opened new tab");
        Ok(tab_id)
    }

    /// Close the given tab, or the active tab when none is specified. Closing
    /// the active tab reassigns the pointer to any remaining tab.
    pub async fn close_tab(&mut self, tab_id: Option<&str>) -> Result<(), BrowserError> {
        self.ensure_initialized().await?;

        let target = tab_id
            .map(String::from)
            .or_else(|| self.active_tab.clone())
            .ok_or(BrowserError::NoTabToClose)?;

        if let Some(mut tab) = self.tabs.remove(&target) {
            tab.page.close().await?;
            if self.active_tab.as_deref() == Some(target.as_str()) {
                self.active_tab = self.tabs.keys().next().cloned();
            }
            info!(tab_id = %target, "closed tab");
        }
        Ok(())
    }

    /// Make the given tab active and bring it to the foreground.
    pub async fn select_tab(&mut self, tab_id: &str) -> Result<(), BrowserError> {
        self.ensure_initialized().await?;

        let tab = self
            .tabs
            .get(tab_id)
            .ok_or_else(|| BrowserError::TabNotFound(tab_id.to_string()))?;
        tab.page.bring_to_front().await?;
        self.active_tab = Some(tab_id.to_string());
        Ok(())
    }

    /// Session id, start time, active tab URL, tab count, and full history.
    pub async fn session_info(&mut self) -> Result<SessionInfo, BrowserError> {
        self.ensure_initialized().await?;

        let current_url = self
            .active_tab
            .as_ref()
            .and_then(|id| self.tabs.get(id))
            .map(|tab| tab.url.clone())
            .unwrap_or_default();

        Ok(SessionInfo {
            id: self.session_id.clone(),
            start_time: self.started_at.to_rfc3339(),
            current_url,
            tabs: self.tabs.len(),
            history: self.history.clone(),
        })
    }

    /// Tear down the engine session and clear all tab state. Idempotent; a
    /// later operation re-initializes under the same session identity.
    pub async fn close(&mut self) -> Result<(), BrowserError> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        self.tabs.clear();
        self.active_tab = None;
        self.ready = false;

        session.close().await?;
        info!("browser session closed");
        Ok(())
    }

    async fn ensure_initialized(&mut self) -> Result<(), BrowserError> {
        if self.session.is_none() {
            self.initialize().await?;
        }
        Ok(())
    }

    fn active_page(&self) -> Result<&dyn EnginePage, BrowserError> {
        let id = self.active_tab.as_ref().ok_or(BrowserError::NoActiveTab)?;
        Ok(self
            .tabs
            .get(id)
            .ok_or(BrowserError::NoActiveTab)?
            .page
            .as_ref())
    }

    async fn refresh_tab(&mut self, id: &str) -> Result<(), BrowserError> {
        let (url, title) = match self.tabs.get(id) {
            Some(tab) => (tab.page.url().await?, tab.page.title().await?),
            None => return Ok(()),
        };
        if let Some(tab) = self.tabs.get_mut(id) {
            tab.url = url;
            tab.title = title;
        }
        Ok(())
    }
}

async fn click_by_text(page: &dyn EnginePage, text: &str) -> Result<(), BrowserError> {
    let script = format!("({CLICK_BY_TEXT_JS})({})", js_string(text)?);
    let clicked = page.evaluate(&script).await?;
    if clicked.as_bool() == Some(true) {
        Ok(())
    } else {
        Err(BrowserError::ElementNotFound(format!("text: {text}")))
    }
}

async fn poll_until(
    page: &dyn EnginePage,
    check_js: &str,
    timeout_ms: u64,
) -> Result<(), BrowserError> {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    while Instant::now() < deadline {
        let found = page.evaluate(check_js).await?.as_bool().unwrap_or(false);
        if found {
            return Ok(());
        }
        tokio::time::sleep(WAIT_POLL_INTERVAL).await;
    }
    Err(BrowserError::Timeout(format!(
        "condition not met after {timeout_ms}ms"
    )))
}

fn js_string(s: &str) -> Result<String, BrowserError> {
    serde_json::to_string(s).map_err(|e| BrowserError::JsEvalFailed(e.to_string()))
}

fn default_screenshot_path() -> PathBuf {
    std::env::temp_dir().join(format!("screenshot-{}.png", Utc::now().timestamp_millis()))
}

/// Validate a URL before handing it to the engine: non-empty, parseable, and
/// an http/https (or about:) scheme.
fn validate_url(url: &str) -> Result<(), BrowserError> {
    if url.is_empty() {
        return Err(BrowserError::InvalidUrl("URL cannot be empty".into()));
    }

    let parsed = url::Url::parse(url).map_err(|e| BrowserError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" | "about" => Ok(()),
        scheme => Err(BrowserError::InvalidUrl(format!(
            "unsupported scheme '{scheme}', only http/https allowed"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::noop::{NoopEngine, NoopEvent};

    fn controller_with_events() -> (SessionController, crate::noop::EventLog) {
        let engine = NoopEngine::new();
        let events = engine.events();
        let controller = SessionController::new(Box::new(engine), LaunchOptions::default());
        (controller, events)
    }

    #[tokio::test]
    async fn initialize_twice_is_noop() {
        let (mut controller, events) = controller_with_events();

        controller.initialize().await.unwrap();
        let id = controller.session_id().to_string();
        let started = controller.started_at();

        controller.initialize().await.unwrap();
        assert_eq!(controller.session_id(), id);
        assert_eq!(controller.started_at(), started);

        let launches = events
            .lock()
            .await
            .iter()
            .filter(|e| **e == NoopEvent::Launched)
            .count();
        assert_eq!(launches, 1);
    }

    #[tokio::test]
    async fn reinitialize_after_close_keeps_session_identity() {
        let (mut controller, events) = controller_with_events();

        controller.initialize().await.unwrap();
        let id = controller.session_id().to_string();
        let started = controller.started_at();

        controller.close().await.unwrap();
        assert!(!controller.is_ready());

        controller.initialize().await.unwrap();
        assert!(controller.is_ready());
        assert_eq!(controller.session_id(), id);
        assert_eq!(controller.started_at(), started);

        let launches = events
            .lock()
            .await
            .iter()
            .filter(|e| **e == NoopEvent::Launched)
            .count();
        assert_eq!(launches, 2);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (mut controller, _events) = controller_with_events();
        controller.initialize().await.unwrap();
        controller.close().await.unwrap();
        controller.close().await.unwrap();
        assert!(!controller.is_ready());
    }

    #[tokio::test]
    async fn new_tab_becomes_active() {
        let (mut controller, _events) = controller_with_events();
        controller.initialize().await.unwrap();

        let tab_id = controller.new_tab(None).await.unwrap();
        let tabs = controller.tabs().await.unwrap();

        assert_eq!(tabs.len(), 2);
        let active: Vec<_> = tabs.iter().filter(|t| t.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, tab_id);
    }

    #[tokio::test]
    async fn closing_active_tab_reassigns_pointer() {
        let (mut controller, _events) = controller_with_events();
        controller.initialize().await.unwrap();

        let second = controller.new_tab(None).await.unwrap();
        controller.close_tab(None).await.unwrap();

        let tabs = controller.tabs().await.unwrap();
        assert_eq!(tabs.len(), 1);
        assert!(tabs[0].active);
        assert_ne!(tabs[0].id, second);
    }

    #[tokio::test]
    async fn closing_last_tab_clears_pointer_then_none_to_close() {
        let (mut controller, _events) = controller_with_events();
        controller.initialize().await.unwrap();

        controller.close_tab(None).await.unwrap();

        let err = controller.close_tab(None).await.unwrap_err();
        assert!(matches!(err, BrowserError::NoTabToClose));
    }

    #[tokio::test]
    async fn closing_inactive_tab_keeps_active_pointer() {
        let (mut controller, _events) = controller_with_events();
        controller.initialize().await.unwrap();

        let second = controller.new_tab(None).await.unwrap();
        let first = controller
            .tabs()
            .await
            .unwrap()
            .into_iter()
            .find(|t| !t.active)
            .unwrap();

        controller.close_tab(Some(&first.id)).await.unwrap();

        let tabs = controller.tabs().await.unwrap();
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].id, second);
        assert!(tabs[0].active);
    }

    #[tokio::test]
    async fn navigate_appends_history_in_order() {
        let (mut controller, _events) = controller_with_events();

        let first = controller
            .navigate("https://example.com", WaitUntil::default())
            .await
            .unwrap();
        assert_eq!(first.url, "https://example.com");

        controller
            .navigate("https://example.org", WaitUntil::NetworkIdle)
            .await
            .unwrap();

        let info = controller.session_info().await.unwrap();
        assert_eq!(
            info.history,
            vec!["https://example.com", "https://example.org"]
        );
        assert_eq!(info.current_url, "https://example.org");
        assert_eq!(info.tabs, 1);
    }

    #[tokio::test]
    async fn navigate_rejects_invalid_url_without_engine_call() {
        let (mut controller, events) = controller_with_events();

        let err = controller
            .navigate("ftp://example.com", WaitUntil::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::InvalidUrl(_)));
        assert!(events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn click_without_locator_fails_without_engine_call() {
        let (mut controller, events) = controller_with_events();

        let err = controller.click(ClickOptions::default()).await.unwrap_err();
        assert!(matches!(err, BrowserError::MissingLocator));
        assert_eq!(
            err.to_string(),
            "Either selector, text, or ref is required"
        );
        assert!(events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn click_resolves_selector_and_ref_identically() {
        let (mut controller, events) = controller_with_events();

        controller
            .click(ClickOptions {
                selector: Some("#submit".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        controller
            .click(ClickOptions {
                ref_: Some("#other".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let events = events.lock().await;
        assert!(events.contains(&NoopEvent::Click("#submit".into())));
        assert!(events.contains(&NoopEvent::Click("#other".into())));
    }

    #[tokio::test]
    async fn type_with_submit_fills_then_presses_enter() {
        let (mut controller, events) = controller_with_events();

        controller
            .type_text(TypeOptions {
                selector: Some("#search".into()),
                text: Some("rust".into()),
                submit: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let events = events.lock().await;
        let fill_idx = events
            .iter()
            .position(|e| matches!(e, NoopEvent::Fill { .. }))
            .unwrap();
        assert_eq!(
            events[fill_idx],
            NoopEvent::Fill {
                selector: Some("#search".into()),
                text: "rust".into(),
            }
        );
        assert_eq!(
            events[fill_idx + 1],
            NoopEvent::Press {
                selector: Some("#search".into()),
                key: "Enter".into(),
            }
        );
    }

    #[tokio::test]
    async fn type_without_target_fills_focused_element() {
        let (mut controller, events) = controller_with_events();

        controller
            .type_text(TypeOptions {
                text: Some("hello".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let events = events.lock().await;
        assert!(events.contains(&NoopEvent::Fill {
            selector: None,
            text: "hello".into(),
        }));
        assert!(!events.iter().any(|e| matches!(e, NoopEvent::Press { .. })));
    }

    #[tokio::test]
    async fn type_requires_text() {
        let (mut controller, _events) = controller_with_events();
        let err = controller
            .type_text(TypeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::MissingText));
    }

    #[tokio::test]
    async fn select_unknown_tab_leaves_active_unchanged() {
        let (mut controller, _events) = controller_with_events();
        controller.initialize().await.unwrap();

        let before: Vec<_> = controller
            .tabs()
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.active)
            .collect();

        let err = controller.select_tab("missing").await.unwrap_err();
        assert!(matches!(err, BrowserError::TabNotFound(_)));
        assert!(err.to_string().contains("not found"));

        let after: Vec<_> = controller
            .tabs()
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.active)
            .collect();
        assert_eq!(before[0].id, after[0].id);
    }

    #[tokio::test]
    async fn select_tab_brings_page_to_front() {
        let (mut controller, events) = controller_with_events();
        controller.initialize().await.unwrap();

        let second = controller.new_tab(None).await.unwrap();
        let first = controller
            .tabs()
            .await
            .unwrap()
            .into_iter()
            .find(|t| t.id != second)
            .unwrap();

        controller.select_tab(&first.id).await.unwrap();
        assert!(events.lock().await.contains(&NoopEvent::BringToFront));

        let tabs = controller.tabs().await.unwrap();
        let active = tabs.iter().find(|t| t.active).unwrap();
        assert_eq!(active.id, first.id);
    }

    #[tokio::test]
    async fn screenshot_writes_file_and_returns_base64() {
        let (mut controller, events) = controller_with_events();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");

        let encoded = controller
            .screenshot(ScreenshotOptions {
                full_page: true,
                path: Some(path.display().to_string()),
            })
            .await
            .unwrap();

        assert!(path.exists());
        assert!(!encoded.is_empty());
        assert!(events
            .lock()
            .await
            .contains(&NoopEvent::Screenshot { full_page: true }));
    }

    #[tokio::test]
    async fn wait_without_condition_sleeps() {
        let (mut controller, _events) = controller_with_events();
        controller
            .wait(WaitOptions {
                timeout: Some(10),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn wait_for_selector_polls_until_found() {
        let engine = NoopEngine::new();
        engine.set_eval_result(json!(true)).await;
        let events = engine.events();
        let mut controller = SessionController::new(Box::new(engine), LaunchOptions::default());

        controller
            .wait(WaitOptions {
                selector: Some("#done".into()),
                timeout: Some(500),
                ..Default::default()
            })
            .await
            .unwrap();

        let events = events.lock().await;
        assert!(events
            .iter()
            .any(|e| matches!(e, NoopEvent::Evaluate(s) if s.contains("#done"))));
    }

    #[tokio::test]
    async fn evaluate_passes_result_through() {
        let engine = NoopEngine::new();
        engine.set_eval_result(json!({"answer": 42})).await;
        let mut controller = SessionController::new(Box::new(engine), LaunchOptions::default());

        let value = controller.evaluate("({answer: 42})").await.unwrap();
        assert_eq!(value, json!({"answer": 42}));
    }

    #[tokio::test]
    async fn snapshot_parses_element_tree() {
        let engine = NoopEngine::new();
        engine
            .set_eval_result(json!([
                { "tag": "div", "text": "hello", "children": [] }
            ]))
            .await;
        let mut controller = SessionController::new(Box::new(engine), LaunchOptions::default());

        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.url, "about:blank");
        assert_eq!(snapshot.elements.len(), 1);
        assert_eq!(snapshot.elements[0].tag, "div");
    }

    #[tokio::test]
    async fn session_info_reflects_fresh_session() {
        let (mut controller, _events) = controller_with_events();

        let info = controller.session_info().await.unwrap();
        assert_eq!(info.id, controller.session_id());
        assert_eq!(info.current_url, "about:blank");
        assert_eq!(info.tabs, 1);
        assert!(info.history.is_empty());
    }

    #[test]
    fn validate_url_accepts_http_https_about() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://localhost:8080/path").is_ok());
        assert!(validate_url("about:blank").is_ok());
    }

    #[test]
    fn validate_url_rejects_bad_input() {
        assert!(validate_url("").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("javascript:alert(1)").is_err());
    }
}
