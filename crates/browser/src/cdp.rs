//! CDP-backed engine over chromiumoxide.

use std::{path::Path, time::Duration};

use {
    async_trait::async_trait,
    chromiumoxide::{
        Browser, BrowserConfig, Page,
        cdp::browser_protocol::{
            input::{DispatchKeyEventParams, DispatchKeyEventType},
            page::CaptureScreenshotFormat,
        },
        handler::viewport::Viewport,
        page::ScreenshotParams,
    },
    futures::StreamExt,
    tracing::{debug, info, warn},
};

use crate::{
    engine::{Engine, EnginePage, EngineSession},
    error::BrowserError,
    types::{LaunchOptions, WaitUntil},
};

/// Timeout for individual CDP requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra settling time after navigation when network idle was requested.
const NETWORK_IDLE_GRACE: Duration = Duration::from_millis(500);

fn engine_err(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::Engine(e.to_string())
}

fn js_string(s: &str) -> Result<String, BrowserError> {
    serde_json::to_string(s).map_err(|e| BrowserError::JsEvalFailed(e.to_string()))
}

/// Launches Chromium over the Chrome DevTools Protocol.
#[derive(Debug, Default)]
pub struct CdpEngine;

impl CdpEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Engine for CdpEngine {
    async fn launch(
        &self,
        options: &LaunchOptions,
    ) -> Result<Box<dyn EngineSession>, BrowserError> {
        let mut builder = BrowserConfig::builder();

        // chromiumoxide runs headless by default; with_head() shows a window.
        if !options.headless {
            builder = builder.with_head();
        }

        builder = builder
            .viewport(Viewport {
                width: options.viewport_width,
                height: options.viewport_height,
                device_scale_factor: Some(1.0),
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            })
            .request_timeout(REQUEST_TIMEOUT)
            .arg(format!("--user-agent={}", options.user_agent))
            .arg(format!(
                "--window-size={},{}",
                options.viewport_width, options.viewport_height
            ));

        for arg in &options.args {
            builder = builder.arg(arg);
        }

        if let Some(ref proxy) = options.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy.server));
            info!(server = %proxy.server, "routing browser traffic through proxy");
            if proxy.username.is_some() {
                // Chromium takes only the server address on the command line;
                // credentials require a challenge handler the CDP launcher
                // does not install.
                warn!("proxy credentials are configured but not applied by the CDP launcher");
            }
        }

        let config = builder
            .build()
            .map_err(|e| BrowserError::LaunchFailed(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Drive browser events for the lifetime of the connection.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!(?event, "browser event");
            }
            debug!("browser event handler exited");
        });

        info!(
            headless = options.headless,
            viewport_width = options.viewport_width,
            viewport_height = options.viewport_height,
            "launched browser"
        );

        Ok(Box::new(CdpSession { browser }))
    }
}

struct CdpSession {
    browser: Browser,
}

#[async_trait]
impl EngineSession for CdpSession {
    async fn open_page(&mut self) -> Result<Box<dyn EnginePage>, BrowserError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(engine_err)?;
        Ok(Box::new(CdpPage { page }))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.browser.close().await.map_err(engine_err)?;
        Ok(())
    }
}

struct CdpPage {
    page: Page,
}

#[async_trait]
impl EnginePage for CdpPage {
    async fn goto(&self, url: &str, wait_until: WaitUntil) -> Result<(), BrowserError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        // CDP surfaces one navigation-complete signal; every readiness mode
        // maps onto it, with an extra settling window for network idle.
        let _ = self.page.wait_for_navigation().await;
        if wait_until == WaitUntil::NetworkIdle {
            tokio::time::sleep(NETWORK_IDLE_GRACE).await;
        }
        Ok(())
    }

    async fn url(&self) -> Result<String, BrowserError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(engine_err)?
            .unwrap_or_default())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(engine_err)?
            .unwrap_or_default())
    }

    async fn html(&self) -> Result<String, BrowserError> {
        self.page.content().await.map_err(engine_err)
    }

    async fn inner_text(&self) -> Result<String, BrowserError> {
        let value = self
            .evaluate("document.body ? document.body.innerText : ''")
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::JsEvalFailed(e.to_string()))?;
        // `undefined` has no JSON representation; surface it as null.
        Ok(result
            .into_value::<serde_json::Value>()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn screenshot(&self, full_page: bool, path: &Path) -> Result<Vec<u8>, BrowserError> {
        let bytes = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(full_page)
                    .build(),
            )
            .await
            .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))?;

        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))?;
        Ok(bytes)
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::ElementNotFound(format!("{selector}: {e}")))?;
        element.click().await.map_err(engine_err)?;
        Ok(())
    }

    async fn fill(&self, selector: Option<&str>, text: &str) -> Result<(), BrowserError> {
        let target = selector.unwrap_or(":focus");

        // Reset any existing value so fill replaces rather than appends.
        let clear = format!(
            "(() => {{ const el = document.querySelector({}); if (el && 'value' in el) el.value = ''; }})()",
            js_string(target)?
        );
        self.evaluate(&clear).await?;

        let element = self
            .page
            .find_element(target)
            .await
            .map_err(|e| BrowserError::ElementNotFound(format!("{target}: {e}")))?;
        element.click().await.map_err(engine_err)?;
        element.type_str(text).await.map_err(engine_err)?;
        Ok(())
    }

    async fn press(&self, selector: Option<&str>, key: &str) -> Result<(), BrowserError> {
        if let Some(selector) = selector {
            let focus = format!(
                "(() => {{ const el = document.querySelector({}); if (el) el.focus(); }})()",
                js_string(selector)?
            );
            self.evaluate(&focus).await?;
        }

        // Key events are dispatched page-level and land on the focused element.
        let text = if key == "Enter" { "\r" } else { key };
        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let event = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key(key.to_string())
                .text(text.to_string())
                .build()
                .map_err(engine_err)?;
            self.page.execute(event).await.map_err(engine_err)?;
        }
        Ok(())
    }

    async fn bring_to_front(&self) -> Result<(), BrowserError> {
        self.page.bring_to_front().await.map_err(engine_err)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.page.clone().close().await.map_err(engine_err)?;
        Ok(())
    }
}
