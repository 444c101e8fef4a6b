//! Recording in-memory engine.
//!
//! Stands in for the real engine in tests: every page operation is appended
//! to a shared event log and queries return canned values. Keep a clone of
//! [`NoopEngine::events`] before handing the engine to the controller.

use std::{path::Path, sync::Arc};

use {async_trait::async_trait, serde_json::Value, tokio::sync::Mutex};

use crate::{
    engine::{Engine, EnginePage, EngineSession},
    error::BrowserError,
    types::{LaunchOptions, WaitUntil},
};

/// A recorded engine operation.
#[derive(Debug, Clone, PartialEq)]
pub enum NoopEvent {
    Launched,
    PageOpened,
    SessionClosed,
    Goto(String),
    Click(String),
    Fill {
        selector: Option<String>,
        text: String,
    },
    Press {
        selector: Option<String>,
        key: String,
    },
    Evaluate(String),
    Screenshot {
        full_page: bool,
    },
    BringToFront,
    PageClosed,
}

/// Shared event log, cloned into every session and page the engine creates.
pub type EventLog = Arc<Mutex<Vec<NoopEvent>>>;

/// Engine that records operations instead of driving a browser.
#[derive(Default)]
pub struct NoopEngine {
    events: EventLog,
    eval_result: Arc<Mutex<Value>>,
}

impl NoopEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the shared event log.
    pub fn events(&self) -> EventLog {
        Arc::clone(&self.events)
    }

    /// Set the value every subsequent `evaluate` call returns.
    pub async fn set_eval_result(&self, value: Value) {
        *self.eval_result.lock().await = value;
    }
}

#[async_trait]
impl Engine for NoopEngine {
    async fn launch(
        &self,
        _options: &LaunchOptions,
    ) -> Result<Box<dyn EngineSession>, BrowserError> {
        self.events.lock().await.push(NoopEvent::Launched);
        Ok(Box::new(NoopSession {
            events: Arc::clone(&self.events),
            eval_result: Arc::clone(&self.eval_result),
        }))
    }
}

struct NoopSession {
    events: EventLog,
    eval_result: Arc<Mutex<Value>>,
}

#[async_trait]
impl EngineSession for NoopSession {
    async fn open_page(&mut self) -> Result<Box<dyn EnginePage>, BrowserError> {
        self.events.lock().await.push(NoopEvent::PageOpened);
        Ok(Box::new(NoopPage {
            events: Arc::clone(&self.events),
            eval_result: Arc::clone(&self.eval_result),
            url: Mutex::new("about:blank".to_string()),
            title: Mutex::new("New Tab".to_string()),
        }))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.events.lock().await.push(NoopEvent::SessionClosed);
        Ok(())
    }
}

struct NoopPage {
    events: EventLog,
    eval_result: Arc<Mutex<Value>>,
    url: Mutex<String>,
    title: Mutex<String>,
}

/// PNG file signature, enough for callers that only sniff the magic bytes.
const STUB_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[async_trait]
impl EnginePage for NoopPage {
    async fn goto(&self, url: &str, _wait_until: WaitUntil) -> Result<(), BrowserError> {
        self.events.lock().await.push(NoopEvent::Goto(url.to_string()));
        *self.url.lock().await = url.to_string();
        *self.title.lock().await = "Untitled".to_string();
        Ok(())
    }

    async fn url(&self) -> Result<String, BrowserError> {
        Ok(self.url.lock().await.clone())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        Ok(self.title.lock().await.clone())
    }

    async fn html(&self) -> Result<String, BrowserError> {
        Ok("<html><head></head><body></body></html>".to_string())
    }

    async fn inner_text(&self) -> Result<String, BrowserError> {
        Ok(String::new())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        self.events
            .lock()
            .await
            .push(NoopEvent::Evaluate(script.to_string()));
        Ok(self.eval_result.lock().await.clone())
    }

    async fn screenshot(&self, full_page: bool, path: &Path) -> Result<Vec<u8>, BrowserError> {
        self.events
            .lock()
            .await
            .push(NoopEvent::Screenshot { full_page });
        tokio::fs::write(path, STUB_PNG)
            .await
            .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))?;
        Ok(STUB_PNG.to_vec())
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        self.events
            .lock()
            .await
            .push(NoopEvent::Click(selector.to_string()));
        Ok(())
    }

    async fn fill(&self, selector: Option<&str>, text: &str) -> Result<(), BrowserError> {
        self.events.lock().await.push(NoopEvent::Fill {
            selector: selector.map(String::from),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn press(&self, selector: Option<&str>, key: &str) -> Result<(), BrowserError> {
        self.events.lock().await.push(NoopEvent::Press {
            selector: selector.map(String::from),
            key: key.to_string(),
        });
        Ok(())
    }

    async fn bring_to_front(&self) -> Result<(), BrowserError> {
        self.events.lock().await.push(NoopEvent::BringToFront);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.events.lock().await.push(NoopEvent::PageClosed);
        Ok(())
    }
}
