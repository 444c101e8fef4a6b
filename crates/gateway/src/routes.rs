//! One handler per session-controller operation, all replying with the
//! uniform `{success, ...}` envelope.

use {
    axum::{Json, extract::State, http::Uri},
    chrono::Utc,
    serde::Deserialize,
    serde_json::{Value, json},
    tracing::warn,
};

use veer_browser::types::{ClickOptions, ScreenshotOptions, TypeOptions, WaitOptions, WaitUntil};

use crate::{error::ApiError, extract::ApiJson, server::AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateBody {
    pub url: Option<String>,
    pub wait_until: Option<WaitUntil>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EvaluateBody {
    pub script: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabIdBody {
    pub tab_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewTabBody {
    pub url: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let ready = state.controller.lock().await.is_ready();
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "browser": if ready { "ready" } else { "initializing" },
    }))
}

pub async fn init(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.controller.lock().await.initialize().await?;
    Ok(Json(json!({ "success": true, "message": "Browser initialized" })))
}

pub async fn navigate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NavigateBody>,
) -> Result<Json<Value>, ApiError> {
    let Some(url) = body.url else {
        return Err(ApiError::bad_request("URL is required"));
    };
    let wait_until = body.wait_until.unwrap_or_default();

    let result = state
        .controller
        .lock()
        .await
        .navigate(&url, wait_until)
        .await?;
    Ok(Json(
        json!({ "success": true, "url": result.url, "title": result.title }),
    ))
}

pub async fn screenshot(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ScreenshotOptions>,
) -> Result<Json<Value>, ApiError> {
    let encoded = state.controller.lock().await.screenshot(body).await?;
    Ok(Json(json!({ "success": true, "screenshot": encoded })))
}

pub async fn snapshot(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let snapshot = state.controller.lock().await.snapshot().await?;
    Ok(Json(json!({ "success": true, "snapshot": snapshot })))
}

pub async fn click(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ClickOptions>,
) -> Result<Json<Value>, ApiError> {
    state.controller.lock().await.click(body).await?;
    Ok(Json(json!({ "success": true, "message": "Click performed" })))
}

pub async fn type_text(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TypeOptions>,
) -> Result<Json<Value>, ApiError> {
    state.controller.lock().await.type_text(body).await?;
    Ok(Json(json!({ "success": true, "message": "Text typed" })))
}

pub async fn content(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let content = state.controller.lock().await.content().await?;
    Ok(Json(json!({
        "success": true,
        "html": content.html,
        "text": content.text,
        "url": content.url,
        "title": content.title,
    })))
}

pub async fn evaluate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<EvaluateBody>,
) -> Result<Json<Value>, ApiError> {
    let Some(script) = body.script else {
        return Err(ApiError::bad_request("Script is required"));
    };

    let result = state.controller.lock().await.evaluate(&script).await?;
    Ok(Json(json!({ "success": true, "result": result })))
}

pub async fn wait(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<WaitOptions>,
) -> Result<Json<Value>, ApiError> {
    state.controller.lock().await.wait(body).await?;
    Ok(Json(json!({ "success": true, "message": "Wait completed" })))
}

pub async fn tabs(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let tabs = state.controller.lock().await.tabs().await?;
    Ok(Json(json!({ "success": true, "tabs": tabs })))
}

pub async fn new_tab(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewTabBody>,
) -> Result<Json<Value>, ApiError> {
    let tab_id = state
        .controller
        .lock()
        .await
        .new_tab(body.url.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "tabId": tab_id })))
}

pub async fn close_tab(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TabIdBody>,
) -> Result<Json<Value>, ApiError> {
    state
        .controller
        .lock()
        .await
        .close_tab(body.tab_id.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "message": "Tab closed" })))
}

pub async fn select_tab(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TabIdBody>,
) -> Result<Json<Value>, ApiError> {
    let tab_id = body.tab_id.unwrap_or_default();
    state.controller.lock().await.select_tab(&tab_id).await?;
    Ok(Json(json!({ "success": true, "message": "Tab selected" })))
}

pub async fn close_browser(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.controller.lock().await.close().await?;
    Ok(Json(json!({ "success": true, "message": "Browser closed" })))
}

pub async fn session(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let info = state.controller.lock().await.session_info().await?;
    Ok(Json(json!({ "success": true, "session": info })))
}

/// Persisting the profile is a browser-side effect of shutting the session
/// down; the endpoint exists for callers that snapshot state between runs.
pub async fn save_profile(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.controller.lock().await.close().await?;
    Ok(Json(
        json!({ "success": true, "message": "Profile saved and browser closed" }),
    ))
}

pub async fn fallback(uri: Uri) -> ApiError {
    warn!(path = %uri.path(), "no route for request");
    ApiError::not_found(format!("no route for {}", uri.path()))
}
