//! Tauri command handlers.
//!
//! Thin wrappers that bridge frontend invoke() calls to the session. Every
//! command returns the new view snapshot so the webview can re-render from a
//! single source of truth.

use crate::clipboard::{CopyOutcome, SystemClipboard};
use crate::scenario::ScenarioClient;
use crate::session::Session;
use crate::view::{ResultTab, ViewSnapshot};
use serde::Serialize;

pub type AppSession = Session<ScenarioClient>;

/// Tauri command: select an image from a filesystem path.
///
/// Used by the native file dialog and by drag-and-drop, which both hand
/// over paths.
#[tauri::command]
pub async fn select_image_path(
    session: tauri::State<'_, AppSession>,
    path: String,
) -> Result<ViewSnapshot, String> {
    Ok(session.select_path(std::path::Path::new(&path)).await)
}

/// Tauri command: select an image the webview already read as a data URI.
#[tauri::command]
pub async fn select_image_data(
    session: tauri::State<'_, AppSession>,
    name: String,
    data_uri: String,
) -> Result<ViewSnapshot, String> {
    Ok(session.select_data_uri(&name, &data_uri).await)
}

/// Tauri command: run the scenario on the active image.
///
/// Returns Err only when no image is selected; API failures come back as an
/// error panel in the snapshot.
#[tauri::command]
pub async fn analyze_image(
    session: tauri::State<'_, AppSession>,
) -> Result<ViewSnapshot, String> {
    session.analyze().await.map_err(|e| e.to_string())
}

/// Tauri command: switch between formatted and raw result tabs.
#[tauri::command]
pub fn select_result_tab(
    session: tauri::State<'_, AppSession>,
    tab: ResultTab,
) -> Result<ViewSnapshot, String> {
    session.select_tab(tab).map_err(|e| e.to_string())
}

/// Tauri command: copy the visible result to the system clipboard.
#[tauri::command]
pub fn copy_result(session: tauri::State<'_, AppSession>) -> Result<CopyOutcome, String> {
    session
        .copy(&mut SystemClipboard)
        .map_err(|e| e.to_string())
}

/// Tauri command: back to the upload panel.
#[tauri::command]
pub fn reset_view(session: tauri::State<'_, AppSession>) -> ViewSnapshot {
    session.reset()
}

/// Tauri command: current snapshot, fetched by the window on load.
#[tauri::command]
pub fn get_view_state(session: tauri::State<'_, AppSession>) -> ViewSnapshot {
    session.snapshot()
}

/// Non-secret configuration shown in the window footer.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub api_base: String,
    pub user: String,
    pub flow: String,
    pub dual_view: bool,
    pub token_configured: bool,
}

/// Tauri command: describe the active deployment configuration.
#[tauri::command]
pub fn get_config_summary(session: tauri::State<'_, AppSession>) -> ConfigSummary {
    let config = session.backend().config();
    ConfigSummary {
        api_base: config.api_base.clone(),
        user: config.user.clone(),
        flow: format!("{:?}", config.flow),
        dual_view: config.dual_view,
        token_configured: !config.token.is_empty(),
    }
}
