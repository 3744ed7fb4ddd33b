//! Scenario OCR — image in, recognized text out.
//!
//! The library holds all behaviour; the Tauri shell (feature `desktop`) only
//! registers commands and state. Domains:
//!   - upload/    — candidate files, validation, preview
//!   - scenario/  — remote scenario API client and reply normalization
//!   - view/      — panel state machine and result views
//!   - render/    — Markdown rendering and code highlighting
//!   - session.rs — ties the view to a backend, one method per user action
//!   - clipboard.rs — copy with manual-selection fallback

pub mod clipboard;
#[cfg(feature = "desktop")]
mod commands;
pub mod error;
pub mod render;
pub mod scenario;
pub mod session;
pub mod upload;
pub mod view;

pub use error::{OcrError, ValidationError};
pub use scenario::{OcrBackend, ScenarioClient, ScenarioConfig};
pub use session::Session;

/// Load `.env.local`, then `.env`, from the project root (first one wins).
///
/// Uses CARGO_MANIFEST_DIR so the lookup does not depend on the binary's
/// working directory.
pub fn load_env_files() {
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let project_root = manifest_dir.parent().unwrap_or(manifest_dir);

    for env_file in [".env.local", ".env"] {
        let path = project_root.join(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break;
        }
    }
}

#[cfg(feature = "desktop")]
/// Configuration for the app: env + keychain, or defaults with an empty
/// token so the window still opens and the error panel explains the 401.
fn app_config() -> ScenarioConfig {
    match ScenarioConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("[CONFIG] {}; API calls will be rejected", e);
            ScenarioConfig::from_lookup(|key| std::env::var(key).ok()).unwrap_or_else(|e| {
                log::error!("[CONFIG] {}; using defaults", e);
                ScenarioConfig::new(scenario::config::DEFAULT_API_BASE, "")
            })
        }
    }
}

/// Entry point — called by Tauri runtime.
#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    load_env_files();
    env_logger::init();

    let config = app_config();
    let dual_view = config.dual_view;
    let client = match ScenarioClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to build HTTP client: {}", e);
            return;
        }
    };
    let session: commands::AppSession =
        Session::new(client, upload::FileValidator::default(), dual_view);

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(session)
        .invoke_handler(tauri::generate_handler![
            commands::select_image_path,
            commands::select_image_data,
            commands::analyze_image,
            commands::select_result_tab,
            commands::copy_result,
            commands::reset_view,
            commands::get_view_state,
            commands::get_config_summary,
        ])
        .setup(|_app| {
            log::info!("Scenario OCR starting up");
            Ok(())
        })
        .run(tauri::generate_context!());

    if let Err(e) = result {
        log::error!("Error running Scenario OCR: {}", e);
    }
}
