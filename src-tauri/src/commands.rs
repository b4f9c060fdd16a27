//! Tauri commands exposing the scan and deduplication engine to the frontend.

use std::path::PathBuf;

use photo_dedup_core::config::AppConfig;
use photo_dedup_core::core::cache::open_with_fallback;
use photo_dedup_core::core::fileops::{self, MoveOp, UndoStack};
use photo_dedup_core::core::{LogicalPhoto, ScanOrchestrator};
use photo_dedup_core::events::EventChannel;
use tauri::{AppHandle, Emitter, Manager, State};

/// Application state: the undo log is the only thing that must outlive a
/// single command invocation.
pub struct AppState {
    pub undo_stack: UndoStack,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            undo_stack: UndoStack::new(),
        }
    }
}

fn get_cache_path(app: &AppHandle) -> Result<PathBuf, String> {
    let app_data_dir = app
        .path()
        .app_data_dir()
        .map_err(|e| format!("Failed to get app data dir: {}", e))?;

    Ok(app_data_dir.join("hashes.db"))
}

/// Scan the given directories and return the annotated logical photos.
///
/// Forwards every `scan-progress` event to the frontend as it happens.
#[tauri::command]
pub async fn scan_directories(
    app: AppHandle,
    directories: Vec<String>,
) -> Result<Vec<LogicalPhoto>, String> {
    let cache_path = get_cache_path(&app)?;
    let cache = open_with_fallback(&cache_path);
    let orchestrator = ScanOrchestrator::new(cache);

    let roots: Vec<PathBuf> = directories.into_iter().map(PathBuf::from).collect();

    let (event_sender, receiver) = EventChannel::new();

    let app_handle = app.clone();
    let forward_handle = std::thread::spawn(move || {
        for event in receiver.iter() {
            let _ = app_handle.emit("scan-event", &event);
        }
    });

    let result = tokio::task::spawn_blocking(move || orchestrator.scan_with_events(roots, &event_sender))
        .await
        .map_err(|e| format!("scan task panicked: {e}"))?
        .map_err(|e| e.to_string());

    forward_handle.join().ok();

    result
}

/// Load the persisted app configuration, or the default if none exists.
#[tauri::command]
pub fn load_config(app: AppHandle) -> Result<AppConfig, String> {
    let path = config_path(&app)?;
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    AppConfig::load(&path).map_err(|e| e.to_string())
}

/// Persist the app configuration.
#[tauri::command]
pub fn save_config(app: AppHandle, config: AppConfig) -> Result<(), String> {
    let path = config_path(&app)?;
    config.save(&path).map_err(|e| e.to_string())
}

fn config_path(app: &AppHandle) -> Result<PathBuf, String> {
    let app_data_dir = app
        .path()
        .app_data_dir()
        .map_err(|e| format!("Failed to get app data dir: {}", e))?;
    Ok(app_data_dir.join("config.json"))
}

/// Move files into `destination`, resolving name collisions, recording an
/// undo entry.
#[tauri::command]
pub fn move_files(
    state: State<'_, AppState>,
    files: Vec<String>,
    destination: String,
) -> Result<Vec<MoveOp>, String> {
    let files: Vec<PathBuf> = files.into_iter().map(PathBuf::from).collect();
    let destination = PathBuf::from(destination);

    fileops::move_files(&files, &destination, &state.undo_stack).map_err(|e| e.to_string())
}

/// Replay an explicit `{from, to}` list, e.g. to resume an interrupted move.
#[tauri::command]
pub fn move_files_batch(operations: Vec<MoveOp>) -> Result<(), String> {
    fileops::move_files_batch(&operations).map_err(|e| e.to_string())
}

/// Send files to the OS recycle facility. Not undoable.
#[tauri::command]
pub async fn trash_files(app: AppHandle, files: Vec<String>) -> Result<fileops::TrashResult, String> {
    let files: Vec<PathBuf> = files.into_iter().map(PathBuf::from).collect();

    let (event_sender, receiver) = EventChannel::new();

    let app_handle = app.clone();
    let forward_handle = std::thread::spawn(move || {
        for event in receiver.iter() {
            let _ = app_handle.emit("delete-event", &event);
        }
    });

    let result = tokio::task::spawn_blocking(move || fileops::trash(&files, &event_sender))
        .await
        .map_err(|e| format!("trash task panicked: {e}"))?
        .map_err(|e| e.to_string());

    forward_handle.join().ok();

    result
}

/// Rename a single file in place.
#[tauri::command]
pub fn rename_file(path: String, new_name: String) -> Result<(), String> {
    fileops::rename(&PathBuf::from(path), &new_name).map_err(|e| e.to_string())
}

/// Create a directory, including parents; idempotent.
#[tauri::command]
pub fn create_folder(path: String) -> Result<(), String> {
    fileops::create_folder(&PathBuf::from(path)).map_err(|e| e.to_string())
}

/// Reveal a file in the system file manager.
#[tauri::command]
pub fn reveal_in_finder(path: String) -> Result<(), String> {
    fileops::reveal_in_finder(&PathBuf::from(path)).map_err(|e| e.to_string())
}

/// Reverse the most recent reversible operation (a `move_files` call).
#[tauri::command]
pub fn undo(state: State<'_, AppState>) -> Result<(), String> {
    fileops::undo(&state.undo_stack).map_err(|e| e.to_string())
}
