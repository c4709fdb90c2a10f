//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use tome_core::GenerationBackend;
use tome_db::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub backend: Arc<dyn GenerationBackend>,
    /// Directory for single-use upload scratch files.
    pub scratch_dir: PathBuf,
}
