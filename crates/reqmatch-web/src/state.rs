use std::sync::Arc;

use reqmatch_core::{Config, DirectoryStore, HistoryStore, TextBackend};

/// Shared application state accessible from all handlers.
///
/// `history` is the single writer for the results file; every handler goes
/// through this instance so concurrent saves are serialized.
pub struct AppState {
    pub config: Config,
    pub store: DirectoryStore,
    pub history: HistoryStore,
    pub backend: Arc<dyn TextBackend>,
}
