use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    backend::LmsBackend,
    config::Config,
    quiz::SessionStore,
    reporter::{PlaybackRegistry, Reporter},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn LmsBackend>,
    pub reporter: Reporter,
    pub sessions: SessionStore,
    pub playback: PlaybackRegistry,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn LmsBackend>) -> Self {
        Self {
            config,
            reporter: Reporter::new(Arc::clone(&backend)),
            backend,
            sessions: SessionStore::new(),
            playback: PlaybackRegistry::new(),
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
