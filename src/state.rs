use axum::extract::FromRef;

use crate::{config::Config, repository::Repositories};

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub config: Config,
}

impl FromRef<AppState> for Repositories {
    fn from_ref(state: &AppState) -> Self {
        state.repos.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
