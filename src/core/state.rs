// Application state (AppState)

use crate::core::config::Config;
use crate::stores::user_store::UserStore;
use std::sync::Arc;

/// Shared application state
///
/// All fields are wrapped in Arc for efficient cloning across threads.
#[derive(Clone)]
pub struct AppState {
    /// Store holding every known user
    pub users: Arc<UserStore>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        Self {
            users: Arc::new(UserStore::with_capacity(config.memory.user_capacity)),
            config,
        }
    }
}
