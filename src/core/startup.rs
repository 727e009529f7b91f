use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::state::AppState;
use crate::models::user::UserSeed;

// this runs at boot time
pub fn seed_users(state: &AppState, seeds: &[UserSeed]) -> Result<usize> {
    for seed in seeds {
        let user = seed.clone().into_user();
        let id = state.users.insert(user)
            .context(format!("Failed to seed user '{}'", seed.username))?;

        debug!(
            user_id = %id,
            username = %seed.username,
            "Seeded user"
        );
    }

    info!(
        seeded = seeds.len(),
        users = state.users.len(),
        admins = state.users.admins().len(),
        "User store populated from configuration"
    );

    Ok(seeds.len())
}
