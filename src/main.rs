use anyhow::{Context, Result};
use roster::core::config::Config;
use roster::core::startup::seed_users;
use roster::core::state::AppState;
use roster::core::tracing_init::init_tracing;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path)
        .context(format!(
            "Failed to load configuration from '{}'. \
            If this is your first time running roster, copy config.example.toml to config.toml and adjust the values.",
            config_path.display()
        ))?;

    // Initialize tracing/logging
    init_tracing(&config.logging);

    info!(
        config_path = %config_path.display(),
        user_capacity = config.memory.user_capacity,
        seeds = config.users.len(),
        log_level = %config.logging.level,
        log_format = %config.logging.format,
        "roster starting"
    );

    let state = AppState::new(config);
    seed_users(&state, &state.config.users)?;

    let users = state.users.all();

    info!(
        users = users.len(),
        admins = users.iter().filter(|u| u.is_admin()).count(),
        "Startup complete"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &users)
        .context("Failed to write users as JSON")?;
    writeln!(out).context("Failed to write to stdout")?;

    Ok(())
}
