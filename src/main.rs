//! Binary entry point: resolve configuration, start file logging, bring up the
//! SQLite store, then drive the Ratatui event loop until the admin exits.
use library_manager::logging::init_logging;
use library_manager::{open_database, run_app, App, AppConfig, UserDirectory};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let _log_guard = init_logging(&config.log_dir, &config.log_filter)?;

    let conn = open_database(&config.db_path)?;
    let users = UserDirectory::new(&conn).load_or_seed_users(&config.seed_users)?;
    tracing::info!(users = users.len(), "user directory loaded");

    let mut app = App::new(conn, config.admin);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!("terminal session failed: {err:#}");
    }
    if result.is_ok() && !app.is_logged_in() {
        eprintln!("Not logged in. Exiting...");
    }
    tracing::info!("shutting down");
    result
}
