// Parade entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open the profile store
// 4. Roll base stats if the profile has none
// 5. Resume an interrupted parade, or start a new one
// 6. Run the TUI until the player quits
// 7. Clean shutdown

use parade_draft::config;
use parade_draft::profile::ProfileStore;
use parade_draft::session::ParadeSession;
use parade_draft::stats::StatRoller;
use parade_draft::tui;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Parade starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: profile={}, pool of {} clans, wave {} -> {} shown",
        config.profile_name,
        config.pool.len(),
        config.wave_size,
        config.show_count
    );

    // 3. Open the profile store
    let store = ProfileStore::open(&config.db_path).context("failed to open profile store")?;
    info!("Profile store opened at {}", config.db_path);

    // 4. Roll base stats if the profile has none yet
    let mut rng = StdRng::from_entropy();
    let has_stats = store
        .load_profile(&config.profile_name)
        .context("failed to load profile")?
        .is_some_and(|record| record.stats.is_some());
    if has_stats {
        info!("Profile {} already has base stats", config.profile_name);
    } else {
        let mut roller = StatRoller::new();
        let block = *roller.roll_all(&mut rng);
        store
            .save_stats(&config.profile_name, &block)
            .context("failed to save rolled stats")?;
        info!(
            "Rolled base stats for {}: life={} def={} stam={} reach={} atk={:.2}s",
            config.profile_name,
            block.max_life,
            block.defense,
            block.max_stamina,
            block.reach,
            block.attack_speed
        );
    }

    // 5. Resume an interrupted parade, or start a new one
    let mut session = ParadeSession::new(&config, store);
    if session.restore().context("crash recovery failed")? {
        info!("Resumed an in-progress parade");
    } else {
        session.start(&mut rng).context("failed to start parade")?;
        info!("Started a fresh parade");
    }

    // 6. Run the TUI event loop (blocking until the player quits)
    tui::run(&mut session)?;

    // 7. Clean shutdown
    info!("Parade shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("parade.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("parade_draft=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
