//! Demo configuration structures and loaders.
use std::env;
use std::path::PathBuf;

/// Settings for the local arena demo.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    pub player_name: String,
    pub opponents: usize,
    /// Persist sessions to disk so an interrupted fight resumes on restart.
    pub enable_persistence: bool,
    /// Directory for the log file; stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            player_name: "Hero".to_string(),
            opponents: 2,
            enable_persistence: false,
            log_dir: None,
        }
    }
}

impl ArenaConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_PLAYER_NAME` - Name of the local player (default: Hero)
    /// - `ARENA_OPPONENTS` - Number of generated opponents, 1 to 6 (default: 2)
    /// - `ENABLE_PERSISTENCE` - Save sessions to disk (default: false)
    /// - `ARENA_LOG_DIR` - Also write logs to `arena.log` in this directory
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = env::var("ARENA_PLAYER_NAME")
            && !name.trim().is_empty()
        {
            config.player_name = name.trim().to_string();
        }

        if let Some(count) = read_env::<usize>("ARENA_OPPONENTS") {
            config.opponents = count.clamp(1, 6);
        }

        if let Some(enable) = read_env::<bool>("ENABLE_PERSISTENCE") {
            config.enable_persistence = enable;
        } else if env::var("ENABLE_PERSISTENCE").is_ok() {
            // Also accept just setting the variable without value as "true"
            config.enable_persistence = true;
        }

        config.log_dir = env::var("ARENA_LOG_DIR").ok().map(PathBuf::from);

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
